use actix_web::web;
use std::sync::Arc;
use storyforge::application::use_cases::{
    JobRunnerUseCase, StoryGeneratorUseCase, StoryReaderUseCase,
};
use storyforge::domain::settings::Settings;
use storyforge::infrastructure::db::connection::init_db;
use storyforge::infrastructure::db::{JobRepository, JobStore, StoryRepository, StoryStore};
use storyforge::infrastructure::image_clients::FreepikClient;
use storyforge::infrastructure::llm_clients::{GeminiClient, LLMClient};
use storyforge::interfaces::http::{start_server, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(settings: &Settings) {
    let default_filter = if settings.debug {
        "storyforge=debug,info"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&settings);

    let pool = match init_db(&settings.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let stories: Arc<dyn StoryStore + Send + Sync> = Arc::new(StoryRepository::new(&pool));
    let jobs: Arc<dyn JobStore + Send + Sync> = Arc::new(JobRepository::new(&pool));

    let llm_client: Arc<dyn LLMClient + Send + Sync> =
        Arc::new(GeminiClient::new(settings.google_api_key.clone()));

    let image_client = settings
        .freepik_api_key
        .clone()
        .map(|key| Arc::new(FreepikClient::new(key)));
    if image_client.is_none() {
        warn!("FREEPIK_API_KEY not set, stories will be generated without images");
    }

    let generator = Arc::new(StoryGeneratorUseCase::new(
        llm_client,
        image_client,
        stories.clone(),
    ));
    let job_runner = Arc::new(JobRunnerUseCase::new(jobs.clone(), generator));
    let story_reader = Arc::new(StoryReaderUseCase::new(stories));

    let state = web::Data::new(AppState {
        settings: settings.clone(),
        jobs,
        story_reader,
        job_runner,
    });

    info!(
        host = %settings.host,
        port = settings.port,
        api_prefix = %settings.api_prefix,
        "Starting storyforge server"
    );

    start_server(state)?.await
}
