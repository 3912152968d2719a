use crate::application::use_cases::{JobRunnerUseCase, StoryReaderUseCase};
use crate::domain::error::AppError;
use crate::domain::settings::Settings;
use crate::infrastructure::db::JobStore;
use actix_cors::Cors;
use actix_web::cookie::Cookie;
use actix_web::{dev::Server, get, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

const SESSION_COOKIE: &str = "session_id";

pub struct AppState {
    pub settings: Settings,
    pub jobs: Arc<dyn JobStore + Send + Sync>,
    pub story_reader: Arc<StoryReaderUseCase>,
    pub job_runner: Arc<JobRunnerUseCase>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStoryRequest {
    #[serde(default = "default_theme")]
    #[validate(length(min = 1, max = 100))]
    pub theme: String,
}

fn default_theme() -> String {
    "fantasy".to_string()
}

fn session_id_from(req: &HttpRequest) -> String {
    req.cookie(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn error_response(err: &AppError) -> HttpResponse {
    match err {
        AppError::NotFound(_) => HttpResponse::NotFound().body(err.to_string()),
        AppError::ValidationError(_) => HttpResponse::UnprocessableEntity().body(err.to_string()),
        _ => {
            error!(error = %err, "Request failed");
            HttpResponse::InternalServerError().body(err.to_string())
        }
    }
}

#[post("/stories/create")]
async fn create_story(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateStoryRequest>,
) -> impl Responder {
    if let Err(e) = body.validate() {
        return error_response(&AppError::ValidationError(e.to_string()));
    }

    let session_id = session_id_from(&req);
    let job_id = Uuid::new_v4().to_string();
    info!(job_id = %job_id, theme = %body.theme, "Creating story generation job");

    match data.jobs.create(&job_id, &session_id, &body.theme).await {
        Ok(job) => {
            let runner = data.job_runner.clone();
            let spawned_job_id = job.job_id.clone();
            let spawned_session = session_id.clone();
            let theme = body.theme.clone();
            tokio::spawn(async move {
                runner.run(&spawned_job_id, &spawned_session, &theme).await;
            });

            let cookie = Cookie::build(SESSION_COOKIE, session_id)
                .path("/")
                .http_only(true)
                .finish();
            HttpResponse::Ok().cookie(cookie).json(job)
        }
        Err(e) => error_response(&e),
    }
}

#[get("/stories/{story_id}/complete")]
async fn get_complete_story(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> impl Responder {
    let story_id = path.into_inner();

    match data.story_reader.execute(story_id).await {
        Ok(story) => HttpResponse::Ok().json(story),
        Err(e) => error_response(&e),
    }
}

#[get("/jobs/{job_id}")]
async fn get_job(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let job_id = path.into_inner();

    match data.jobs.get(&job_id).await {
        Ok(job) => HttpResponse::Ok().json(job),
        Err(e) => error_response(&e),
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

fn build_cors(settings: &Settings) -> Cors {
    let origins = settings.allowed_origins_list();

    if origins.is_empty() && settings.debug {
        return Cors::permissive();
    }

    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);
    for origin in &origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

pub fn start_server(state: web::Data<AppState>) -> std::io::Result<Server> {
    let host = state.settings.host.clone();
    let port = state.settings.port;
    let settings = state.settings.clone();

    let server = HttpServer::new(move || {
        let cors = build_cors(&settings);
        let prefix = settings.api_prefix.trim_end_matches('/').to_string();

        App::new().wrap(cors).app_data(state.clone()).service(
            web::scope(&prefix)
                .service(create_story)
                .service(get_complete_story)
                .service(get_job)
                .service(health),
        )
    })
    .bind((host, port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;

    #[test]
    fn test_not_found_maps_to_404() {
        let resp = error_response(&AppError::NotFound("Story not found: 7".to_string()));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_error_maps_to_422() {
        let resp = error_response(&AppError::ValidationError("theme too long".to_string()));
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_other_errors_map_to_500() {
        let resp = error_response(&AppError::LLMError("upstream down".to_string()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_theme_length_validation() {
        let valid = CreateStoryRequest {
            theme: "fantasy".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = CreateStoryRequest {
            theme: String::new(),
        };
        assert!(empty.validate().is_err());

        let too_long = CreateStoryRequest {
            theme: "x".repeat(101),
        };
        assert!(too_long.validate().is_err());
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = actix_test::init_service(App::new().service(health)).await;
        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
    }
}
