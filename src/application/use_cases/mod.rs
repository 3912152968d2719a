pub mod job_runner;
pub mod story_generator;
pub mod story_reader;

pub use job_runner::JobRunnerUseCase;
pub use story_generator::StoryGeneratorUseCase;
pub use story_reader::StoryReaderUseCase;
