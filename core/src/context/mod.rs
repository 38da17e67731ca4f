mod background_tasks;
mod config;
mod error;
pub mod pipeline;

pub use background_tasks::BackgroundTasks;
pub use config::{AppConfig, AppConfigExt, default_log_file};
pub use error::{ConfigError, PipelineError};
pub use pipeline::{BoxedHandler, CharacterPipeline, LockFlag, PipelineCommand};
