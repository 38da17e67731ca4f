use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use waksense_core::context::{AppConfig, AppConfigExt, ConfigError, PipelineError};
use waksense_core::types::TrackedCharacter;
use waksense_core::{CharacterPipeline, Tailer};

use crate::signal_log::SignalLogger;

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the pipelines.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    /// Where to persist changes. `None` means confy's default location.
    config_path: Option<PathBuf>,
    pipelines: Arc<Mutex<Vec<CharacterPipeline>>>,
}

impl CliContext {
    pub fn new(config: AppConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
            pipelines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start one pipeline per configured character.
    pub async fn start_all(&self) {
        let characters = self.config.read().await.characters.clone();
        for character in &characters {
            self.start(character).await;
        }
    }

    pub async fn start(&self, character: &TrackedCharacter) {
        let pipeline = {
            let config = self.config.read().await;
            let tailer = Tailer::new(PathBuf::from(&config.log_file), config.tailer);
            CharacterPipeline::spawn_with_tailer(
                tailer,
                &config,
                character,
                Some(Box::new(SignalLogger::new(character.name.clone()))),
            )
        };
        self.pipelines.lock().await.push(pipeline);
    }

    /// Stop and forget the pipeline for `name`. Returns `None` if none was running.
    pub async fn stop(&self, name: &str) -> Option<Result<(), PipelineError>> {
        let pipeline = {
            let mut pipelines = self.pipelines.lock().await;
            let idx = pipelines.iter().position(|p| p.character() == name)?;
            pipelines.remove(idx)
        };
        Some(pipeline.stop().await)
    }

    pub async fn stop_all(&self) {
        let pipelines: Vec<_> = self.pipelines.lock().await.drain(..).collect();
        for pipeline in pipelines {
            let name = pipeline.character().to_string();
            if let Err(err) = pipeline.stop().await {
                tracing::warn!(character = %name, error = %err, "Pipeline ended with an error");
            }
        }
    }

    pub fn pipelines(&self) -> &Mutex<Vec<CharacterPipeline>> {
        &self.pipelines
    }

    pub async fn save_config(&self) -> Result<(), ConfigError> {
        let config = self.config.read().await;
        match &self.config_path {
            Some(path) => config.save_to(path),
            None => config.save(),
        }
    }
}
