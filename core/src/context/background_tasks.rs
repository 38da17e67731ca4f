use tokio::task::JoinHandle;

use super::error::PipelineError;
use crate::combat_log::ReaderError;

/// The two tasks of one character pipeline.
#[derive(Default)]
pub struct BackgroundTasks {
    pub tailer: Option<JoinHandle<Result<(), ReaderError>>>,
    pub consumer: Option<JoinHandle<()>>,
}

impl BackgroundTasks {
    /// Await both tasks, tailer first. The consumer finishes on its own once
    /// the tailer drops its end of the line channel.
    pub async fn join_all(&mut self) -> Result<(), PipelineError> {
        let tailed = match self.tailer.take() {
            Some(handle) => handle.await?.map_err(PipelineError::from),
            None => Ok(()),
        };
        if let Some(handle) = self.consumer.take() {
            handle.await?;
        }
        tailed
    }

    pub fn abort_all(&mut self) {
        if let Some(handle) = self.tailer.take() {
            handle.abort();
        }
        if let Some(handle) = self.consumer.take() {
            handle.abort();
        }
    }
}
