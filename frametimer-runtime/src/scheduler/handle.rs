use tokio::task::JoinHandle;

use crate::error::TimerError;

/// Handle for a running driver
/// Used to wait on it or shut it down
pub struct DriverHandle {
    pub(crate) task: JoinHandle<Result<(), TimerError>>,
}

impl DriverHandle {
    /// Wait for the driver to stop, returning the error that stopped it.
    pub async fn join(self) -> Result<(), TimerError> {
        match self.task.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Ok(()),
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }

    /// Stop driving. Armed timers stay queued and resume under a new driver.
    pub async fn shutdown(self) -> Result<(), TimerError> {
        self.task.abort();
        self.join().await
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
