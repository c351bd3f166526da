//! Cancellable background task with an acknowledged stop.
//!
//! `request_cancel` raises the signal; `await_stopped` is the rendezvous: it
//! returns only once the task future has returned, which is the task's
//! acknowledgement that it no longer touches shared resources.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::error::{SerViewError, SerViewResult};

/// Cancellation signal observed by the running task
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested or the task handle is gone
    pub async fn cancelled(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

pub struct CancellableTask<T> {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> CancellableTask<T> {
    pub fn spawn<F, Fut>(task: F) -> Self
    where
        F: FnOnce(CancelSignal) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (cancel, rx) = watch::channel(false);
        let handle = tokio::spawn(task(CancelSignal { rx }));
        Self { cancel, handle }
    }

    pub fn request_cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait up to `timeout` for the task to return. On expiry the task is
    /// aborted and `CancellationTimeout` is returned.
    pub async fn await_stopped(mut self, timeout: Duration) -> SerViewResult<T> {
        match tokio::time::timeout(timeout, &mut self.handle).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(SerViewError::TaskFailed(e.to_string())),
            Err(_) => {
                self.handle.abort();
                Err(SerViewError::CancellationTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

impl<T> std::fmt::Debug for CancellableTask<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellableTask")
            .field("cancel_requested", &*self.cancel.borrow())
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_is_acknowledged() {
        let task = CancellableTask::spawn(|mut signal| async move {
            signal.cancelled().await;
            "stopped"
        });

        task.request_cancel();
        let result = task.await_stopped(Duration::from_secs(1)).await.unwrap();
        assert_eq!(result, "stopped");
    }

    #[tokio::test]
    async fn test_signal_reflects_request() {
        let task = CancellableTask::spawn(|signal| async move {
            while !signal.is_cancelled() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            42
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());
        task.request_cancel();
        assert_eq!(task.await_stopped(Duration::from_secs(1)).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_unresponsive_task_times_out() {
        let task = CancellableTask::spawn(|_signal| async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        task.request_cancel();
        let err = task.await_stopped(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, SerViewError::CancellationTimeout { timeout_ms: 50 }));
    }

    #[tokio::test]
    async fn test_panicking_task_reports_failure() {
        let task = CancellableTask::spawn(|_signal| async move {
            panic!("boom");
        });

        let err: SerViewError = task.await_stopped(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, SerViewError::TaskFailed(_)));
    }
}
