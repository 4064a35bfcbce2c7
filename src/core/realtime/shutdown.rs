//! Bounded wait for receive loop termination.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::warn;

use super::base::ShutdownOutcome;

/// Signals loop completion when dropped, including on panic.
#[derive(Debug)]
pub(crate) struct LoopCompletion(watch::Sender<bool>);

impl Drop for LoopCompletion {
    fn drop(&mut self) {
        self.0.send_replace(true);
    }
}

/// Tracks the most recently started receive loop.
#[derive(Debug, Default)]
pub(crate) struct ShutdownCoordinator {
    current: Mutex<Option<watch::Receiver<bool>>>,
}

impl ShutdownCoordinator {
    /// Register a new loop and hand back its completion signal.
    pub(crate) fn track(&self) -> LoopCompletion {
        let (tx, rx) = watch::channel(false);
        *self.current.lock() = Some(rx);
        LoopCompletion(tx)
    }

    /// Whether the tracked loop, if any, is still running.
    pub(crate) fn is_running(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|rx| !*rx.borrow())
    }

    /// Wait up to `timeout` for the tracked loop to finish.
    ///
    /// Timing out does not stop the loop.
    pub(crate) async fn wait(&self, timeout: Duration) -> ShutdownOutcome {
        let Some(mut rx) = self.current.lock().clone() else {
            return ShutdownOutcome::Exited;
        };

        match tokio::time::timeout(timeout, rx.wait_for(|done| *done)).await {
            // A closed channel means the completion signal is gone
            Ok(_) => ShutdownOutcome::Exited,
            Err(_) => {
                warn!(?timeout, "Timed out waiting for receive loop to exit");
                ShutdownOutcome::TimedOut
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_without_loop() {
        let coordinator = ShutdownCoordinator::default();
        assert!(!coordinator.is_running());
        assert_eq!(
            coordinator.wait(Duration::from_millis(10)).await,
            ShutdownOutcome::Exited
        );
    }

    #[tokio::test]
    async fn test_wait_for_exit() {
        let coordinator = ShutdownCoordinator::default();
        let completion = coordinator.track();
        assert!(coordinator.is_running());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(completion);
        });

        assert_eq!(
            coordinator.wait(Duration::from_secs(5)).await,
            ShutdownOutcome::Exited
        );
        assert!(!coordinator.is_running());
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let coordinator = ShutdownCoordinator::default();
        let _completion = coordinator.track();

        assert_eq!(
            coordinator.wait(Duration::from_millis(20)).await,
            ShutdownOutcome::TimedOut
        );
        // Still running after the timeout
        assert!(coordinator.is_running());
    }

    #[tokio::test]
    async fn test_new_loop_replaces_old() {
        let coordinator = ShutdownCoordinator::default();
        drop(coordinator.track());
        let _second = coordinator.track();
        assert!(coordinator.is_running());
    }
}
