//! The one-second countdown tick source for an active session.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub(crate) const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A running tick task, scoped to the controller that spawned it.
///
/// Sends one unit tick per second into the channel. The task is aborted on
/// `stop` and on drop, so a tick can never outlive its session and fire
/// against a session created afterwards.
#[derive(Debug)]
pub struct TimerTask {
    handle: JoinHandle<()>,
}

impl TimerTask {
    /// Spawn the tick task on the current tokio runtime.
    pub(crate) fn spawn(tx: mpsc::UnboundedSender<()>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_PERIOD);
            // The first interval tick completes immediately; skip it so the
            // first delivered tick lands a full second after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for TimerTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
