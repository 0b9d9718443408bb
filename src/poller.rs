use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::backend::Backend;
use crate::event::Msg;

const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Background task that checks integration connectivity on a fixed interval.
///
/// The first check happens one interval after spawning. Failed checks are
/// reported like successful ones and never stop the timer. The task is
/// aborted by `stop` or when the poller is dropped.
pub struct StatusPoller {
    handle: JoinHandle<()>,
}

impl StatusPoller {
    pub fn spawn(backend: Arc<dyn Backend>, interval: Duration, tx: UnboundedSender<Msg>) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let result = backend.connection_status().await;
                if tx.send(Msg::StatusPolled(result)).is_err() {
                    debug!("status receiver closed, poller exiting");
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
