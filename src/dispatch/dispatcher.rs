use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::warn;

/// A unit of work for the UI context.
pub type UiTask = Box<dyn FnOnce() + Send>;

/// Runs tasks on the UI-confined context, asynchronously to the caller.
pub trait UiDispatcher: Send + Sync {
    fn dispatch(&self, task: UiTask);
}

impl<F> UiDispatcher for F
where
    F: Fn(UiTask) + Send + Sync,
{
    fn dispatch(&self, task: UiTask) {
        self(task)
    }
}

/// Sending half of [`ui_channel`].
#[derive(Clone)]
pub struct ChannelDispatcher {
    tx: Sender<UiTask>,
}

impl UiDispatcher for ChannelDispatcher {
    fn dispatch(&self, task: UiTask) {
        if self.tx.send(task).is_err() {
            warn!("UI queue is gone, task dropped");
        }
    }
}

/// Receiving half of [`ui_channel`]; lives on the UI thread.
pub struct UiQueue {
    rx: Receiver<UiTask>,
}

impl UiQueue {
    /// Run every task already queued. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one task and run it.
    ///
    /// `false` on timeout or when every dispatcher is gone.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                task();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

/// A dispatcher and the queue it feeds.
pub fn ui_channel() -> (ChannelDispatcher, UiQueue) {
    let (tx, rx) = channel();
    (ChannelDispatcher { tx }, UiQueue { rx })
}
