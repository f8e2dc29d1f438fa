//! Dedicated UI-context loop thread.
//!
//! `UiThread` owns a [`UiQueue`] and runs whatever the paired
//! [`ChannelDispatcher`](super::ChannelDispatcher) sends, until stopped.

use std::sync::mpsc::{channel, Sender, TryRecvError};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use tracing::debug;

use super::dispatcher::UiQueue;

/// Statistics from the UI thread.
#[derive(Debug, Default, Clone)]
pub struct UiStats {
    /// Tasks run, including those drained on stop.
    pub tasks_run: usize,
    /// Poll cycles completed.
    pub polls: usize,
}

/// A background thread acting as the UI-confined context.
///
/// ## Example
///
/// ```
/// use bound_rust::{ui_channel, UiDispatcher, UiThread};
/// use std::time::Duration;
///
/// let (dispatcher, queue) = ui_channel();
/// let ui = UiThread::spawn(queue, Duration::from_millis(5));
///
/// dispatcher.dispatch(Box::new(|| println!("on the UI thread")));
///
/// let stats = ui.stop();
/// assert_eq!(stats.tasks_run, 1);
/// ```
pub struct UiThread {
    stop_tx: Sender<()>,
    thread_id: ThreadId,
    handle: Option<JoinHandle<UiStats>>,
}

impl UiThread {
    pub fn spawn(queue: UiQueue, poll_interval: Duration) -> Self {
        let (stop_tx, stop_rx) = channel();

        let handle = thread::spawn(move || {
            let mut stats = UiStats::default();

            loop {
                match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                stats.polls += 1;
                if queue.run_next(poll_interval) {
                    stats.tasks_run += 1;
                    stats.tasks_run += queue.run_pending();
                }
            }

            // Work dispatched before the stop signal still runs.
            stats.tasks_run += queue.run_pending();
            debug!(tasks = stats.tasks_run, polls = stats.polls, "UI thread stopped");
            stats
        });

        Self {
            stop_tx,
            thread_id: handle.thread().id(),
            handle: Some(handle),
        }
    }

    /// Id of the loop thread, for asserting where work ran.
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Signal the thread to stop and wait for it to finish.
    pub fn stop(mut self) -> UiStats {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap_or_default()
        } else {
            UiStats::default()
        }
    }

    /// Signal the thread to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}
