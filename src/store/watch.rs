//! Cancellation handle for collection subscriptions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

/// Sleep slice between poll-interval checks so stop requests are
/// honored quickly.
const POLL_CHUNK: Duration = Duration::from_millis(50);

/// Sleeps for `total`, waking early if `stop` is set.
pub(crate) fn sleep_in_chunks(total: Duration, stop: &AtomicBool) {
    let mut remaining = total;
    while !stop.load(Ordering::SeqCst) && !remaining.is_zero() {
        let slice = remaining.min(POLL_CHUNK);
        std::thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
}

/// Keeps a subscription alive. Dropping the handle stops delivery and,
/// for watchers backed by a polling thread, joins that thread.
pub struct WatchHandle {
    id: Uuid,
    stopped: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub(crate) fn new(id: Uuid, stopped: Arc<AtomicBool>, thread: Option<JoinHandle<()>>) -> Self {
        WatchHandle {
            id,
            stopped,
            thread,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Stops delivery now instead of waiting for the drop.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                debug!(watch = %self.id, "watcher thread panicked before join");
            }
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_drop_stops_and_joins_thread() {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let (tx, rx) = mpsc::channel();

        let thread = thread::spawn(move || {
            while !flag.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(5));
            }
            tx.send(()).unwrap();
        });

        let handle = WatchHandle::new(Uuid::new_v4(), Arc::clone(&stopped), Some(thread));
        assert!(!handle.is_stopped());
        drop(handle);

        // Join happened inside drop, so the exit message is already here.
        assert!(rx.try_recv().is_ok());
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_stop_without_thread() {
        let stopped = Arc::new(AtomicBool::new(false));
        let handle = WatchHandle::new(Uuid::new_v4(), Arc::clone(&stopped), None);
        handle.stop();
        assert!(stopped.load(Ordering::SeqCst));
    }
}
