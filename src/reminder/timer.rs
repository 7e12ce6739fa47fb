//! Cancellable one-shot timer
//!
//! Each timer is a short-lived thread parked on a channel with a deadline.
//! Anything arriving on the channel before the deadline (a cancel message,
//! or the handle being dropped) suppresses the action; hitting the deadline
//! runs it. Cancellation is best-effort: a timer already past its deadline
//! fires anyway.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use tracing::trace;

/// Handle to a scheduled action. Dropping the handle cancels the timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancel_tx: Sender<()>,
}

impl TimerHandle {
    /// Cancel the pending action. Idempotent, best-effort.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.try_send(());
    }
}

/// Run `action` after `delay` unless cancelled first.
pub fn schedule<F>(delay: Duration, action: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let (cancel_tx, cancel_rx) = bounded::<()>(1);

    thread::spawn(move || match cancel_rx.recv_timeout(delay) {
        Err(RecvTimeoutError::Timeout) => action(),
        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
            trace!("timer cancelled before firing");
        }
    });

    TimerHandle { cancel_tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_timer_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let _handle = schedule(Duration::from_millis(30), move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        thread::sleep(Duration::from_millis(120));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let handle = schedule(Duration::from_millis(60), move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();

        thread::sleep(Duration::from_millis(150));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_after_firing_is_harmless() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let handle = schedule(Duration::from_millis(10), move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(80));
        handle.cancel();
        handle.cancel();

        thread::sleep(Duration::from_millis(30));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropping_the_handle_cancels() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let handle = schedule(Duration::from_millis(60), move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });
        drop(handle);

        thread::sleep(Duration::from_millis(150));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_timer_fires_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let _handle = schedule(Duration::from_millis(10), move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(120));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
