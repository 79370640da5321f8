use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct Inner {
    triggered: Mutex<bool>,
    changed: Condvar,
}

/// Cloneable one-shot cancellation flag.
///
/// The Ctrl-C handler calls `trigger`; the listener loop polls
/// `is_triggered` once per frame period and the recorder sleeps on
/// `wait_until` so it wakes at its deadline or immediately on cancel.
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        *self.inner.triggered.lock() = true;
        self.inner.changed.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.triggered.lock()
    }

    /// Block until triggered or `deadline` passes. Returns whether the signal
    /// fired.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let mut triggered = self.inner.triggered.lock();
        while !*triggered {
            if self.inner.changed.wait_until(&mut triggered, deadline).timed_out() {
                break;
            }
        }
        *triggered
    }

    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.wait_until(Instant::now() + timeout)
    }
}

impl std::fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopSignal")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn wait_times_out_when_untriggered() {
        let signal = StopSignal::new();
        let start = Instant::now();

        assert!(!signal.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn trigger_wakes_waiter_early() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            remote.trigger();
        });

        let start = Instant::now();
        assert!(signal.wait_timeout(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn already_triggered_returns_immediately() {
        let signal = StopSignal::new();
        signal.trigger();
        assert!(signal.wait_timeout(Duration::from_secs(10)));
        assert!(signal.is_triggered());
    }
}
