use chrono::Utc;
use std::{thread, time::Duration};

/// A source of wall-clock time for a generator.
///
/// Generators read time exclusively through this trait, so tests can inject a
/// simulated clock and drive tick boundaries, backward jumps and sequence
/// exhaustion deterministically.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// Blocks the calling thread for roughly `dur`.
    ///
    /// Generators call this while holding their lock, both for the fixed
    /// drift back-off and while polling for the next tick.
    fn sleep(&self, dur: Duration);
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn sleep(&self, dur: Duration) {
        thread::sleep(dur);
    }
}

#[cfg(test)]
pub(crate) mod test_clock {
    use super::Clock;
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    /// A simulated clock for tests.
    ///
    /// `sleep` advances the simulated time instead of blocking, so waits
    /// inside a generator (drift back-off, next-tick polling) terminate
    /// without real delays.
    #[derive(Clone)]
    pub(crate) struct TestClock {
        now_millis: Arc<Mutex<i64>>,
    }

    impl TestClock {
        pub(crate) fn new(now_millis: i64) -> Self {
            Self {
                now_millis: Arc::new(Mutex::new(now_millis)),
            }
        }

        /// Jumps the clock to an absolute time, forward or backward.
        pub(crate) fn set(&self, now_millis: i64) {
            *self.now_millis.lock().unwrap() = now_millis;
        }

        pub(crate) fn advance(&self, millis: i64) {
            *self.now_millis.lock().unwrap() += millis;
        }

        pub(crate) fn now(&self) -> i64 {
            *self.now_millis.lock().unwrap()
        }
    }

    impl Clock for TestClock {
        fn now_millis(&self) -> i64 {
            self.now()
        }

        fn sleep(&self, dur: Duration) {
            // Advance at least one millisecond so polling loops always make
            // progress under simulated time.
            let millis = (dur.as_millis() as i64).max(1);
            self.advance(millis);
        }
    }

    #[test]
    fn sleep_advances_simulated_time() {
        let clock = TestClock::new(1_000);
        clock.sleep(Duration::from_millis(5));
        assert_eq!(clock.now(), 1_005);

        // Sub-millisecond sleeps still move the clock forward.
        clock.sleep(Duration::from_micros(100));
        assert_eq!(clock.now(), 1_006);

        clock.set(500);
        assert_eq!(clock.now_millis(), 500);
    }
}
