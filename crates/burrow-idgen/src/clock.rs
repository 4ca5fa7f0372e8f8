use jiff::Timestamp;
use std::time::Duration;

/// Minimum sleep slice, so a sub-millisecond gap never busy-waits.
const MIN_SLEEP: Duration = Duration::from_millis(1);

pub trait Clock: Send + Sync {
    /// Returns the current time of the clock
    fn now(&self) -> Timestamp;
    /// Block and wait until the clock reaches the target time.
    fn wait_until(&self, target: Timestamp);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn wait_until(&self, target: Timestamp) {
        // Re-check after every sleep: the OS may wake us early.
        loop {
            let now = Timestamp::now();
            if now >= target {
                return;
            }
            let remaining = target.duration_since(now).unsigned_abs();
            std::thread::sleep(remaining.max(MIN_SLEEP));
        }
    }
}

#[cfg(test)]
pub(crate) mod test_clock {
    use crate::clock::Clock;
    use jiff::Timestamp;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    pub(crate) struct TestClock {
        inner: Arc<Mutex<TestClockState>>,
    }

    struct TestClockState {
        now: Timestamp,
    }

    impl TestClock {
        pub(crate) fn at_second(second: i64) -> Self {
            Self::new(Timestamp::from_second(second).unwrap())
        }

        pub(crate) fn new(now: Timestamp) -> Self {
            Self {
                inner: Arc::new(Mutex::new(TestClockState { now })),
            }
        }

        pub(crate) fn set(&self, now: Timestamp) {
            self.inner
                .lock()
                .expect("test clock lock should not be poisoned")
                .now = now;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Timestamp {
            self.inner
                .lock()
                .expect("test clock lock should not be poisoned")
                .now
        }

        fn wait_until(&self, target: Timestamp) {
            let mut state = self
                .inner
                .lock()
                .expect("test clock lock should not be poisoned");
            // jump straight to the target; tests never want to really sleep
            if target > state.now {
                state.now = target;
            }
        }
    }

    #[test]
    fn test_clock_works() {
        let base = Timestamp::from_second(0).unwrap();
        let clock = TestClock::new(base);
        assert_eq!(clock.now(), base);

        let target = Timestamp::from_second(1000).unwrap();
        clock.wait_until(target);
        assert_eq!(clock.now(), target);

        // waiting for the past is a no-op
        clock.wait_until(base);
        assert_eq!(clock.now(), target);

        clock.set(base);
        assert_eq!(clock.now(), base);
    }

    #[test]
    fn system_clock_waits_until_target() {
        let clock = super::SystemClock;
        let target = clock.now() + jiff::SignedDuration::from_millis(20);
        clock.wait_until(target);
        assert!(clock.now() >= target);
    }
}
