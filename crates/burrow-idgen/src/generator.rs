use crate::{
    clock::{Clock, SystemClock},
    error::Error,
    url_id::{UrlId, MAX_SEQUENCE},
};
use jiff::Timestamp;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::thread;
use tracing::{debug, error, trace};

/// Producers park once the per-second sequence reaches this value.
///
/// Equal to the packing limit plus one, so every sequence that gets past the
/// wait also fits the 23-bit field.
const SEQUENCE_BUDGET: u32 = MAX_SEQUENCE + 1;

#[derive(Debug)]
struct GeneratorState {
    epoch_seconds: u32,
    sequence: u32,
}

impl GeneratorState {
    /// Packs the current pair and advances the sequence.
    ///
    /// The sequence only moves once packing succeeded, so a fault leaves the
    /// state untouched.
    fn issue(&mut self) -> Result<UrlId, Error> {
        let id = UrlId::from_parts(self.epoch_seconds, self.sequence).inspect_err(|err| {
            error!(error = %err, "sequence passed the packing limit, refusing to issue");
        })?;
        self.sequence += 1;
        Ok(id)
    }

    fn budget_exhausted(&self) -> bool {
        self.sequence >= SEQUENCE_BUDGET
    }
}

/// State shared between the generator handle and its reset ticker.
struct Shared<C> {
    clock: C,
    state: Mutex<GeneratorState>,
    budget_reset: Condvar,
}

impl<C: Clock> Shared<C> {
    fn lock(&self) -> Result<MutexGuard<'_, GeneratorState>, Error> {
        self.state.lock().map_err(|_| Error::StatePoisoned)
    }

    fn clock_seconds(&self) -> Result<u32, Error> {
        let now = self.clock.now();
        u32::try_from(now.as_second()).map_err(|_| Error::EpochOutOfRange { now })
    }

    /// Moves the state into the clock's current second and wakes every
    /// parked producer.
    ///
    /// Returns `false` without touching the state when the clock has not
    /// passed the stored second; resetting then would hand out
    /// `(second, sequence)` pairs a second time.
    fn reset(&self) -> Result<bool, Error> {
        let epoch_seconds = self.clock_seconds()?;
        let mut state = self.lock()?;
        if epoch_seconds <= state.epoch_seconds {
            return Ok(false);
        }

        state.epoch_seconds = epoch_seconds;
        state.sequence = 0;
        self.budget_reset.notify_all();
        Ok(true)
    }

    /// The wall-clock instant at which the stored second ends.
    fn next_boundary(&self) -> Result<Timestamp, Error> {
        let epoch_seconds = self.lock()?.epoch_seconds;
        Timestamp::from_second(i64::from(epoch_seconds) + 1).map_err(|_| Error::EpochOutOfRange {
            now: self.clock.now(),
        })
    }
}

/// Process-local identifier generator.
///
/// Identifiers combine the current epoch second with a per-second sequence.
/// A dedicated ticker thread moves the epoch second forward at each
/// wall-clock second boundary and zeroes the sequence. Once `2^23`
/// identifiers have been issued within one second, [`IdGenerator::next_id`]
/// parks on a condition variable until the next reset.
///
/// Uniqueness holds for one generator instance; two generators in the same
/// process (or two processes) can issue equal identifiers.
pub struct IdGenerator<C: Clock = SystemClock> {
    shared: Arc<Shared<C>>,
}

impl IdGenerator<SystemClock> {
    /// Creates a generator backed by the real system clock and starts its
    /// reset ticker.
    pub fn new() -> Result<Self, Error> {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock + 'static> IdGenerator<C> {
    /// Creates a generator reading time from `clock` and starts its reset
    /// ticker.
    ///
    /// The ticker only holds a weak reference; it exits within a second of
    /// the generator being dropped.
    pub fn with_clock(clock: C) -> Result<Self, Error> {
        let generator = Self::without_ticker(clock)?;
        let ticker = Arc::downgrade(&generator.shared);
        thread::Builder::new()
            .name("burrow-idgen-reset".to_string())
            .spawn(move || run_ticker(ticker))
            .map_err(|e| Error::TickerSpawn(e.to_string()))?;
        Ok(generator)
    }
}

impl<C: Clock> IdGenerator<C> {
    fn without_ticker(clock: C) -> Result<Self, Error> {
        let now = clock.now();
        let epoch_seconds =
            u32::try_from(now.as_second()).map_err(|_| Error::EpochOutOfRange { now })?;

        Ok(Self {
            shared: Arc::new(Shared {
                clock,
                state: Mutex::new(GeneratorState {
                    epoch_seconds,
                    sequence: 0,
                }),
                budget_reset: Condvar::new(),
            }),
        })
    }

    /// Issues the next identifier, blocking until the next second boundary
    /// if this second's sequence budget is used up.
    pub fn next_id(&self) -> Result<UrlId, Error> {
        let state = self.shared.lock()?;
        if state.budget_exhausted() {
            debug!(
                epoch_seconds = state.epoch_seconds,
                "sequence budget exhausted, waiting for the next second"
            );
        }

        let mut state = self
            .shared
            .budget_reset
            .wait_while(state, |state| state.budget_exhausted())
            .map_err(|_| Error::StatePoisoned)?;

        state.issue()
    }

    /// Issues the next identifier, or returns `Ok(None)` instead of blocking
    /// when this second's sequence budget is used up.
    pub fn try_next_id(&self) -> Result<Option<UrlId>, Error> {
        let mut state = self.shared.lock()?;
        if state.budget_exhausted() {
            return Ok(None);
        }
        state.issue().map(Some)
    }
}

fn run_ticker<C: Clock>(shared: Weak<Shared<C>>) {
    debug!("sequence reset ticker started");

    while let Some(shared) = shared.upgrade() {
        let boundary = match shared.next_boundary() {
            Ok(boundary) => boundary,
            Err(err) => {
                error!(error = %err, "cannot schedule the next sequence reset, ticker stopping");
                return;
            }
        };
        shared.clock.wait_until(boundary);

        match shared.reset() {
            Ok(true) => trace!(%boundary, "sequence reset"),
            Ok(false) => trace!(%boundary, "clock behind the stored second, reset skipped"),
            Err(err) => {
                error!(error = %err, "sequence reset failed, ticker stopping");
                return;
            }
        }
    }

    debug!("generator dropped, sequence reset ticker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_clock::TestClock;
    use std::collections::HashSet;
    use std::time::Duration;

    fn make_generator(clock_second: i64) -> (IdGenerator<TestClock>, TestClock) {
        let clock = TestClock::at_second(clock_second);
        let generator = IdGenerator::without_ticker(clock.clone()).unwrap();
        (generator, clock)
    }

    fn set_sequence<C: Clock>(generator: &IdGenerator<C>, sequence: u32) {
        generator.shared.lock().unwrap().sequence = sequence;
    }

    #[test]
    fn first_id_uses_clock_second_and_sequence_zero() {
        let (generator, _) = make_generator(100);
        let id = generator.next_id().unwrap();
        assert_eq!(id.epoch_seconds(), 100);
        assert_eq!(id.sequence(), 0);
    }

    #[test]
    fn burst_sequences_are_consecutive() {
        let (generator, _) = make_generator(100);
        set_sequence(&generator, 40);

        let ids: Vec<UrlId> = (0..1_000).map(|_| generator.next_id().unwrap()).collect();

        for (offset, id) in ids.iter().enumerate() {
            assert_eq!(id.epoch_seconds(), 100);
            assert_eq!(id.sequence(), 40 + offset as u32);
        }
        let distinct: HashSet<_> = ids.iter().collect();
        assert_eq!(distinct.len(), ids.len());
    }

    #[test]
    fn reset_moves_to_new_second() {
        let (generator, clock) = make_generator(100);
        for _ in 0..3 {
            generator.next_id().unwrap();
        }

        clock.set(Timestamp::from_second(101).unwrap());
        assert!(generator.shared.reset().unwrap());

        let id = generator.next_id().unwrap();
        assert_eq!(id.epoch_seconds(), 101);
        assert_eq!(id.sequence(), 0);
    }

    #[test]
    fn reset_skipped_when_clock_has_not_advanced() {
        let (generator, clock) = make_generator(100);
        generator.next_id().unwrap();

        // same second
        assert!(!generator.shared.reset().unwrap());
        // clock stepped backwards
        clock.set(Timestamp::from_second(99).unwrap());
        assert!(!generator.shared.reset().unwrap());

        let id = generator.next_id().unwrap();
        assert_eq!(id.epoch_seconds(), 100);
        assert_eq!(id.sequence(), 1);
    }

    #[test]
    fn next_boundary_is_end_of_stored_second() {
        let (generator, _) = make_generator(100);
        assert_eq!(
            generator.shared.next_boundary().unwrap(),
            Timestamp::from_second(101).unwrap()
        );
    }

    #[test]
    fn last_sequence_of_the_second_is_issued() {
        let (generator, _) = make_generator(100);
        set_sequence(&generator, MAX_SEQUENCE);

        let id = generator.next_id().unwrap();
        assert_eq!(id.sequence(), MAX_SEQUENCE);

        // budget is now exhausted
        assert_eq!(generator.try_next_id().unwrap(), None);
    }

    #[test]
    fn sequence_at_packing_limit_is_a_fault() {
        let mut state = GeneratorState {
            epoch_seconds: 100,
            sequence: MAX_SEQUENCE + 1,
        };

        let err = state.issue().unwrap_err();
        assert!(matches!(err, Error::SequenceOutOfRange { .. }));
        assert_eq!(state.sequence, MAX_SEQUENCE + 1);
    }

    #[test]
    fn blocked_producer_resumes_after_reset() {
        let (generator, clock) = make_generator(100);
        set_sequence(&generator, SEQUENCE_BUDGET);

        let id = thread::scope(|scope| {
            let producer = scope.spawn(|| generator.next_id().unwrap());

            thread::sleep(Duration::from_millis(50));
            assert!(!producer.is_finished());

            clock.set(Timestamp::from_second(101).unwrap());
            assert!(generator.shared.reset().unwrap());

            producer.join().unwrap()
        });

        assert_eq!(id.epoch_seconds(), 101);
        assert_eq!(id.sequence(), 0);
    }

    #[test]
    fn clock_beyond_epoch_field_is_rejected() {
        let clock = TestClock::at_second(i64::from(u32::MAX) + 1);
        let err = IdGenerator::without_ticker(clock).err().unwrap();
        assert!(matches!(err, Error::EpochOutOfRange { .. }));
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let generator = IdGenerator::new().unwrap();

        let ids: Vec<UrlId> = thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..25_000)
                            .map(|_| generator.next_id().unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            workers
                .into_iter()
                .flat_map(|worker| worker.join().unwrap())
                .collect()
        });

        let distinct: HashSet<_> = ids.iter().collect();
        assert_eq!(distinct.len(), 200_000);
    }

    #[test]
    fn hundred_thousand_ids_are_unique() {
        let generator = IdGenerator::new().unwrap();
        let mut seen = HashSet::new();
        for _ in 0..100_000 {
            assert!(seen.insert(generator.next_id().unwrap()));
        }
    }

    #[test]
    fn ticker_advances_the_epoch_second() {
        let generator = IdGenerator::new().unwrap();
        let first = generator.next_id().unwrap();

        awaitility::at_most(Duration::from_secs(3))
            .poll_interval(Duration::from_millis(50))
            .until(|| {
                let id = generator.next_id().unwrap();
                id.epoch_seconds() > first.epoch_seconds() && id.sequence() < 100
            });
    }

    #[test]
    fn ticker_exits_after_generator_drop() {
        let generator = IdGenerator::new().unwrap();
        let shared = Arc::downgrade(&generator.shared);
        drop(generator);

        awaitility::at_most(Duration::from_secs(3))
            .poll_interval(Duration::from_millis(50))
            .until(|| shared.strong_count() == 0);
    }
}
