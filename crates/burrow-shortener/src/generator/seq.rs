use crate::generator::Generator;
use burrow_core::UrlId;
use burrow_idgen::Error;
use std::sync::atomic::{AtomicU32, Ordering};

/// A deterministic generator pinned to one epoch second.
///
/// Identifiers are `(epoch_seconds, offset)`, `(epoch_seconds, offset + 1)`
/// and so on. There is no reset: once the 23-bit sequence range is used up
/// every call fails with [`Error::SequenceOutOfRange`]. Useful for tests and
/// for replaying a known identifier range.
#[derive(Debug)]
pub struct SequentialGenerator {
    epoch_seconds: u32,
    counter: AtomicU32,
}

impl SequentialGenerator {
    /// Starts at sequence zero.
    pub fn new(epoch_seconds: u32) -> Self {
        Self::with_offset(epoch_seconds, 0)
    }

    /// Starts at sequence `offset`.
    pub fn with_offset(epoch_seconds: u32, offset: u32) -> Self {
        Self {
            epoch_seconds,
            counter: AtomicU32::new(offset),
        }
    }
}

impl Generator for SequentialGenerator {
    fn generate(&self) -> Result<UrlId, Error> {
        // saturate instead of wrapping so an exhausted range never restarts at zero
        let sequence = self
            .counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_add(1)))
            .unwrap_or_else(|n| n);
        UrlId::from_parts(self.epoch_seconds, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_idgen::MAX_SEQUENCE;

    #[test]
    fn produces_sequential_ids() {
        let generator = SequentialGenerator::new(1_000);

        let ids: Vec<UrlId> = (0..3).map(|_| generator.generate().unwrap()).collect();

        for (sequence, id) in ids.iter().enumerate() {
            assert_eq!(id.epoch_seconds(), 1_000);
            assert_eq!(id.sequence(), sequence as u32);
        }
    }

    #[test]
    fn starts_at_offset() {
        let generator = SequentialGenerator::with_offset(1_000, 500);
        assert_eq!(generator.generate().unwrap().sequence(), 500);
        assert_eq!(generator.try_generate().unwrap().unwrap().sequence(), 501);
    }

    #[test]
    fn exhausted_range_is_a_fault() {
        let generator = SequentialGenerator::with_offset(1_000, MAX_SEQUENCE);

        assert_eq!(generator.generate().unwrap().sequence(), MAX_SEQUENCE);
        assert!(matches!(
            generator.generate(),
            Err(Error::SequenceOutOfRange { .. })
        ));
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SequentialGenerator>();
    }
}
