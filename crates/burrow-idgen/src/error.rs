use jiff::Timestamp;
use thiserror::Error;

/// Errors returned by identifier packing and generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The clock reads a second that does not fit the 32-bit epoch field.
    #[error("clock time {now} is outside the 32-bit epoch-second range")]
    EpochOutOfRange { now: Timestamp },
    /// A sequence value above the 23-bit packing limit reached the packer.
    ///
    /// The generator never hands such a value to the packer, so seeing this
    /// means the generator and the codec disagree about the identifier layout.
    #[error("sequence {sequence} exceeds the packing limit {max_sequence}")]
    SequenceOutOfRange { sequence: u32, max_sequence: u32 },
    /// Raw bytes read back from somewhere have the wrong length or a set
    /// structural zero bit.
    #[error("malformed identifier bytes: {0}")]
    MalformedBytes(String),
    #[error("failed to start the sequence reset ticker: {0}")]
    TickerSpawn(String),
    #[error("generator state lock is poisoned")]
    StatePoisoned,
}
