use crate::error::Error;
use std::fmt;

/// Number of bytes in a packed [`UrlId`].
pub const ID_LEN: usize = 7;

/// Largest sequence value the packed layout can carry.
///
/// The sequence field is 24 bits wide but its top bit must stay zero so the
/// short-code codec can drop it.
pub const MAX_SEQUENCE: u32 = (1 << 23) - 1;

/// Mask of the structural zero bit inside byte 4.
const STRUCTURAL_ZERO_BIT: u8 = 0b1000_0000;

/// A 56-bit identifier naming one shortened URL.
///
/// Layout (big-endian):
///
/// ```text
/// byte:  0        1        2        3        4        5        6
///       [------ epoch seconds (32) -------][ 0 |-- sequence (23) ---]
/// ```
///
/// Byte order equals `(epoch_seconds, sequence)` order, so the derived
/// `Ord` sorts identifiers by issuance.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UrlId([u8; ID_LEN]);

impl UrlId {
    /// Packs an epoch second and a sequence value.
    ///
    /// Returns [`Error::SequenceOutOfRange`] if `sequence` does not fit in
    /// 23 bits.
    pub fn from_parts(epoch_seconds: u32, sequence: u32) -> Result<Self, Error> {
        if sequence > MAX_SEQUENCE {
            return Err(Error::SequenceOutOfRange {
                sequence,
                max_sequence: MAX_SEQUENCE,
            });
        }

        let seconds = epoch_seconds.to_be_bytes();
        let sequence = sequence.to_be_bytes();

        Ok(Self([
            seconds[0],
            seconds[1],
            seconds[2],
            seconds[3],
            sequence[1],
            sequence[2],
            sequence[3],
        ]))
    }

    /// Rebuilds an identifier from its packed bytes, checking the structural
    /// zero bit.
    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Result<Self, Error> {
        if bytes[4] & STRUCTURAL_ZERO_BIT != 0 {
            return Err(Error::MalformedBytes(
                "structural zero bit of the sequence field is set".to_string(),
            ));
        }
        Ok(Self(bytes))
    }

    pub fn epoch_seconds(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn sequence(&self) -> u32 {
        u32::from_be_bytes([0, self.0[4], self.0[5], self.0[6]])
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; ID_LEN] {
        self.0
    }
}

impl TryFrom<&[u8]> for UrlId {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; ID_LEN] = value.try_into().map_err(|_| {
            Error::MalformedBytes(format!("expected {ID_LEN} bytes, got {}", value.len()))
        })?;
        Self::from_bytes(bytes)
    }
}

impl fmt::Debug for UrlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlId")
            .field("epoch_seconds", &self.epoch_seconds())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl fmt::Display for UrlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_parts_pack_to_zero_bytes() {
        let id = UrlId::from_parts(0, 0).unwrap();
        assert_eq!(id.into_bytes(), [0; ID_LEN]);
    }

    #[test]
    fn packs_seconds_then_sequence_big_endian() {
        let id = UrlId::from_parts(1, 1).unwrap();
        assert_eq!(id.into_bytes(), [0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x01]);

        let id = UrlId::from_parts(0x1234_5678, 0x12_3456).unwrap();
        assert_eq!(id.into_bytes(), [0x12, 0x34, 0x56, 0x78, 0x12, 0x34, 0x56]);
        assert_eq!(id.epoch_seconds(), 0x1234_5678);
        assert_eq!(id.sequence(), 0x12_3456);
    }

    #[test]
    fn max_sequence_is_accepted() {
        let id = UrlId::from_parts(u32::MAX, MAX_SEQUENCE).unwrap();
        assert_eq!(id.sequence(), MAX_SEQUENCE);
        assert_eq!(id.as_bytes()[4] & STRUCTURAL_ZERO_BIT, 0);
    }

    #[test]
    fn sequence_past_packing_limit_is_rejected() {
        let err = UrlId::from_parts(0, MAX_SEQUENCE + 1).unwrap_err();
        assert_eq!(
            err,
            Error::SequenceOutOfRange {
                sequence: 1 << 23,
                max_sequence: MAX_SEQUENCE,
            }
        );
    }

    #[test]
    fn from_bytes_rejects_structural_bit() {
        let mut bytes = [0xff; ID_LEN];
        assert!(UrlId::from_bytes(bytes).is_err());

        bytes[4] = 0x7f;
        let id = UrlId::from_bytes(bytes).unwrap();
        assert_eq!(id.sequence(), MAX_SEQUENCE);
    }

    #[test]
    fn try_from_slice_checks_length() {
        let short: &[u8] = &[0, 1, 2];
        assert!(matches!(
            UrlId::try_from(short),
            Err(Error::MalformedBytes(_))
        ));

        let exact: &[u8] = &[0, 0, 0, 9, 0, 0, 3];
        let id = UrlId::try_from(exact).unwrap();
        assert_eq!(id.epoch_seconds(), 9);
        assert_eq!(id.sequence(), 3);
    }

    #[test]
    fn ordering_follows_issuance() {
        let a = UrlId::from_parts(10, 500).unwrap();
        let b = UrlId::from_parts(10, 501).unwrap();
        let c = UrlId::from_parts(11, 0).unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn display_is_lower_hex() {
        let id = UrlId::from_parts(0x1234_5678, 0x12_3456).unwrap();
        assert_eq!(id.to_string(), "12345678123456");
    }
}
