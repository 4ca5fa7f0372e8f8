use crate::error::{CoreError, Result};
use burrow_idgen::{UrlId, ID_LEN};
use std::fmt;

/// Number of symbols in a short code.
pub const CODE_LEN: usize = 10;

/// Number of symbols in a base62 alphabet.
pub const ALPHABET_LEN: usize = 62;

const STANDARD_ALPHABET: &[u8; ALPHABET_LEN] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const WORD_COUNT: usize = 5;
const WORD_MAX: u16 = (1 << 11) - 1;
const BASE: u16 = ALPHABET_LEN as u16;

/// Marks bytes that are not part of the alphabet in the index table.
const NOT_IN_ALPHABET: u8 = u8::MAX;

/// Converts a [`UrlId`] to and from its 10-symbol short code.
///
/// The 56 identifier bits are cut, most significant first, into five 11-bit
/// words. Bit 23 (the top bit of byte 4) is skipped; the generator
/// guarantees it is zero. Every word becomes two symbols,
/// `word / 62` and `word % 62`.
///
/// ```text
/// word 1: byte0[7..0] byte1[7..5]
/// word 2: byte1[4..0] byte2[7..2]
/// word 3: byte2[1..0] byte3[7..0] byte4[6]
/// word 4: byte4[5..0] byte5[7..3]
/// word 5: byte5[2..0] byte6[7..0]
/// ```
#[derive(Clone)]
pub struct Base62Codec {
    alphabet: [u8; ALPHABET_LEN],
    index: [u8; 256],
}

impl Base62Codec {
    /// Digits, then uppercase, then lowercase.
    pub const STANDARD: Self = Self::from_table(STANDARD_ALPHABET);

    const fn from_table(alphabet: &[u8; ALPHABET_LEN]) -> Self {
        let mut index = [NOT_IN_ALPHABET; 256];
        let mut i = 0;
        while i < ALPHABET_LEN {
            index[alphabet[i] as usize] = i as u8;
            i += 1;
        }
        Self {
            alphabet: *alphabet,
            index,
        }
    }

    /// Builds a codec over a custom symbol order.
    ///
    /// `alphabet` must be a permutation of the 62 ASCII letters and digits.
    pub fn with_alphabet(alphabet: &str) -> Result<Self> {
        let table: &[u8; ALPHABET_LEN] = alphabet.as_bytes().try_into().map_err(|_| {
            CoreError::InvalidAlphabet(format!(
                "expected {ALPHABET_LEN} symbols, got {}",
                alphabet.len()
            ))
        })?;

        if let Some(symbol) = table.iter().find(|b| !b.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidAlphabet(format!(
                "symbol {:?} is not an ASCII letter or digit",
                char::from(*symbol)
            )));
        }

        let codec = Self::from_table(table);
        let distinct = codec
            .index
            .iter()
            .filter(|&&slot| slot != NOT_IN_ALPHABET)
            .count();
        if distinct != ALPHABET_LEN {
            return Err(CoreError::InvalidAlphabet(
                "symbols must not repeat".to_string(),
            ));
        }

        Ok(codec)
    }

    /// The symbol table in index order.
    pub fn alphabet(&self) -> &[u8; ALPHABET_LEN] {
        &self.alphabet
    }

    /// Encodes an identifier into ten ASCII symbols.
    ///
    /// The structural zero bit is not represented; an identifier with that
    /// bit set encodes exactly like the same identifier with it cleared.
    pub fn encode(&self, id: &UrlId) -> [u8; CODE_LEN] {
        let mut code = [0u8; CODE_LEN];
        for (pair, word) in code.chunks_exact_mut(2).zip(split_words(id.as_bytes())) {
            pair[0] = self.alphabet[usize::from(word / BASE)];
            pair[1] = self.alphabet[usize::from(word % BASE)];
        }
        code
    }

    /// Decodes ten symbols back into the identifier they were encoded from.
    ///
    /// Rejects input of the wrong length, symbols outside the alphabet, and
    /// symbol pairs worth more than an 11-bit word can hold.
    pub fn decode(&self, code: &str) -> Result<UrlId> {
        let bytes = code.as_bytes();
        if bytes.len() != CODE_LEN {
            return Err(CoreError::InvalidShortCode(format!(
                "expected {CODE_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let mut words = [0u16; WORD_COUNT];
        for (word, pair) in words.iter_mut().zip(bytes.chunks_exact(2)) {
            let high = self.symbol_index(pair[0])?;
            let low = self.symbol_index(pair[1])?;
            *word = high * BASE + low;
            if *word > WORD_MAX {
                return Err(CoreError::InvalidShortCode(format!(
                    "symbol pair {:?} is outside the code space",
                    String::from_utf8_lossy(pair)
                )));
            }
        }

        UrlId::from_bytes(join_words(&words))
            .map_err(|e| CoreError::InvalidShortCode(e.to_string()))
    }

    fn symbol_index(&self, symbol: u8) -> Result<u16> {
        match self.index[usize::from(symbol)] {
            NOT_IN_ALPHABET => Err(CoreError::InvalidShortCode(format!(
                "symbol {:?} is not in the alphabet",
                char::from(symbol)
            ))),
            index => Ok(u16::from(index)),
        }
    }
}

impl Default for Base62Codec {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Debug for Base62Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Base62Codec")
            .field("alphabet", &String::from_utf8_lossy(&self.alphabet))
            .finish()
    }
}

fn split_words(b: &[u8; ID_LEN]) -> [u16; WORD_COUNT] {
    let b = b.map(u16::from);
    [
        (b[0] << 3) | (b[1] >> 5),
        ((b[1] & 0x1f) << 6) | (b[2] >> 2),
        ((b[2] & 0x03) << 9) | (b[3] << 1) | ((b[4] >> 6) & 0x01),
        ((b[4] & 0x3f) << 5) | (b[5] >> 3),
        ((b[5] & 0x07) << 8) | b[6],
    ]
}

fn join_words(w: &[u16; WORD_COUNT]) -> [u8; ID_LEN] {
    [
        (w[0] >> 3) as u8,
        (((w[0] & 0x07) << 5) | (w[1] >> 6)) as u8,
        (((w[1] & 0x3f) << 2) | (w[2] >> 9)) as u8,
        (w[2] >> 1) as u8,
        // bit 7 stays zero
        (((w[2] & 0x01) << 6) | (w[3] >> 5)) as u8,
        (((w[3] & 0x1f) << 3) | (w[4] >> 8)) as u8,
        w[4] as u8,
    ]
}
