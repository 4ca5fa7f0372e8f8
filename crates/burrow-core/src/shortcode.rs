use crate::base62::{Base62Codec, CODE_LEN};
use crate::error::{CoreError, Result};
use burrow_idgen::UrlId;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;
use std::str::FromStr;

/// A validated short code: exactly ten base62 symbols.
///
/// Every base62 alphabet is a permutation of the ASCII letters and digits,
/// so membership is checked without knowing the symbol order. Whether the
/// symbols also form a canonical encoding is only known once the code is
/// decoded (see [`ShortCode::to_id`]).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortCode(SmolStr);

impl ShortCode {
    /// Validates `code` and wraps it.
    pub fn parse(code: impl AsRef<str>) -> Result<Self> {
        let code = code.as_ref();
        Self::validate(code)?;
        Ok(Self(SmolStr::new(code)))
    }

    /// Encodes `id` with the standard alphabet.
    pub fn encode(id: &UrlId) -> Self {
        Self::encode_with(&Base62Codec::STANDARD, id)
    }

    /// Encodes `id` with the given codec.
    pub fn encode_with(codec: &Base62Codec, id: &UrlId) -> Self {
        let symbols = codec.encode(id);
        Self(symbols.iter().map(|&b| char::from(b)).collect())
    }

    /// Decodes the code with the standard alphabet.
    pub fn to_id(&self) -> Result<UrlId> {
        Base62Codec::STANDARD.decode(&self.0)
    }

    /// Decodes the code with the given codec.
    pub fn to_id_with(&self, codec: &Base62Codec) -> Result<UrlId> {
        codec.decode(&self.0)
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(code: &str) -> Result<()> {
        if code.len() != CODE_LEN {
            return Err(CoreError::InvalidShortCode(format!(
                "length must be {} bytes, got {}",
                CODE_LEN,
                code.len()
            )));
        }

        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidShortCode(format!(
                "must contain only ASCII letters and digits: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl From<UrlId> for ShortCode {
    fn from(id: UrlId) -> Self {
        Self::encode(&id)
    }
}

impl FromStr for ShortCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Debug for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ShortCode").field(&self.0).finish()
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ShortCode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ShortCode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = SmolStr::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
