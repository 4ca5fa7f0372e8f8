use crate::error::{CoreError, StorageError};
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use burrow_idgen::UrlId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Which key a repository persists mappings under and resolves them by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyPolicy {
    /// Key by the binary identifier; short codes are decoded before lookup.
    #[default]
    Identifier,
    /// Key by the short code string.
    ShortCode,
}

impl Display for KeyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyPolicy::Identifier => f.write_str("identifier"),
            KeyPolicy::ShortCode => f.write_str("short-code"),
        }
    }
}

/// A key for the reverse (short code to long URL) lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    Id(UrlId),
    Code(ShortCode),
}

impl LookupKey {
    /// Derives the key a repository with `policy` expects for `code`.
    ///
    /// Fails for codes that do not decode when the policy keys by identifier.
    pub fn for_code(policy: KeyPolicy, code: &ShortCode) -> std::result::Result<Self, CoreError> {
        match policy {
            KeyPolicy::Identifier => Ok(Self::Id(code.to_id()?)),
            KeyPolicy::ShortCode => Ok(Self::Code(code.clone())),
        }
    }

    /// The key `record` is stored under for `policy`.
    pub fn for_record(policy: KeyPolicy, record: &UrlRecord) -> Self {
        match policy {
            KeyPolicy::Identifier => Self::Id(record.id),
            KeyPolicy::ShortCode => Self::Code(record.short_code.clone()),
        }
    }

    pub fn policy(&self) -> KeyPolicy {
        match self {
            LookupKey::Id(_) => KeyPolicy::Identifier,
            LookupKey::Code(_) => KeyPolicy::ShortCode,
        }
    }
}

impl Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupKey::Id(id) => write!(f, "id:{id}"),
            LookupKey::Code(code) => write!(f, "code:{code}"),
        }
    }
}

/// A stored mapping between a long URL and its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub id: UrlId,
    /// The standard-alphabet rendering of `id`.
    pub short_code: ShortCode,
    pub long_url: String,
}

impl UrlRecord {
    pub fn new(id: UrlId, long_url: impl Into<String>) -> Self {
        Self {
            id,
            short_code: ShortCode::from(id),
            long_url: long_url.into(),
        }
    }
}

/// Read side of the storage contract.
///
/// Absence is `Ok(None)`; errors are reserved for storage failures.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// The key this repository persists mappings under.
    fn key_policy(&self) -> KeyPolicy;

    /// Finds the mapping previously stored for `long_url`.
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<UrlRecord>>;

    /// Finds the mapping stored under `key`.
    ///
    /// Returns `Err(UnsupportedKey)` if `key` does not match
    /// [`ReadRepository::key_policy`].
    async fn find_by_key(&self, key: &LookupKey) -> Result<Option<UrlRecord>>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Persists a new mapping.
    ///
    /// Returns `Err(Conflict)` if the long URL or the key is already mapped.
    async fn store(&self, record: UrlRecord) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_for_code_follows_policy() {
        let id = UrlId::from_parts(1_700_000_000, 9).unwrap();
        let code = ShortCode::from(id);

        assert_eq!(
            LookupKey::for_code(KeyPolicy::Identifier, &code).unwrap(),
            LookupKey::Id(id)
        );
        assert_eq!(
            LookupKey::for_code(KeyPolicy::ShortCode, &code).unwrap(),
            LookupKey::Code(code.clone())
        );
    }

    #[test]
    fn identifier_policy_rejects_undecodable_code() {
        let code = ShortCode::parse("zzzzzzzzzz").unwrap();
        assert!(LookupKey::for_code(KeyPolicy::Identifier, &code).is_err());
        // the string key does not need to decode
        assert!(LookupKey::for_code(KeyPolicy::ShortCode, &code).is_ok());
    }

    #[test]
    fn record_key_matches_code_key() {
        let record = UrlRecord::new(UrlId::from_parts(5, 6).unwrap(), "https://example.com");
        for policy in [KeyPolicy::Identifier, KeyPolicy::ShortCode] {
            let key = LookupKey::for_record(policy, &record);
            assert_eq!(key.policy(), policy);
            assert_eq!(LookupKey::for_code(policy, &record.short_code).unwrap(), key);
        }
    }

    #[test]
    fn key_policy_serde_names() {
        assert_eq!(
            serde_json::to_string(&KeyPolicy::ShortCode).unwrap(),
            "\"short-code\""
        );
        assert_eq!(KeyPolicy::Identifier.to_string(), "identifier");
    }
}
