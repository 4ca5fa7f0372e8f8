use async_trait::async_trait;
use burrow_core::error::StorageError;
use burrow_core::repository::{KeyPolicy, LookupKey, ReadRepository, Repository, Result, UrlRecord};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::trace;

/// In-memory implementation of the repository contract using DashMap.
///
/// Two indexes are kept: long URL to record, and the policy key to record.
/// DashMap shards its locks, so lookups for different keys do not contend.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    policy: KeyPolicy,
    by_long_url: DashMap<String, UrlRecord>,
    by_key: DashMap<LookupKey, UrlRecord>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository keyed according to `policy`.
    pub fn new(policy: KeyPolicy) -> Self {
        Self {
            policy,
            by_long_url: DashMap::new(),
            by_key: DashMap::new(),
        }
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(policy: KeyPolicy, capacity: usize) -> Self {
        Self {
            policy,
            by_long_url: DashMap::with_capacity(capacity),
            by_key: DashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.by_long_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_long_url.is_empty()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new(KeyPolicy::default())
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    fn key_policy(&self) -> KeyPolicy {
        self.policy
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<UrlRecord>> {
        Ok(self.by_long_url.get(long_url).map(|entry| entry.clone()))
    }

    async fn find_by_key(&self, key: &LookupKey) -> Result<Option<UrlRecord>> {
        if key.policy() != self.policy {
            return Err(StorageError::UnsupportedKey(key.to_string()));
        }
        Ok(self.by_key.get(key).map(|entry| entry.clone()))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn store(&self, record: UrlRecord) -> Result<()> {
        let key = LookupKey::for_record(self.policy, &record);

        // The long-URL slot stays locked until the key is claimed, so two
        // racing stores for one URL cannot both win.
        let Entry::Vacant(url_slot) = self.by_long_url.entry(record.long_url.clone()) else {
            return Err(StorageError::Conflict(format!(
                "long url already mapped: {}",
                record.long_url
            )));
        };

        match self.by_key.entry(key) {
            Entry::Occupied(existing) => Err(StorageError::Conflict(format!(
                "key already mapped: {}",
                existing.key()
            ))),
            Entry::Vacant(key_slot) => {
                trace!(key = %key_slot.key(), long_url = %record.long_url, "stored mapping");
                key_slot.insert(record.clone());
                url_slot.insert(record);
                Ok(())
            }
        }
    }
}
