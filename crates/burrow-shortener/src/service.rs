use crate::generator::Generator;
use async_trait::async_trait;
use burrow_core::{
    LookupKey, Repository, ShortCode, Shortener, ShortenerError, StorageError, UrlId, UrlRecord,
};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Longest long URL accepted, in characters. Matches the storage column width.
pub const MAX_URL_LEN: usize = 2048;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - URL validation
/// - get-or-create of the short code for a long URL
/// - resolving short codes through the repository's key policy
///
/// The generator guarantees identifiers are unique, so a fresh code never
/// collides with an existing one. Two requests racing on one unseen long URL
/// are reconciled through the repository's `Conflict` outcome.
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
        }
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    pub fn new(repository: R, generator: G) -> Self {
        Self::from_shared(Arc::new(repository), Arc::new(generator))
    }

    /// Builds a service over collaborators that are shared elsewhere.
    pub fn from_shared(repository: Arc<R>, generator: Arc<G>) -> Self {
        Self {
            repository,
            generator,
        }
    }

    /// Validates that the URL is non-empty, uses http(s) and names a host.
    ///
    /// The URL must also fit the storage column and be usable verbatim as a
    /// `Location` header, so control characters are rejected.
    fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.trim().is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        let len = url.chars().count();
        if len > MAX_URL_LEN {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL is {len} characters long, at most {MAX_URL_LEN} are allowed"
            )));
        }

        if url.chars().any(char::is_control) {
            return Err(ShortenerError::InvalidUrl(
                "URL must not contain control characters".to_string(),
            ));
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a scheme and host: {url}"
            )));
        };

        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {scheme}"
            )));
        }

        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid host: {url}"
            )));
        }

        Ok(())
    }

    /// Issues an identifier, moving to the blocking pool only when the
    /// per-second budget is spent.
    async fn next_id(&self) -> Result<UrlId, ShortenerError> {
        if let Some(id) = self.generator.try_generate()? {
            return Ok(id);
        }

        debug!("identifier budget exhausted, waiting for the next second");
        let generator = Arc::clone(&self.generator);
        let id = tokio::task::spawn_blocking(move || generator.generate())
            .await
            .map_err(|e| ShortenerError::Internal(format!("id generation task failed: {e}")))??;
        Ok(id)
    }

    /// Stores a fresh mapping, or returns the mapping a concurrent request
    /// stored first.
    async fn create(&self, long_url: &str) -> Result<ShortCode, ShortenerError> {
        let id = self.next_id().await.inspect_err(|e| {
            error!(error = %e, "failed to issue identifier");
        })?;
        let record = UrlRecord::new(id, long_url);
        let short_code = record.short_code.clone();

        match self.repository.store(record).await {
            Ok(()) => {
                info!(%short_code, long_url, "created short code");
                Ok(short_code)
            }
            Err(StorageError::Conflict(reason)) => {
                match self.repository.find_by_long_url(long_url).await? {
                    Some(winner) => {
                        debug!(
                            short_code = %winner.short_code,
                            discarded = %short_code,
                            "long url stored concurrently, reusing existing code"
                        );
                        Ok(winner.short_code)
                    }
                    None => {
                        warn!(%short_code, %reason, "store conflicted on a non-url key");
                        Err(StorageError::Conflict(reason).into())
                    }
                }
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, long_url: &str) -> Result<ShortCode, ShortenerError> {
        Self::validate_url(long_url)?;

        if let Some(existing) = self.repository.find_by_long_url(long_url).await? {
            trace!(short_code = %existing.short_code, "long url already shortened");
            return Ok(existing.short_code);
        }

        self.create(long_url).await
    }

    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>, ShortenerError> {
        let key = LookupKey::for_code(self.repository.key_policy(), code)?;
        let record = self.repository.find_by_key(&key).await?;

        trace!(%code, found = record.is_some(), "resolved short code");
        Ok(record.map(|r| r.long_url))
    }

    async fn health(&self) -> Result<(), ShortenerError> {
        self.repository.ping().await.inspect_err(|e| {
            warn!(error = %e, "storage health check failed");
        })?;
        Ok(())
    }
}
