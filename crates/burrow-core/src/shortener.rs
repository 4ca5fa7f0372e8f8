use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Returns the short code for `long_url`, creating a mapping if none
    /// exists yet.
    async fn shorten(&self, long_url: &str) -> Result<ShortCode>;

    /// Resolves a short code to the long URL it was created for.
    /// Returns `None` if the code is unknown.
    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Reports whether the storage backend is reachable.
    async fn health(&self) -> Result<()>;
}
