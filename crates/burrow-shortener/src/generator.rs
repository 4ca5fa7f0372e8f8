pub mod seq;

use burrow_core::UrlId;
use burrow_idgen::{Clock, Error, IdGenerator};

/// Trait for producing fresh identifiers.
///
/// Implementations are pure generators that don't interact with storage;
/// every identifier they return must be distinct from all earlier ones.
pub trait Generator: Send + Sync + 'static {
    /// Issues the next identifier, blocking if the generator is throttled.
    fn generate(&self) -> Result<UrlId, Error>;

    /// Issues the next identifier, or `Ok(None)` where [`Generator::generate`]
    /// would block.
    fn try_generate(&self) -> Result<Option<UrlId>, Error> {
        self.generate().map(Some)
    }
}

impl<C: Clock + 'static> Generator for IdGenerator<C> {
    fn generate(&self) -> Result<UrlId, Error> {
        self.next_id()
    }

    fn try_generate(&self) -> Result<Option<UrlId>, Error> {
        self.try_next_id()
    }
}
