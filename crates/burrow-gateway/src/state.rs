use std::sync::Arc;

use burrow_core::{ShortCode, Shortener};

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    base_url: Option<String>,
}

impl AppState {
    pub fn new(shortener: Arc<dyn Shortener>, public_base_url: Option<String>) -> Self {
        Self {
            shortener,
            base_url: public_base_url,
        }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    /// The value handed back to clients: the full URL when a public base URL
    /// is configured, the bare code otherwise.
    pub fn short_url(&self, code: &ShortCode) -> String {
        match &self.base_url {
            Some(base_url) => code.to_url(base_url),
            None => code.to_string(),
        }
    }
}
