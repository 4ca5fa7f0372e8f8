mod url;

pub use url::{RedirectQuery, RedirectResponse, ShortenQuery, ShortenResponse};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
