//! Process-local unique identifier generation.
//!
//! [`IdGenerator`] issues 56-bit [`UrlId`]s made of a Unix epoch second and a
//! per-second sequence. The sequence never touches bit 23, which leaves one
//! structurally zero bit for the short-code codec to drop.

mod clock;
pub mod error;
mod generator;
mod url_id;

pub use clock::{Clock, SystemClock};
pub use error::Error;
pub use generator::IdGenerator;
pub use url_id::{UrlId, ID_LEN, MAX_SEQUENCE};
