//! URL shortener service implementation.
//!
//! This crate wires an identifier [`Generator`] and a storage repository into
//! the get-or-create and resolve flows. Core types are re-exported from
//! `burrow_core`.

pub mod generator;
pub mod service;

pub use burrow_core::{Shortener, ShortenerError};
pub use generator::Generator;
pub use service::ShortenerService;
