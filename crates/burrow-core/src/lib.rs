//! Core types and traits for the burrow URL shortener.
//!
//! This crate holds the short-code codec and the contracts shared by the
//! storage backends, the shortener service and the HTTP gateway.

pub mod base62;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use base62::Base62Codec;
pub use burrow_idgen::UrlId;
pub use error::{CoreError, ShortenerError, StorageError};
pub use repository::{KeyPolicy, LookupKey, ReadRepository, Repository, UrlRecord};
pub use shortcode::ShortCode;
pub use shortener::Shortener;
