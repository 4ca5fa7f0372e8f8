//! HTTP gateway for the burrow URL shortener.
//!
//! The router only depends on the `Shortener` trait, so any storage backend
//! and generator combination can be served. Process wiring lives in the
//! `burrow-gateway` binary.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
