//! URL shortener service implementation.
//!
//! This crate ties a repository, a code generator and a clock together
//! behind [`ShortenerService`]. [`UrlShortener`] is the file-backed default.
//! Core types are re-exported from `tinylink_core`.

pub mod service;

pub use service::{ShortenerService, UrlShortener};
pub use tinylink_core::{ShortCode, ShortenerError, StorageError, UrlRecord};
