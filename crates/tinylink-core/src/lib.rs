//! Core types and traits for the tinylink URL shortener.
//!
//! This crate provides the types shared by the code generator, the
//! storage backends and the shortener service.

pub mod clock;
pub mod error;
pub mod repository;
pub mod shortcode;

pub use clock::{Clock, SystemClock};
pub use error::{CoreError, ShortenerError, StorageError};
pub use repository::{ReadRepository, Repository, UrlRecord};
pub use shortcode::ShortCode;
