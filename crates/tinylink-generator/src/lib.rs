pub mod hash;

pub use hash::{HashGenerator, CODE_LENGTH};

use jiff::Timestamp;
use tinylink_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Given the same URL and instant they must produce the same code.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Derives a short code for `original_url` at the instant `at`.
    ///
    /// Uniqueness is not guaranteed; callers decide what to do on collision.
    fn generate(&self, original_url: &str, at: Timestamp) -> Self::Output;
}
