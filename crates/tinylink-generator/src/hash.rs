use crate::Generator;
use jiff::Timestamp;
use tinylink_core::ShortCode;
use xxhash_rust::xxh3::xxh3_128;

/// Number of hex characters kept from the digest.
pub const CODE_LENGTH: usize = 6;

/// Derives codes from a 128-bit XXH3 digest of the URL and a nanosecond
/// timestamp, truncated to [`CODE_LENGTH`] lowercase hex characters.
///
/// Six hex characters give about 16.7M distinct codes. Collisions are not
/// checked here.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashGenerator;

impl HashGenerator {
    pub fn new() -> Self {
        Self
    }

    fn digest(original_url: &str, at: Timestamp) -> String {
        let seed = format!("{}_{}", original_url, at.as_nanosecond());
        format!("{:032x}", xxh3_128(seed.as_bytes()))
    }
}

impl Generator for HashGenerator {
    type Output = ShortCode;

    fn generate(&self, original_url: &str, at: Timestamp) -> Self::Output {
        let mut digest = Self::digest(original_url, at);
        digest.truncate(CODE_LENGTH);
        ShortCode::new_unchecked(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(nanos: i128) -> Timestamp {
        Timestamp::from_nanosecond(nanos).unwrap()
    }

    #[test]
    fn produces_six_lowercase_hex_chars() {
        let generator = HashGenerator::new();

        for url in ["https://example.com/test", "x", "ünïcødé"] {
            let code = generator.generate(url, Timestamp::now());
            assert_eq!(code.as_str().len(), CODE_LENGTH);
            assert!(code
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn is_deterministic_for_the_same_instant() {
        let generator = HashGenerator::new();
        let instant = at(1_700_000_000_123_456_789);

        let first = generator.generate("https://example.com", instant);
        let second = generator.generate("https://example.com", instant);
        assert_eq!(first, second);
    }

    #[test]
    fn keeps_the_digest_prefix() {
        let instant = at(1_700_000_000_000_000_000);
        let seed = format!("https://example.com_{}", instant.as_nanosecond());
        let expected = format!("{:032x}", xxh3_128(seed.as_bytes()));

        let code = HashGenerator::new().generate("https://example.com", instant);
        assert_eq!(code.as_str(), &expected[..CODE_LENGTH]);
    }

    #[test]
    fn varies_with_time_and_input() {
        let generator = HashGenerator::new();
        let codes = [
            generator.generate("https://example.com/a", at(1)),
            generator.generate("https://example.com/a", at(2)),
            generator.generate("https://example.com/b", at(1)),
        ];

        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[0], codes[2]);
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HashGenerator>();
    }
}
