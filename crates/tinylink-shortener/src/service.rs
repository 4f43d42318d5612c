use std::path::PathBuf;
use tinylink_core::{Clock, Repository, ShortCode, ShortenerError, SystemClock, UrlRecord};
use tinylink_generator::{Generator, HashGenerator};
use tinylink_storage::JsonFileRepository;
use tracing::{debug, warn};

/// The file-backed shortener: a JSON backing file, hash-derived codes and
/// the system clock.
pub type UrlShortener = ShortenerService<JsonFileRepository, HashGenerator>;

/// Maps short codes to original URLs.
///
/// This service wraps a `Repository`, a `Generator` and a `Clock` to handle:
/// - Short code generation (auto-generated or custom)
/// - Record timestamps
/// - Lookups
///
/// Writes follow last-write-wins: creating a code that already exists
/// replaces the stored record. Replacements are reported as `warn` events
/// but never rejected. No collision retry is performed for generated codes.
#[derive(Debug)]
pub struct ShortenerService<R, G, C = SystemClock> {
    repository: R,
    generator: G,
    clock: C,
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService` driven by the system clock.
    pub fn new(repository: R, generator: G) -> Self {
        Self::with_clock(repository, generator, SystemClock)
    }
}

impl UrlShortener {
    /// Opens the mapping table stored at `storage_path`.
    ///
    /// The file does not need to exist. Fails with
    /// [`StorageError::CorruptStorage`](tinylink_core::StorageError::CorruptStorage)
    /// when it exists but cannot be parsed.
    pub fn open(storage_path: impl Into<PathBuf>) -> Result<Self, ShortenerError> {
        let repository = JsonFileRepository::open(storage_path)?;
        Ok(Self::new(repository, HashGenerator::new()))
    }
}

impl<R: Repository, G: Generator, C: Clock> ShortenerService<R, G, C> {
    pub fn with_clock(repository: R, generator: G, clock: C) -> Self {
        Self {
            repository,
            generator,
            clock,
        }
    }

    fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Stores `original_url` and returns the code it can be looked up by.
    ///
    /// A non-empty `custom_code` is used verbatim. Otherwise a code is
    /// derived from the URL and the current time. The whole table is
    /// persisted before returning; if that fails the error is returned but
    /// the record stays visible to [`get_original_url`](Self::get_original_url).
    pub fn create_short_code(
        &mut self,
        original_url: &str,
        custom_code: Option<&str>,
    ) -> Result<ShortCode, ShortenerError> {
        Self::validate_url(original_url)?;

        let now = self.clock.now();
        let custom_code = custom_code.filter(|code| !code.is_empty());
        let code = match custom_code {
            Some(code) => ShortCode::new(code)?,
            None => self.generator.generate(original_url, now).into(),
        };

        let record = UrlRecord::new(original_url, now);
        if let Some(previous) = self.repository.upsert(&code, record)? {
            warn!(
                code = %code,
                previous_url = %previous.original_url,
                original_url,
                "short code collision, replaced existing record"
            );
        }

        debug!(code = %code, original_url, custom = custom_code.is_some(), "created short code");

        Ok(code)
    }

    /// Returns the URL stored under `code`, or `None` if there is none.
    pub fn get_original_url(&self, code: &str) -> Option<&str> {
        self.resolve(code).map(|record| record.original_url.as_str())
    }

    /// Returns the full record stored under `code`.
    pub fn resolve(&self, code: &str) -> Option<&UrlRecord> {
        self.repository.get(code)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::{SignedDuration, Timestamp};
    use std::sync::{Arc, Mutex};
    use tinylink_generator::CODE_LENGTH;
    use tinylink_storage::{InMemoryRepository, ReadRepository};

    #[derive(Clone)]
    struct TestClock {
        now: Arc<Mutex<Timestamp>>,
    }

    impl TestClock {
        fn new(now: Timestamp) -> Self {
            Self {
                now: Arc::new(Mutex::new(now)),
            }
        }

        fn advance(&self, by: SignedDuration) {
            let mut now = self.now.lock().expect("test clock lock should not be poisoned");
            *now += by;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Timestamp {
            *self.now.lock().expect("test clock lock should not be poisoned")
        }
    }

    /// Always yields the same code, to force collisions.
    struct ConstGenerator(&'static str);

    impl Generator for ConstGenerator {
        type Output = ShortCode;

        fn generate(&self, _original_url: &str, _at: Timestamp) -> ShortCode {
            ShortCode::new_unchecked(self.0)
        }
    }

    fn start() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    fn test_service() -> (
        ShortenerService<InMemoryRepository, HashGenerator, TestClock>,
        TestClock,
    ) {
        let clock = TestClock::new(start());
        let service =
            ShortenerService::with_clock(InMemoryRepository::new(), HashGenerator::new(), clock.clone());
        (service, clock)
    }

    #[test]
    fn shorten_with_auto_generated_code() {
        let (mut service, _clock) = test_service();

        let code = service
            .create_short_code("https://example.com/test", None)
            .unwrap();

        assert_eq!(code.as_str().len(), CODE_LENGTH);
        assert_eq!(
            service.get_original_url(code.as_str()),
            Some("https://example.com/test")
        );
    }

    #[test]
    fn generated_code_is_derived_from_clock_time() {
        let (mut service, _clock) = test_service();

        let code = service.create_short_code("https://example.com", None).unwrap();

        let expected = HashGenerator::new().generate("https://example.com", start());
        assert_eq!(code, expected);
    }

    #[test]
    fn shorten_with_custom_code() {
        let (mut service, _clock) = test_service();

        let code = service
            .create_short_code("https://example.com/custom", Some("custom"))
            .unwrap();

        assert_eq!(code.as_str(), "custom");
        assert_eq!(
            service.get_original_url("custom"),
            Some("https://example.com/custom")
        );
    }

    #[test]
    fn empty_custom_code_falls_back_to_generation() {
        let (mut service, _clock) = test_service();

        let code = service
            .create_short_code("https://example.com", Some(""))
            .unwrap();

        assert_eq!(code.as_str().len(), CODE_LENGTH);
    }

    #[test]
    fn empty_url_is_rejected() {
        let (mut service, _clock) = test_service();

        let err = service.create_short_code("", None).unwrap_err();

        assert!(matches!(err, ShortenerError::InvalidUrl(_)));
        assert!(service.repository().is_empty());
    }

    #[test]
    fn url_format_is_not_validated() {
        let (mut service, _clock) = test_service();

        let code = service.create_short_code("not a url", None).unwrap();
        assert_eq!(service.get_original_url(code.as_str()), Some("not a url"));
    }

    #[test]
    fn duplicate_custom_code_keeps_latest() {
        let (mut service, clock) = test_service();

        service
            .create_short_code("https://example1.com", Some("my-alias"))
            .unwrap();
        clock.advance(SignedDuration::from_secs(5));
        service
            .create_short_code("https://example2.com", Some("my-alias"))
            .unwrap();

        let record = service.resolve("my-alias").unwrap();
        assert_eq!(record.original_url, "https://example2.com");
        assert_eq!(record.created_at, start() + SignedDuration::from_secs(5));
        assert_eq!(service.repository().len(), 1);
    }

    #[test]
    fn generated_collision_overwrites() {
        let clock = TestClock::new(start());
        let mut service =
            ShortenerService::with_clock(InMemoryRepository::new(), ConstGenerator("aaaaaa"), clock);

        service.create_short_code("https://first.com", None).unwrap();
        let code = service.create_short_code("https://second.com", None).unwrap();

        assert_eq!(code.as_str(), "aaaaaa");
        assert_eq!(service.get_original_url("aaaaaa"), Some("https://second.com"));
    }

    #[test]
    fn records_creation_time() {
        let (mut service, clock) = test_service();
        clock.advance(SignedDuration::from_mins(3));

        service
            .create_short_code("https://example.com", Some("abc"))
            .unwrap();

        let record = service.resolve("abc").unwrap();
        assert_eq!(record.created_at, start() + SignedDuration::from_mins(3));
    }

    #[test]
    fn resolve_nonexistent_code() {
        let (service, _clock) = test_service();

        assert!(service.get_original_url("nonexistent").is_none());
        assert!(service.resolve("nonexistent").is_none());
        assert!(service.get_original_url("").is_none());
    }

    #[test]
    fn repeated_reads_are_stable() {
        let (mut service, _clock) = test_service();
        let code = service.create_short_code("https://example.com", None).unwrap();

        let first = service.get_original_url(code.as_str());
        let second = service.get_original_url(code.as_str());
        assert_eq!(first, second);
        assert_eq!(first, Some("https://example.com"));
    }
}
