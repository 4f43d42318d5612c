use crate::error::StorageError;
use crate::shortcode::ShortCode;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL record in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The original URL that was shortened.
    pub original_url: String,
    /// When the record was created.
    #[serde(with = "created_at")]
    pub created_at: Timestamp,
}

impl UrlRecord {
    pub fn new(original_url: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            original_url: original_url.into(),
            created_at,
        }
    }
}

/// Parses a stored creation timestamp.
///
/// RFC 3339 timestamps are taken as-is. Naive ISO-8601 datetimes without an
/// offset are read as wall-clock time in the system time zone.
pub fn parse_created_at(raw: &str) -> std::result::Result<Timestamp, jiff::Error> {
    if let Ok(timestamp) = raw.parse::<Timestamp>() {
        return Ok(timestamp);
    }
    let civil: DateTime = raw.parse()?;
    Ok(civil.to_zoned(TimeZone::system())?.timestamp())
}

mod created_at {
    use jiff::Timestamp;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_created_at(&raw).map_err(de::Error::custom)
    }
}

/// A read-only view of a repository.
///
/// Lookups never fail: a missing code is reported as `None`.
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the URL record for a given short code.
    /// Returns `None` if the code does not exist.
    fn get(&self, code: &str) -> Option<&UrlRecord>;

    /// Number of records currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait Repository: ReadRepository {
    /// Inserts a URL record, replacing any record already stored under `code`.
    ///
    /// Returns the replaced record, if any. Durable backends apply the change
    /// in memory before persisting it, so the new record stays visible even
    /// when the returned result is an error.
    fn upsert(&mut self, code: &ShortCode, record: UrlRecord) -> Result<Option<UrlRecord>>;
}
