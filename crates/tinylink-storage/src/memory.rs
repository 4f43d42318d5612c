use std::collections::HashMap;
use tinylink_core::repository::{ReadRepository, Repository, Result, UrlRecord};
use tinylink_core::ShortCode;

/// Non-durable repository backed by a `HashMap`.
///
/// Records live as long as the repository value. Writes never fail.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: HashMap<String, UrlRecord>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: HashMap::with_capacity(capacity),
        }
    }
}

impl ReadRepository for InMemoryRepository {
    fn get(&self, code: &str) -> Option<&UrlRecord> {
        self.storage.get(code)
    }

    fn len(&self) -> usize {
        self.storage.len()
    }
}

impl Repository for InMemoryRepository {
    fn upsert(&mut self, code: &ShortCode, record: UrlRecord) -> Result<Option<UrlRecord>> {
        Ok(self.storage.insert(code.as_str().to_owned(), record))
    }
}
