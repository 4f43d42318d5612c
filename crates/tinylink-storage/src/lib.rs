pub mod file;
pub mod memory;

pub use file::JsonFileRepository;
pub use memory::InMemoryRepository;
pub use tinylink_core::repository::{ReadRepository, Repository, UrlRecord};
pub use tinylink_core::StorageError;
