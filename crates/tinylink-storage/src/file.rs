use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tinylink_core::error::StorageError;
use tinylink_core::repository::{ReadRepository, Repository, Result, UrlRecord};
use tinylink_core::ShortCode;
use tracing::{debug, info};

/// On-disk layout of the mapping table.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    urls: BTreeMap<String, UrlRecord>,
}

/// Repository that keeps the whole mapping table in memory and mirrors it
/// to a JSON file.
///
/// The file is read once in [`open`](Self::open). Every successful
/// [`upsert`](Repository::upsert) rewrites the complete file: the document
/// is written to a temporary file next to the target and renamed over it,
/// so a crash mid-write leaves the previous contents in place.
///
/// If the path is a symlink, writes go to the file it points to and the
/// link is left in place. An existing file keeps its permissions.
///
/// There is no locking. Two repositories pointed at the same path overwrite
/// each other's changes.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    target: PathBuf,
    document: Document,
}

impl JsonFileRepository {
    /// Loads the mapping table stored at `path`.
    ///
    /// A missing file, or one that is empty or whitespace-only, yields an
    /// empty table. The file is not created until the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let target = Self::resolve_target(&path)?;

        let document = match fs::read(&path) {
            Ok(content) => Self::parse(&path, &content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "backing file not found, starting with an empty table");
                Document::default()
            }
            Err(e) => return Err(StorageError::io(path, e)),
        };

        info!(
            path = %path.display(),
            records = document.urls.len(),
            "loaded url mappings"
        );

        Ok(Self {
            path,
            target,
            document,
        })
    }

    /// Path of the backing file, as given to [`open`](Self::open).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterates over all stored mappings in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UrlRecord)> {
        self.document
            .urls
            .iter()
            .map(|(code, record)| (code.as_str(), record))
    }

    /// Follows a symlink at `path` to the file that should be rewritten.
    fn resolve_target(path: &Path) -> Result<PathBuf> {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(path) {
                Ok(target) => Ok(target),
                // dangling link: write where it points
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    let link = fs::read_link(path).map_err(|e| StorageError::io(path, e))?;
                    let base = path.parent().unwrap_or_else(|| Path::new(""));
                    Ok(base.join(link))
                }
                Err(e) => Err(StorageError::io(path, e)),
            },
            _ => Ok(path.to_path_buf()),
        }
    }

    fn parse(path: &Path, content: &[u8]) -> Result<Document> {
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::default());
        }
        serde_json::from_slice(content).map_err(|e| StorageError::corrupt(path, e))
    }

    fn persist(&self) -> Result<()> {
        let payload = serde_json::to_vec_pretty(&self.document)
            .map_err(|e| StorageError::io(&self.target, e.into()))?;

        let dir = match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
        staged
            .write_all(&payload)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| StorageError::io(staged.path(), e))?;

        match fs::metadata(&self.target) {
            Ok(meta) => staged
                .as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| StorageError::io(staged.path(), e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::io(&self.target, e)),
        }

        staged
            .persist(&self.target)
            .map_err(|e| StorageError::io(&self.target, e.error))?;

        debug!(
            path = %self.target.display(),
            records = self.document.urls.len(),
            bytes = payload.len(),
            "persisted url mappings"
        );

        Ok(())
    }
}

impl ReadRepository for JsonFileRepository {
    fn get(&self, code: &str) -> Option<&UrlRecord> {
        self.document.urls.get(code)
    }

    fn len(&self) -> usize {
        self.document.urls.len()
    }
}

impl Repository for JsonFileRepository {
    fn upsert(&mut self, code: &ShortCode, record: UrlRecord) -> Result<Option<UrlRecord>> {
        let previous = self.document.urls.insert(code.as_str().to_owned(), record);
        self.persist()?;
        Ok(previous)
    }
}
