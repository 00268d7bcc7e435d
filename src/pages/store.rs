//! Page persistence.
//!
//! # Responsibilities
//! - Load a page by title, distinguishing "missing" from other failures
//! - Save a page, overwriting any previous body
//!
//! # Design Decisions
//! - One flat file per page: `<data_dir>/<title>.txt`
//! - Files are owner read/write only
//! - Titles are validated by the caller before they reach a store

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// A wiki page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub body: String,
}

impl Page {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// An empty page, used when editing a title that does not exist yet.
    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, String::new())
    }
}

/// Error type for page store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("page `{0}` not found")]
    NotFound(String),

    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Storage backend for pages.
pub trait PageStore: Send + Sync + 'static {
    /// Load the page called `title`.
    fn load(&self, title: &str) -> Result<Page, StoreError>;

    /// Persist `page`, replacing any existing body.
    fn save(&self, page: &Page) -> Result<(), StoreError>;
}

/// Stores each page as a text file in a directory.
#[derive(Debug, Clone)]
pub struct FilePageStore {
    dir: PathBuf,
}

impl FilePageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, title: &str) -> PathBuf {
        self.dir.join(format!("{title}.txt"))
    }
}

impl PageStore for FilePageStore {
    fn load(&self, title: &str) -> Result<Page, StoreError> {
        match fs::read(self.path_for(title)) {
            Ok(bytes) => Ok(Page::new(title, String::from_utf8_lossy(&bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(title.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn save(&self, page: &Page) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        write_private(&self.path_for(&page.title), page.body.as_bytes())?;
        tracing::debug!(title = %page.title, bytes = page.body.len(), "Page saved");
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on create; tighten files that already existed.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    fs::write(path, contents)
}

/// Keeps pages in memory. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryPageStore {
    pages: Mutex<HashMap<String, String>>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageStore for MemoryPageStore {
    fn load(&self, title: &str) -> Result<Page, StoreError> {
        let pages = self.pages.lock().unwrap_or_else(|e| e.into_inner());
        pages
            .get(title)
            .map(|body| Page::new(title, body.clone()))
            .ok_or_else(|| StoreError::NotFound(title.to_string()))
    }

    fn save(&self, page: &Page) -> Result<(), StoreError> {
        let mut pages = self.pages.lock().unwrap_or_else(|e| e.into_inner());
        pages.insert(page.title.clone(), page.body.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_saves_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePageStore::new(dir.path().join("pages"));

        store.save(&Page::new("Home", "welcome")).unwrap();
        assert_eq!(store.load("Home").unwrap(), Page::new("Home", "welcome"));
        assert!(dir.path().join("pages/Home.txt").exists());

        store.save(&Page::new("Home", "second")).unwrap();
        assert_eq!(store.load("Home").unwrap().body, "second");
    }

    #[test]
    fn file_store_missing_page_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePageStore::new(dir.path());

        let err = store.load("Nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref t) if t == "Nope"));
    }

    #[cfg(unix)]
    #[test]
    fn file_store_writes_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FilePageStore::new(dir.path());
        store.save(&Page::new("Secret", "x")).unwrap();

        let mode = fs::metadata(dir.path().join("Secret.txt")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn file_store_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let store = FilePageStore::new(&blocker);
        let err = store.save(&Page::new("Home", "x")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn memory_store_behaves_like_a_store() {
        let store = MemoryPageStore::new();
        assert!(matches!(store.load("A"), Err(StoreError::NotFound(_))));

        store.save(&Page::new("A", "body")).unwrap();
        assert_eq!(store.load("A").unwrap().body, "body");
    }
}
