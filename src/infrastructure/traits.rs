//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::domain::FlatNode;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace file content; readers never see a partial file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Where flat menu records come from and where edits are published to.
pub trait MenuStore: Send + Sync {
    /// Current flat collection.
    fn load(&self) -> io::Result<Vec<FlatNode>>;

    /// Replace the stored collection.
    fn publish(&self, nodes: &[FlatNode]) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Menu stored as a JSON array of records in one file.
///
/// A missing file is an empty menu.
pub struct JsonFileStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_fs(path, Arc::new(RealFileSystem))
    }

    pub fn with_fs(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn invalid_data(path: &Path, e: serde_json::Error) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{}: {}", path.display(), e),
    )
}

impl MenuStore for JsonFileStore {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> io::Result<Vec<FlatNode>> {
        if !self.fs.exists(&self.path) {
            debug!("menu file missing, starting empty");
            return Ok(Vec::new());
        }
        let content = self.fs.read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| invalid_data(&self.path, e))
    }

    #[instrument(level = "debug", skip(self, nodes), fields(path = %self.path.display(), records = nodes.len()))]
    fn publish(&self, nodes: &[FlatNode]) -> io::Result<()> {
        let mut content =
            serde_json::to_string_pretty(nodes).map_err(|e| invalid_data(&self.path, e))?;
        content.push('\n');
        self.fs.ensure_parent(&self.path)?;
        self.fs.write(&self.path, &content)
    }
}

/// In-memory store; counts publishes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: Mutex<Vec<FlatNode>>,
    publishes: AtomicUsize,
}

impl MemoryStore {
    pub fn new(nodes: Vec<FlatNode>) -> Self {
        Self {
            nodes: Mutex::new(nodes),
            publishes: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the stored records.
    pub fn nodes(&self) -> Vec<FlatNode> {
        self.nodes.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }
}

impl MenuStore for MemoryStore {
    fn load(&self) -> io::Result<Vec<FlatNode>> {
        self.nodes
            .lock()
            .map(|n| n.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "menu store lock poisoned"))
    }

    fn publish(&self, nodes: &[FlatNode]) -> io::Result<()> {
        let mut guard = self
            .nodes
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "menu store lock poisoned"))?;
        *guard = nodes.to_vec();
        self.publishes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Filesystem kept in a map; records parent-directory requests.
    #[derive(Default)]
    struct InMemoryFs {
        files: Mutex<HashMap<PathBuf, String>>,
        parents: Mutex<Vec<PathBuf>>,
    }

    impl FileSystem for InMemoryFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }

        fn write(&self, path: &Path, content: &str) -> io::Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), content.to_string());
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }

        fn ensure_parent(&self, path: &Path) -> io::Result<()> {
            self.parents.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn given_injected_fs_when_publishing_then_writes_json_through_it() {
        let fs = Arc::new(InMemoryFs::default());
        let store = JsonFileStore::with_fs("/menus/main.json", fs.clone());
        let nodes = vec![FlatNode::new("home", "Home", 10)];

        store.publish(&nodes).unwrap();

        let written = fs.files.lock().unwrap()[Path::new("/menus/main.json")].clone();
        assert!(written.contains("\"identifier\": \"home\""));
        assert!(written.ends_with('\n'));
        assert_eq!(fs.parents.lock().unwrap().len(), 1);
        assert_eq!(store.load().unwrap(), nodes);
    }

    #[test]
    fn given_blank_file_in_injected_fs_when_loading_then_empty() {
        let fs = Arc::new(InMemoryFs::default());
        fs.write(Path::new("menu.json"), "  \n").unwrap();
        let store = JsonFileStore::with_fs("menu.json", fs);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn given_missing_file_when_loading_then_empty() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp.path().join("menu.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn given_published_records_when_loading_then_reads_them_back() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp.path().join("nested/menu.json"));
        let nodes = vec![
            FlatNode::new("u1", "Unit 1", 10),
            FlatNode::new("u1a", "Sub", 10).with_parent("u1"),
        ];

        store.publish(&nodes).unwrap();

        assert_eq!(store.load().unwrap(), nodes);
    }

    #[test]
    fn given_malformed_json_when_loading_then_invalid_data() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("menu.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn given_memory_store_when_publishing_then_counts() {
        let store = MemoryStore::default();
        store.publish(&[FlatNode::new("a", "A", 10)]).unwrap();
        assert_eq!(store.publish_count(), 1);
        assert_eq!(store.nodes().len(), 1);
    }
}
