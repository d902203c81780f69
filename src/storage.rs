use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// String-keyed storage the record store persists through.
///
/// Two implementations exist: [`MemoryBackend`] for process-lifetime data
/// (the ephemeral key slot, tests) and [`FileBackend`] for data that must
/// survive restarts (identity catalog, audit log, session flags).
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    /// Returns false instead of failing when the value cannot be persisted.
    fn set_item(&self, key: &str, value: &str) -> bool;

    fn remove_item(&self, key: &str);

    fn keys(&self) -> Vec<String>;
}

/// In-memory backend. Contents live exactly as long as the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> bool {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn remove_item(&self, key: &str) {
        self.items.lock().unwrap().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.items.lock().unwrap().keys().cloned().collect()
    }
}

/// File-backed backend holding all items in a single JSON document.
///
/// The file is created with mode 0o600 and rewritten atomically
/// (temp file + rename) so a crash mid-write never corrupts the store.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    items: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    /// Open the backend, loading any existing document. An unreadable or
    /// malformed document starts the store empty rather than failing.
    pub fn open(path: PathBuf) -> Self {
        let items = Self::load(&path).unwrap_or_default();
        Self {
            path,
            items: Mutex::new(items),
        }
    }

    fn load(path: &PathBuf) -> Option<HashMap<String, String>> {
        if !path.exists() {
            return None;
        }
        let mut file = File::open(path).ok()?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).ok()?;
        serde_json::from_str(&contents).ok()
    }

    fn persist(&self, items: &HashMap<String, String>) -> bool {
        if let Some(parent) = self.path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return false;
            }
        }

        let serialized = match serde_json::to_vec(items) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        let tmp_path = self.path.with_extension("tmp");
        let written = (|| -> std::io::Result<()> {
            let mut file = Self::create_secure_file(&tmp_path)?;
            file.write_all(&serialized)?;
            file.flush()?;
            std::fs::rename(&tmp_path, &self.path)?;
            Ok(())
        })();

        if written.is_err() {
            let _ = std::fs::remove_file(&tmp_path);
            tracing::warn!(path = %self.path.display(), "failed to persist storage file");
            return false;
        }
        true
    }

    fn create_secure_file(path: &PathBuf) -> std::io::Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            options.mode(0o600);
        }

        options.open(path)
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> bool {
        let mut items = self.items.lock().unwrap();
        let previous = items.insert(key.to_string(), value.to_string());
        if self.persist(&items) {
            return true;
        }
        // Roll the cache back so memory and disk stay in agreement.
        match previous {
            Some(old) => items.insert(key.to_string(), old),
            None => items.remove(key),
        };
        false
    }

    fn remove_item(&self, key: &str) {
        let mut items = self.items.lock().unwrap();
        if items.remove(key).is_some() {
            self.persist(&items);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.items.lock().unwrap().keys().cloned().collect()
    }
}
