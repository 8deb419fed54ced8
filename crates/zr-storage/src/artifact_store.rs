//! File system storage for export artifacts

use chrono::{DateTime, Utc};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use zr_core::artifact::{sort_newest_first, DEFAULT_RETENTION_CAP};
use zr_core::error::{StoreError, StoreResult};
use zr_core::{Artifact, ArtifactStorage, Body, CancelGuard, MediaType};

/// Serialized writer state
struct WriterState {
    /// Last name token handed out, in epoch milliseconds
    last_token: i64,
}

/// File system based artifact storage
///
/// Every artifact is a regular file directly under the root. Files whose
/// names start with a dot are in-flight temp files and never listed.
pub struct FileSystemArtifactStore {
    /// Export directory
    root: PathBuf,
    /// Retention cap
    cap: usize,
    state: Mutex<WriterState>,
}

impl FileSystemArtifactStore {
    /// Create a store rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>, cap: usize) -> StoreResult<Self> {
        Ok(Self {
            root: root.into(),
            cap,
            state: Mutex::new(WriterState { last_token: 0 }),
        })
    }

    /// Create a store in the platform data directory
    pub fn default_location() -> StoreResult<Self> {
        Self::new(Self::default_root(), DEFAULT_RETENTION_CAP)
    }

    /// Platform export directory (`~/.zr-export/exports` as a fallback)
    pub fn default_root() -> PathBuf {
        directories::ProjectDirs::from("com", "zr3i", "zr-export")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".zr-export")
            })
            .join("exports")
    }

    /// Get the export directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock(&self) -> MutexGuard<'_, WriterState> {
        // a panicked writer leaves nothing half-visible, so the state is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Next unique token; strictly increasing within this store
    fn next_token(state: &mut WriterState) -> i64 {
        let now = Utc::now().timestamp_millis();
        let token = now.max(state.last_token + 1);
        state.last_token = token;
        token
    }

    /// Pick a final name that does not collide with an existing file
    fn reserve_name(&self, state: &mut WriterState, base_name: &str, ext: &str) -> (String, PathBuf) {
        loop {
            let name = format!("{}_{}.{}", base_name, Self::next_token(state), ext);
            let path = self.root.join(&name);
            if !path.exists() {
                return (name, path);
            }
        }
    }

    fn write_temp(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }

    /// Build the artifact record for a stored file
    fn describe(path: &Path) -> io::Result<Artifact> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "non UTF-8 file name"))?
            .to_string();

        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
        }

        let modified_at: DateTime<Utc> = metadata.modified()?.into();
        let created_at = metadata
            .created()
            .map(DateTime::<Utc>::from)
            .unwrap_or(modified_at);

        Ok(Artifact {
            media_type: MediaType::resolve(&name).to_string(),
            name,
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            created_at,
            modified_at,
        })
    }

    /// Describe a freshly renamed file, removing it if that fails
    fn describe_or_discard(path: &Path) -> StoreResult<Artifact> {
        Self::describe(path).map_err(|e| {
            let _ = fs::remove_file(path);
            StoreError::Io(e)
        })
    }

    fn scan(&self) -> StoreResult<Vec<Artifact>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut artifacts = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();

            // Skip temp files and other hidden entries
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            match Self::describe(&path) {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => warn!("Skipping unreadable export {:?}: {}", path, e),
            }
        }

        sort_newest_first(&mut artifacts);
        Ok(artifacts)
    }

    fn remove(&self, path: &Path) -> StoreResult<()> {
        if path.parent() != Some(self.root.as_path()) {
            return Err(StoreError::OutsideRoot(path.to_path_buf()));
        }

        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(true);
        if hidden || !path.is_file() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }

        fs::remove_file(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
            _ => StoreError::Io(e),
        })?;

        debug!("Deleted export {:?}", path);
        Ok(())
    }
}

/// Base names become part of a file name, so only a safe alphabet is allowed
fn validate_base_name(base_name: &str) -> StoreResult<()> {
    let valid = !base_name.is_empty()
        && base_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(base_name.to_string()))
    }
}

impl ArtifactStorage for FileSystemArtifactStore {
    fn ensure_root(&self) -> StoreResult<()> {
        if !self.root.is_dir() {
            fs::create_dir_all(&self.root).map_err(|e| {
                StoreError::Io(io::Error::new(
                    e.kind(),
                    format!("Failed to create export directory: {}", e),
                ))
            })?;
            debug!("Created export directory: {:?}", self.root);
        }
        Ok(())
    }

    fn write_guarded(
        &self,
        base_name: &str,
        body: &Body,
        guard: &CancelGuard,
    ) -> StoreResult<Artifact> {
        validate_base_name(base_name)?;
        guard.check_store()?;

        let mut state = self.lock();
        self.ensure_root()?;

        let (name, final_path) = self.reserve_name(&mut state, base_name, body.extension);
        let temp_path = self.root.join(format!(".{}.tmp", name));

        if let Err(e) = Self::write_temp(&temp_path, body.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if guard.is_triggered() {
            let _ = fs::remove_file(&temp_path);
            debug!("Discarded {} after cancellation", name);
            return Err(StoreError::Cancelled);
        }

        // Rename to final path (atomic on most filesystems)
        if let Err(e) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::Io(io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            )));
        }

        let artifact = Self::describe_or_discard(&final_path)?;
        debug!("Saved export {} ({} bytes)", artifact.name, artifact.size_bytes);
        Ok(artifact)
    }

    fn list(&self) -> StoreResult<Vec<Artifact>> {
        self.scan()
    }

    fn delete(&self, path: &Path) -> StoreResult<()> {
        let _state = self.lock();
        self.remove(path)
    }

    fn evict_to_cap(&self, cap: usize) -> StoreResult<Vec<Artifact>> {
        let _state = self.lock();

        let stale: Vec<Artifact> = self.scan()?.into_iter().skip(cap).collect();
        let mut removed = Vec::with_capacity(stale.len());
        for artifact in stale {
            match self.remove(&artifact.path) {
                Ok(()) => removed.push(artifact),
                Err(e) => warn!("Failed to evict {}: {}", artifact.name, e),
            }
        }

        if !removed.is_empty() {
            info!("Evicted {} export(s) beyond cap {}", removed.len(), cap);
        }
        Ok(removed)
    }

    fn retention_cap(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::SystemTime;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    fn create_test_store() -> (FileSystemArtifactStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemArtifactStore::new(temp_dir.path().join("exports"), 10).unwrap();
        (store, temp_dir)
    }

    fn csv_body() -> Body {
        Body::text("Field Name\nA\n", "csv")
    }

    fn dir_entries(store: &FileSystemArtifactStore) -> Vec<String> {
        if !store.root().exists() {
            return Vec::new();
        }
        let mut names: Vec<_> = fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_store_creation_is_lazy() {
        let (store, _temp) = create_test_store();
        assert!(!store.root().exists());
        assert!(store.list().unwrap().is_empty());
        assert!(!store.root().exists());

        store.write("field_data", &csv_body()).unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_write_and_read_back() {
        let (store, _temp) = create_test_store();
        let artifact = store.write("field_data", &csv_body()).unwrap();

        assert!(artifact.name.starts_with("field_data_"));
        assert!(artifact.name.ends_with(".csv"));
        assert_eq!(artifact.media_type, "text/csv");
        assert_eq!(artifact.size_bytes, 13);
        assert_eq!(artifact.path, store.root().join(&artifact.name));
        assert_eq!(fs::read_to_string(&artifact.path).unwrap(), "Field Name\nA\n");

        // No temp file left behind
        assert_eq!(dir_entries(&store), vec![artifact.name.clone()]);
    }

    #[test]
    fn test_binary_body() {
        let (store, _temp) = create_test_store();
        let bytes = vec![0x89, b'P', b'N', b'G', 0, 1, 2];
        let artifact = store
            .write("comparative_analysis", &Body::binary(bytes.clone(), "png"))
            .unwrap();

        assert!(artifact.is_image());
        assert_eq!(fs::read(&artifact.path).unwrap(), bytes);
    }

    #[test]
    fn test_names_are_unique() {
        let (store, _temp) = create_test_store();
        let names: HashSet<_> = (0..25)
            .map(|_| store.write("weather_data", &csv_body()).unwrap().name)
            .collect();
        assert_eq!(names.len(), 25);
    }

    #[test]
    fn test_same_base_artifacts_are_independent() {
        let (store, _temp) = create_test_store();
        let first = store
            .write("field_data", &Body::text("first\n", "csv"))
            .unwrap();
        let second = store
            .write("field_data", &Body::text("second\n", "csv"))
            .unwrap();
        assert_ne!(first.name, second.name);

        assert_eq!(fs::read_to_string(&first.path).unwrap(), "first\n");
        assert_eq!(fs::read_to_string(&second.path).unwrap(), "second\n");

        store.delete(&first.path).unwrap();
        let list = store.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, second.name);
        assert_eq!(fs::read_to_string(&second.path).unwrap(), "second\n");
    }

    #[test]
    fn test_concurrent_writes() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(FileSystemArtifactStore::new(temp.path(), 100).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        store.write("field_data", &csv_body()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.list().unwrap().len(), 20);
    }

    #[test]
    fn test_list_newest_first_and_evict() {
        let (store, _temp) = create_test_store();
        let written: Vec<_> = (0..12)
            .map(|_| store.write("field_data", &csv_body()).unwrap())
            .collect();

        let list = store.list().unwrap();
        assert_eq!(list.len(), 12);
        assert_eq!(list[0].name, written[11].name);

        let removed = store.evict_to_cap(10).unwrap();
        let removed_names: HashSet<_> = removed.iter().map(|a| a.name.clone()).collect();
        let expected: HashSet<_> = written[..2].iter().map(|a| a.name.clone()).collect();
        assert_eq!(removed_names, expected);

        let list = store.list().unwrap();
        assert_eq!(list.len(), 10);
        assert_eq!(list[0].name, written[11].name);
        assert!(!written[0].path.exists());
    }

    #[test]
    fn test_equal_mtimes_evict_by_write_order() {
        let (store, _temp) = create_test_store();
        let written: Vec<_> = (0..12)
            .map(|i| {
                let base = if i % 2 == 0 { "weather_data" } else { "field_data" };
                store.write(base, &csv_body()).unwrap()
            })
            .collect();

        // coarse file system clocks give a whole batch one timestamp
        let instant = SystemTime::now();
        for artifact in &written {
            fs::File::options()
                .write(true)
                .open(&artifact.path)
                .unwrap()
                .set_modified(instant)
                .unwrap();
        }

        let list = store.list().unwrap();
        assert_eq!(list[0].name, written[11].name);

        store.evict_to_cap(10).unwrap();
        let kept: HashSet<_> = store.list().unwrap().into_iter().map(|a| a.name).collect();
        let newest: HashSet<_> = written[2..].iter().map(|a| a.name.clone()).collect();
        assert_eq!(kept, newest);
    }

    #[test]
    fn test_evict_under_cap() {
        let (store, _temp) = create_test_store();
        store.write("field_data", &csv_body()).unwrap();

        assert!(store.enforce_retention().unwrap().is_empty());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_write_leaves_nothing() {
        let (store, _temp) = create_test_store();
        // longer than any file name the file system accepts
        let base_name = "f".repeat(300);

        let result = store.write(&base_name, &csv_body());
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(dir_entries(&store).is_empty());
    }

    #[test]
    fn test_invalid_base_name() {
        let (store, _temp) = create_test_store();
        for name in ["", "../escape", "a b", ".hidden"] {
            let result = store.write(name, &csv_body());
            assert!(matches!(result, Err(StoreError::InvalidName(_))), "{:?}", name);
        }
        assert!(dir_entries(&store).is_empty());
    }

    #[test]
    fn test_cancelled_write_leaves_nothing() {
        let (store, _temp) = create_test_store();
        let token = CancellationToken::new();
        token.cancel();

        let guard = CancelGuard::new(Some(token), None);
        let result = store.write_guarded("field_data", &csv_body(), &guard);
        assert!(matches!(result, Err(StoreError::Cancelled)));
        assert!(dir_entries(&store).is_empty());
    }

    #[test]
    fn test_delete_artifact() {
        let (store, _temp) = create_test_store();
        let artifact = store.write("field_data", &csv_body()).unwrap();

        store.delete(&artifact.path).unwrap();
        assert!(!artifact.path.exists());

        let result = store.delete(&artifact.path);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_delete_outside_root() {
        let (store, temp) = create_test_store();
        let outside = temp.path().join("notes.txt");
        fs::write(&outside, "keep me").unwrap();

        let result = store.delete(&outside);
        assert!(matches!(result, Err(StoreError::OutsideRoot(_))));
        assert!(outside.exists());
    }

    #[test]
    fn test_ignores_temp_and_hidden_files() {
        let (store, _temp) = create_test_store();
        store.ensure_root().unwrap();
        fs::write(store.root().join(".field_data_1.csv.tmp"), "partial").unwrap();
        fs::write(store.root().join(".DS_Store"), "").unwrap();

        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_ignores_subdirectories() {
        let (store, _temp) = create_test_store();
        store.ensure_root().unwrap();
        fs::create_dir(store.root().join("nested")).unwrap();
        store.write("field_data", &csv_body()).unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_lists_foreign_files() {
        let (store, _temp) = create_test_store();
        store.ensure_root().unwrap();
        fs::write(store.root().join("manual.pdf"), "%PDF").unwrap();

        let list = store.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].media_type, "application/pdf");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_undescribable_file_is_discarded() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (store, _temp) = create_test_store();
        store.ensure_root().unwrap();
        let path = store.root().join(OsStr::from_bytes(b"field_data_\xff.csv"));
        fs::write(&path, "x").unwrap();

        let result = FileSystemArtifactStore::describe_or_discard(&path);
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_ensure_root_idempotent() {
        let (store, _temp) = create_test_store();
        store.ensure_root().unwrap();
        store.ensure_root().unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_missing_root_lists_empty_and_write_recreates() {
        let (store, _temp) = create_test_store();
        store.write("field_data", &csv_body()).unwrap();
        fs::remove_dir_all(store.root()).unwrap();

        assert!(store.list().unwrap().is_empty());
        store.write("field_data", &csv_body()).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_retention_cap() {
        let temp = TempDir::new().unwrap();
        let store = FileSystemArtifactStore::new(temp.path(), 3).unwrap();
        assert_eq!(store.retention_cap(), 3);
    }
}
