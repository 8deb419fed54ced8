//! Artifacts and the storage contract

use crate::error::{GenerationError, StoreError, StoreResult};
use crate::media::MediaType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Default retention cap of a store
pub const DEFAULT_RETENTION_CAP: usize = 10;

/// A persisted export file plus its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// File name, unique within the store
    pub name: String,
    /// Fully-qualified path
    pub path: PathBuf,
    pub size_bytes: u64,
    pub media_type: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Artifact {
    /// Resolved media type
    pub fn media(&self) -> MediaType {
        MediaType::resolve(&self.name)
    }

    /// Whether the artifact is an image
    pub fn is_image(&self) -> bool {
        self.media().is_image()
    }

    /// Human-readable size
    pub fn display_size(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Format a byte count as `1.5 KB`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // two decimals, trailing zeros dropped
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// Content of a generated body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyData {
    Text(String),
    Binary(Vec<u8>),
}

/// Generator output ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub data: BodyData,
    /// Canonical extension without the dot
    pub extension: &'static str,
}

impl Body {
    /// Create a text body
    pub fn text(content: impl Into<String>, extension: &'static str) -> Self {
        Self {
            data: BodyData::Text(content.into()),
            extension,
        }
    }

    /// Create a binary body
    pub fn binary(bytes: Vec<u8>, extension: &'static str) -> Self {
        Self {
            data: BodyData::Binary(bytes),
            extension,
        }
    }

    /// Raw bytes to write
    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            BodyData::Text(s) => s.as_bytes(),
            BodyData::Binary(b) => b,
        }
    }

    /// Text content, if this is a text body
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            BodyData::Text(s) => Some(s),
            BodyData::Binary(_) => None,
        }
    }

    /// Suggested media type
    pub fn media_type(&self) -> MediaType {
        MediaType::from_extension(self.extension)
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Cancellation token plus optional deadline, checked between steps
#[derive(Debug, Clone, Default)]
pub struct CancelGuard {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl CancelGuard {
    /// A guard that never triggers
    pub fn none() -> Self {
        Self::default()
    }

    /// Create a guard from an optional token and timeout
    pub fn new(token: Option<CancellationToken>, timeout: Option<Duration>) -> Self {
        Self {
            token,
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// Whether the token fired or the deadline passed
    pub fn is_triggered(&self) -> bool {
        self.token
            .as_ref()
            .map(|t| t.is_cancelled())
            .unwrap_or(false)
            || self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    /// Fail generation if triggered
    pub fn check(&self) -> Result<(), GenerationError> {
        if self.is_triggered() {
            Err(GenerationError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Fail a store write if triggered
    pub fn check_store(&self) -> StoreResult<()> {
        if self.is_triggered() {
            Err(StoreError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Trait for artifact store implementations
///
/// Mutating operations (`write_guarded`, `delete`, `evict_to_cap`) must be
/// serialized per store instance; `list` may run at any time and always
/// reflects the backing medium rather than cached metadata.
pub trait ArtifactStorage: Send + Sync {
    /// Create the store root if absent
    fn ensure_root(&self) -> StoreResult<()>;

    /// Persist a body under `<base_name>_<token>.<ext>`; nothing becomes
    /// visible if the guard triggers or the write fails
    fn write_guarded(&self, base_name: &str, body: &Body, guard: &CancelGuard)
        -> StoreResult<Artifact>;

    /// List artifacts, most recently modified first
    fn list(&self) -> StoreResult<Vec<Artifact>>;

    /// Delete one artifact; deleting a missing path is an error
    fn delete(&self, path: &Path) -> StoreResult<()>;

    /// Delete every artifact beyond position `cap`, returning those removed
    fn evict_to_cap(&self, cap: usize) -> StoreResult<Vec<Artifact>>;

    /// Retention cap configured for this store
    fn retention_cap(&self) -> usize {
        DEFAULT_RETENTION_CAP
    }

    /// Persist a body without cancellation
    fn write(&self, base_name: &str, body: &Body) -> StoreResult<Artifact> {
        self.write_guarded(base_name, body, &CancelGuard::none())
    }

    /// Enforce the configured retention cap
    fn enforce_retention(&self) -> StoreResult<Vec<Artifact>> {
        self.evict_to_cap(self.retention_cap())
    }

    /// Find an artifact by file name
    fn find(&self, name: &str) -> StoreResult<Option<Artifact>> {
        Ok(self.list()?.into_iter().find(|a| a.name == name))
    }
}

/// Trailing `_<token>` of an artifact name, e.g. `1700000000000` in
/// `field_data_1700000000000.csv`
pub fn name_token(name: &str) -> Option<i64> {
    let stem = Path::new(name).file_stem()?.to_str()?;
    let (_, token) = stem.rsplit_once('_')?;
    token.parse().ok()
}

/// Sort artifacts most recent first
///
/// Coarse file system timestamps tie often, so equal `modified_at` values
/// fall back to the name token and then to the full name.
pub fn sort_newest_first(artifacts: &mut [Artifact]) {
    artifacts.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| name_token(&b.name).cmp(&name_token(&a.name)))
            .then_with(|| b.name.cmp(&a.name))
    });
}
