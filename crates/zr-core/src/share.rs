//! Share sink contract
//!
//! The platform share sheet and photo gallery live outside this crate. Callers
//! implement [`ShareSink`] and use [`share_artifact`] / [`save_artifact_to_gallery`]
//! so the media type and image checks happen in one place.

use crate::artifact::Artifact;
use thiserror::Error;
use tracing::info;

/// Failure reported by a share sink
#[derive(Debug, Error)]
pub enum ShareError {
    /// Sharing is not available on this device
    #[error("Sharing is not available on this device")]
    Unavailable,

    /// Gallery permission was not granted
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Only images can be saved to the gallery
    #[error("Not an image: {0}")]
    NotAnImage(String),

    /// Artifact file is gone
    #[error("Artifact no longer exists: {0}")]
    Missing(String),

    /// Platform failure
    #[error("Share failed: {0}")]
    Platform(String),
}

/// Platform share/save mechanism
pub trait ShareSink {
    /// Hand the artifact to the share sheet
    fn share(&self, artifact: &Artifact, title: &str) -> Result<(), ShareError>;

    /// Save an image artifact to the device gallery
    fn save_to_gallery(&self, artifact: &Artifact) -> Result<(), ShareError>;
}

/// Default share sheet title
pub const DEFAULT_SHARE_TITLE: &str = "Zr3i Export";

/// Share an artifact after checking it still exists
pub fn share_artifact(
    sink: &dyn ShareSink,
    artifact: &Artifact,
    title: Option<&str>,
) -> Result<(), ShareError> {
    if !artifact.path.exists() {
        return Err(ShareError::Missing(artifact.name.clone()));
    }
    sink.share(artifact, title.unwrap_or(DEFAULT_SHARE_TITLE))?;
    info!("Shared {} ({})", artifact.name, artifact.media_type);
    Ok(())
}

/// Save an artifact to the gallery; non-image artifacts are rejected
pub fn save_artifact_to_gallery(
    sink: &dyn ShareSink,
    artifact: &Artifact,
) -> Result<(), ShareError> {
    if !artifact.is_image() {
        return Err(ShareError::NotAnImage(artifact.name.clone()));
    }
    if !artifact.path.exists() {
        return Err(ShareError::Missing(artifact.name.clone()));
    }
    sink.save_to_gallery(artifact)?;
    info!("Saved {} to gallery", artifact.name);
    Ok(())
}
