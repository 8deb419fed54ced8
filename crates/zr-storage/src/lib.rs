//! zr-storage - Storage library for zr-export
//!
//! This crate provides the file system artifact store.

mod artifact_store;

pub use artifact_store::FileSystemArtifactStore;
