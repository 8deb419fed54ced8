//! zr-core - Core library for zr-export
//!
//! This crate provides the export pipeline of the farm-management client:
//! typed export payloads, format generators (CSV, JSON, HTML report, chart
//! capture), the artifact storage contract, and the export coordinator.

pub mod artifact;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod generate;
pub mod media;
pub mod payload;
pub mod share;
pub mod types;

pub use artifact::{Artifact, ArtifactStorage, Body, BodyData, CancelGuard};
pub use coordinator::{ExportCoordinator, ExportOptions, ExportRequest, ExportState};
pub use error::{ExportError, GenerationError, Result, StoreError, StoreResult};
pub use media::MediaType;
pub use payload::ExportPayload;
pub use types::*;
