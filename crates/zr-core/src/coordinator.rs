//! Export coordinator
//!
//! Ties a request to a generator and the artifact store. Each request moves
//! through `Requested → Generating → Writing → Succeeded`, or ends in
//! `Failed` from any step. There is no retry state: callers resubmit.

use crate::artifact::{Artifact, ArtifactStorage, CancelGuard};
use crate::config::Config;
use crate::error::{ExportError, Result};
use crate::generate::{GenerationContext, GeneratorRegistry, RenderTarget};
use crate::payload::ExportPayload;
use crate::types::{ExportKind, FormatKind, Locale};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Step of a single export request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Requested,
    Generating,
    Writing,
    Succeeded,
    Failed,
}

/// One export request
pub struct ExportRequest<'a> {
    pub kind: ExportKind,
    pub format: FormatKind,
    pub payload: &'a ExportPayload,
    /// Chart to capture for image exports
    pub render_target: Option<&'a dyn RenderTarget>,
}

impl<'a> ExportRequest<'a> {
    /// Request with the kind taken from the payload
    pub fn new(format: FormatKind, payload: &'a ExportPayload) -> Self {
        Self {
            kind: payload.kind(),
            format,
            payload,
            render_target: None,
        }
    }

    /// Attach a chart to capture
    pub fn with_render_target(mut self, target: &'a dyn RenderTarget) -> Self {
        self.render_target = Some(target);
        self
    }
}

/// Per-call options
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Overrides the coordinator's locale
    pub locale: Option<Locale>,
    /// Cancels generation or the pending write
    pub cancel: Option<CancellationToken>,
    /// Overrides the coordinator's timeout
    pub timeout: Option<Duration>,
}

type StateObserver = Box<dyn Fn(ExportKind, ExportState) + Send + Sync>;

/// Coordinator for export requests
pub struct ExportCoordinator {
    /// Storage backend
    storage: Arc<dyn ArtifactStorage>,
    /// Generators by format
    generators: GeneratorRegistry,
    /// Enforce retention after each export
    auto_evict: bool,
    /// Default report locale
    locale: Locale,
    /// Default timeout
    timeout: Option<Duration>,
    observer: Option<StateObserver>,
}

impl ExportCoordinator {
    /// Create a coordinator with default generators
    pub fn new(storage: impl ArtifactStorage + 'static) -> Self {
        Self::with_storage(Arc::new(storage))
    }

    /// Create a coordinator with shared storage
    pub fn with_storage(storage: Arc<dyn ArtifactStorage>) -> Self {
        Self {
            storage,
            generators: GeneratorRegistry::new(),
            auto_evict: true,
            locale: Locale::default(),
            timeout: None,
            observer: None,
        }
    }

    /// Create a coordinator configured from a [`Config`]
    pub fn from_config(storage: Arc<dyn ArtifactStorage>, config: &Config) -> Self {
        Self {
            storage,
            generators: GeneratorRegistry::from_config(&config.export),
            auto_evict: config.store.auto_evict,
            locale: config.export.default_locale,
            timeout: config.export.timeout(),
            observer: None,
        }
    }

    /// Set whether retention is enforced after each export
    pub fn with_auto_evict(mut self, auto_evict: bool) -> Self {
        self.auto_evict = auto_evict;
        self
    }

    /// Set the default locale
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Replace the generator registry
    pub fn with_generators(mut self, generators: GeneratorRegistry) -> Self {
        self.generators = generators;
        self
    }

    /// Observe state transitions of every request
    pub fn with_observer(
        mut self,
        observer: impl Fn(ExportKind, ExportState) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Get the storage backend
    pub fn storage(&self) -> &Arc<dyn ArtifactStorage> {
        &self.storage
    }

    /// Export one payload
    pub fn export_one(
        &self,
        kind: ExportKind,
        format: FormatKind,
        payload: &ExportPayload,
        render_target: Option<&dyn RenderTarget>,
    ) -> Result<Artifact> {
        let request = ExportRequest {
            kind,
            format,
            payload,
            render_target,
        };
        self.export(&request, &ExportOptions::default())
    }

    /// Export one request with options
    pub fn export(&self, request: &ExportRequest<'_>, options: &ExportOptions) -> Result<Artifact> {
        let artifact = self.run(request, options)?;
        if self.auto_evict {
            self.evict_quietly();
        }
        Ok(artifact)
    }

    /// Export several requests, enforcing retention once at the end
    pub fn export_batch(
        &self,
        requests: &[ExportRequest<'_>],
        options: &ExportOptions,
    ) -> Vec<Result<Artifact>> {
        let results: Vec<_> = requests.iter().map(|r| self.run(r, options)).collect();

        if self.auto_evict && results.iter().any(|r| r.is_ok()) {
            self.evict_quietly();
        }

        results
    }

    /// Enforce the store's retention cap
    ///
    /// Returns the removed artifacts, or `EvictionPartialFailure` when some
    /// stale artifacts could not be deleted.
    pub fn enforce_retention(&self) -> Result<Vec<Artifact>> {
        let cap = self.storage.retention_cap();
        let removed = self.storage.evict_to_cap(cap)?;
        let remaining = self.storage.list()?.len();

        if remaining > cap {
            return Err(ExportError::EvictionPartialFailure {
                removed: removed.len(),
                remaining,
                cap,
            });
        }

        Ok(removed)
    }

    /// List stored artifacts, most recent first
    pub fn list(&self) -> Result<Vec<Artifact>> {
        Ok(self.storage.list()?)
    }

    /// Delete one artifact
    pub fn delete(&self, path: &Path) -> Result<()> {
        self.storage.delete(path)?;
        Ok(())
    }

    fn notify(&self, kind: ExportKind, state: ExportState) {
        debug!("Export {} -> {:?}", kind, state);
        if let Some(observer) = &self.observer {
            observer(kind, state);
        }
    }

    fn run(&self, request: &ExportRequest<'_>, options: &ExportOptions) -> Result<Artifact> {
        self.notify(request.kind, ExportState::Requested);

        let result = self.run_steps(request, options);
        match &result {
            Ok(artifact) => {
                info!(
                    "Exported {} as {} to {} ({} bytes)",
                    request.kind, request.format, artifact.name, artifact.size_bytes
                );
                self.notify(request.kind, ExportState::Succeeded);
            }
            Err(e) => {
                warn!("Export of {} as {} failed: {}", request.kind, request.format, e);
                self.notify(request.kind, ExportState::Failed);
            }
        }
        result
    }

    fn run_steps(&self, request: &ExportRequest<'_>, options: &ExportOptions) -> Result<Artifact> {
        let ExportRequest {
            kind,
            format,
            payload,
            render_target,
        } = *request;

        if payload.kind() != kind || !kind.supports(format) {
            return Err(ExportError::UnsupportedCombination { kind, format });
        }

        let guard = CancelGuard::new(options.cancel.clone(), options.timeout.or(self.timeout));
        let mut ctx = GenerationContext::now()
            .with_locale(options.locale.unwrap_or(self.locale))
            .with_guard(guard.clone());
        if let Some(target) = render_target {
            ctx = ctx.with_render_target(target);
        }

        self.notify(kind, ExportState::Generating);
        let body = self.generators.generate(format, payload, &ctx)?;

        self.notify(kind, ExportState::Writing);
        let artifact = self.storage.write_guarded(kind.as_str(), &body, &guard)?;
        Ok(artifact)
    }

    fn evict_quietly(&self) {
        match self.enforce_retention() {
            Ok(removed) if !removed.is_empty() => {
                info!("Evicted {} old export(s)", removed.len());
            }
            Ok(_) => {}
            Err(e) => warn!("Retention not enforced: {}", e),
        }
    }
}
