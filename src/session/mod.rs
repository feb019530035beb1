//! Session orchestration: one bundle, many independently loaded charts.

mod host;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, warn};

use crate::bundle::{ArchiveBundle, ArchiveLoader, BlobFetcher};
use crate::config::{ChartFailurePolicy, SessionConfig};
use crate::error::{ChartError, ChartResult};
use crate::interaction::ViewportController;
use crate::metadata::{self, ChartDescriptor, SessionMetadata};
use crate::payload;
use crate::render::ChartRenderer;

pub use host::{HostElement, MountedChart};

/// Session-level result of one `load` call.
#[derive(Debug)]
pub enum SessionOutcome {
    /// Metadata loaded; charts were attempted.
    Loaded { title: String, timestamp: String },
    /// The bundle or its metadata failed; nothing was rendered.
    Failed(ChartError),
}

/// Per-chart accounting for one session.
///
/// Charts dropped because the host detached appear in neither list.
#[derive(Debug)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    /// Filenames of mounted charts, in completion order.
    pub rendered: Vec<String>,
    pub omitted: Vec<(String, ChartError)>,
}

impl SessionReport {
    fn failed(error: ChartError) -> Self {
        Self {
            outcome: SessionOutcome::Failed(error),
            rendered: Vec::new(),
            omitted: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.outcome, SessionOutcome::Loaded { .. })
    }

    #[must_use]
    pub fn error(&self) -> Option<&ChartError> {
        match &self.outcome {
            SessionOutcome::Failed(error) => Some(error),
            SessionOutcome::Loaded { .. } => None,
        }
    }
}

enum ChartOutcome {
    Mounted,
    Detached,
}

/// Loads bundles into host elements.
#[derive(Debug, Clone)]
pub struct SessionLoader<F> {
    loader: ArchiveLoader<F>,
    config: SessionConfig,
}

impl<F: BlobFetcher> SessionLoader<F> {
    #[must_use]
    pub fn new(fetcher: F, config: SessionConfig) -> Self {
        Self {
            loader: ArchiveLoader::new(fetcher),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Loads `url` and mounts one chart per loadable descriptor under `host`.
    ///
    /// Bundle and metadata failures are shown once in the host status area
    /// and end the session. Chart failures only affect their own chart.
    pub async fn load(&self, url: &str, host: &HostElement) -> SessionReport {
        let (bundle, metadata) = match self.load_metadata(url).await {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!(url, error = %error, "session failed to load");
                host.show_text(&format!("Unable to load charts: {error}"));
                return SessionReport::failed(error);
            }
        };
        host.show_metadata(&metadata);

        let missing = metadata.validate_entries(&bundle);
        if !missing.is_empty() {
            debug!(?missing, "descriptors reference entries absent from the bundle");
        }

        let renderer = ChartRenderer::new(self.config.layout);
        let bundle = &bundle;
        let mut tasks: FuturesUnordered<_> = metadata
            .chart_data
            .iter()
            .map(|descriptor| async move {
                let result = self.load_chart(bundle, descriptor, renderer, host).await;
                (descriptor, result)
            })
            .collect();

        let mut rendered = Vec::new();
        let mut omitted = Vec::new();
        while let Some((descriptor, result)) = tasks.next().await {
            match result {
                Ok(ChartOutcome::Mounted) => rendered.push(descriptor.filename.clone()),
                Ok(ChartOutcome::Detached) => {
                    debug!(chart = %descriptor.filename, "host detached, chart dropped");
                }
                Err(_) if !host.is_attached() => {
                    debug!(chart = %descriptor.filename, "host detached, chart failure dropped");
                }
                Err(error) => {
                    warn!(chart = %descriptor.filename, error = %error, "chart omitted");
                    self.report_chart_failure(host, descriptor, &error);
                    omitted.push((descriptor.filename.clone(), error));
                }
            }
        }
        drop(tasks);

        debug!(
            url,
            rendered = rendered.len(),
            omitted = omitted.len(),
            "session loaded"
        );
        SessionReport {
            outcome: SessionOutcome::Loaded {
                title: metadata.title,
                timestamp: metadata.timestamp,
            },
            rendered,
            omitted,
        }
    }

    async fn load_metadata(&self, url: &str) -> ChartResult<(ArchiveBundle, SessionMetadata)> {
        let config = self.config.clone().validate()?;
        let bundle = self.loader.fetch(url).await?;
        let text = bundle.entry(&config.metadata_entry).await?;
        let metadata = metadata::parse(&text)?;
        Ok((bundle, metadata))
    }

    async fn load_chart(
        &self,
        bundle: &ArchiveBundle,
        descriptor: &ChartDescriptor,
        renderer: ChartRenderer,
        host: &HostElement,
    ) -> ChartResult<ChartOutcome> {
        let text = bundle.entry(&descriptor.filename).await?;
        let table = payload::parse_rows(&descriptor.filename, &text)?;

        let Some(container_id) = host.create_container() else {
            return Ok(ChartOutcome::Detached);
        };
        let chart = renderer.render(&container_id, descriptor, table.rows())?;
        let controller = ViewportController::new(self.config.timing);
        if host.mount(MountedChart::new(chart, controller)) {
            Ok(ChartOutcome::Mounted)
        } else {
            Ok(ChartOutcome::Detached)
        }
    }

    fn report_chart_failure(
        &self,
        host: &HostElement,
        descriptor: &ChartDescriptor,
        error: &ChartError,
    ) {
        if self.config.failure_policy != ChartFailurePolicy::Notice {
            return;
        }
        if let Some(container_id) = host.create_container() {
            host.mount_notice(
                container_id,
                format!("Chart `{}` could not be loaded: {error}", descriptor.title),
            );
        }
    }
}
