use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{ChartError, ChartResult};
use crate::interaction::{BrushOutcome, ViewportController, ViewportPhase};
use crate::metadata::SessionMetadata;
use crate::render::{RenderFrame, RenderedChart, escape_markup, frame_to_svg};

/// A rendered chart bound to its own viewport controller.
#[derive(Debug, Clone)]
pub struct MountedChart {
    chart: RenderedChart,
    controller: ViewportController,
}

impl MountedChart {
    #[must_use]
    pub fn new(chart: RenderedChart, controller: ViewportController) -> Self {
        Self { chart, controller }
    }

    #[must_use]
    pub fn container_id(&self) -> &str {
        self.chart.container_id()
    }

    #[must_use]
    pub fn chart(&self) -> &RenderedChart {
        &self.chart
    }

    #[must_use]
    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    #[must_use]
    pub fn phase(&self) -> ViewportPhase {
        self.controller.phase()
    }

    pub fn brush_start(&mut self) {
        self.controller.brush_start();
    }

    pub fn brush_move(&mut self, x0: f64, x1: f64) {
        self.controller.brush_move(&mut self.chart, x0, x1);
    }

    pub fn brush_end(&mut self, selection: Option<(f64, f64)>) -> ChartResult<BrushOutcome> {
        self.controller.brush_end(&mut self.chart, selection)
    }

    pub fn double_click(&mut self) -> ChartResult<()> {
        self.controller.double_click(&mut self.chart)
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.controller.advance(elapsed);
    }

    /// Current scene, or the scene `elapsed` into the last transition.
    pub fn frame_at(&self, elapsed: Duration) -> ChartResult<RenderFrame> {
        self.chart.frame_at(elapsed)
    }

    pub fn to_svg(&self) -> ChartResult<String> {
        self.chart.frame().validate()?;
        frame_to_svg(self.chart.frame())
    }
}

#[derive(Debug)]
enum HostChild {
    Chart(Box<MountedChart>),
    Notice { container_id: String, text: String },
}

impl HostChild {
    fn container_id(&self) -> &str {
        match self {
            Self::Chart(mounted) => mounted.container_id(),
            Self::Notice { container_id, .. } => container_id,
        }
    }
}

#[derive(Debug)]
struct HostState {
    id: String,
    attached: bool,
    status: Vec<String>,
    children: Vec<HostChild>,
    next_container: u64,
}

/// Mounting surface for one session.
///
/// Clones are handles to the same element. Once detached, every mount is a
/// silent no-op so in-flight chart loads can finish harmlessly.
#[derive(Debug, Clone)]
pub struct HostElement {
    inner: Arc<Mutex<HostState>>,
}

impl HostElement {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HostState {
                id: id.into(),
                attached: true,
                status: Vec::new(),
                children: Vec::new(),
                next_container: 0,
            })),
        }
    }

    #[must_use]
    pub fn id(&self) -> String {
        self.inner.lock().id.clone()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.lock().attached
    }

    /// Detaches the element and drops everything mounted so far.
    pub fn detach(&self) {
        let mut state = self.inner.lock();
        state.attached = false;
        state.children.clear();
    }

    /// Status area contents, one paragraph per line.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.inner.lock().status.join("\n")
    }

    /// Replaces the status area with a single readable message.
    pub fn show_text(&self, text: &str) {
        let mut state = self.inner.lock();
        if !state.attached {
            return;
        }
        state.status = vec![text.to_owned()];
    }

    /// Shows the session title and timestamp in the status area.
    pub fn show_metadata(&self, metadata: &SessionMetadata) {
        let mut state = self.inner.lock();
        if !state.attached {
            return;
        }
        state.status = vec![metadata.title.clone(), metadata.timestamp.clone()];
    }

    /// Number of mounted charts; notices are not counted.
    #[must_use]
    pub fn chart_count(&self) -> usize {
        self.inner
            .lock()
            .children
            .iter()
            .filter(|child| matches!(child, HostChild::Chart(_)))
            .count()
    }

    /// Container ids of mounted charts, in mount order.
    #[must_use]
    pub fn chart_ids(&self) -> Vec<String> {
        self.inner
            .lock()
            .children
            .iter()
            .filter_map(|child| match child {
                HostChild::Chart(mounted) => Some(mounted.container_id().to_owned()),
                HostChild::Notice { .. } => None,
            })
            .collect()
    }

    /// Texts of mounted failure notices, in mount order.
    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.inner
            .lock()
            .children
            .iter()
            .filter_map(|child| match child {
                HostChild::Notice { text, .. } => Some(text.clone()),
                HostChild::Chart(_) => None,
            })
            .collect()
    }

    /// Runs `f` against the chart mounted in `container_id`.
    ///
    /// The element is locked while `f` runs; `f` must not call back into
    /// this host.
    pub fn with_chart<R>(
        &self,
        container_id: &str,
        f: impl FnOnce(&mut MountedChart) -> R,
    ) -> Option<R> {
        let mut state = self.inner.lock();
        let mounted = state.children.iter_mut().find_map(|child| match child {
            HostChild::Chart(mounted) if mounted.container_id() == container_id => {
                Some(mounted.as_mut())
            }
            _ => None,
        })?;
        Some(f(mounted))
    }

    /// Finds the container of the first mounted chart drawn from `filename`.
    #[must_use]
    pub fn container_for(&self, filename: &str) -> Option<String> {
        self.inner
            .lock()
            .children
            .iter()
            .find_map(|child| match child {
                HostChild::Chart(mounted) if mounted.chart().descriptor().filename == filename => {
                    Some(mounted.container_id().to_owned())
                }
                _ => None,
            })
    }

    /// Allocates a fresh child container id, or `None` once detached.
    pub(crate) fn create_container(&self) -> Option<String> {
        let mut state = self.inner.lock();
        if !state.attached {
            return None;
        }
        state.next_container += 1;
        Some(format!("{}-chart-{}", state.id, state.next_container))
    }

    /// Returns `false` when the element was detached and nothing was mounted.
    pub(crate) fn mount(&self, mounted: MountedChart) -> bool {
        let mut state = self.inner.lock();
        if !state.attached {
            return false;
        }
        state.children.push(HostChild::Chart(Box::new(mounted)));
        true
    }

    pub(crate) fn mount_notice(&self, container_id: String, text: String) -> bool {
        let mut state = self.inner.lock();
        if !state.attached {
            return false;
        }
        state.children.push(HostChild::Notice { container_id, text });
        true
    }

    /// Serializes the status area and every mounted child as HTML.
    pub fn to_html(&self) -> ChartResult<String> {
        let state = self.inner.lock();
        let mut documents = Vec::with_capacity(state.children.len());
        for child in &state.children {
            documents.push(match child {
                HostChild::Chart(mounted) => Some(mounted.to_svg()?),
                HostChild::Notice { .. } => None,
            });
        }

        let mut out = String::new();
        write_html(&mut out, &state, &documents).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize host element: {e}"))
        })?;
        Ok(out)
    }
}

fn write_html(
    out: &mut String,
    state: &HostState,
    documents: &[Option<String>],
) -> std::fmt::Result {
    writeln!(out, r#"<div id="{}">"#, escape_markup(&state.id))?;
    for line in &state.status {
        writeln!(out, r#"<p class="status">{}</p>"#, escape_markup(line))?;
    }
    for (child, document) in state.children.iter().zip(documents) {
        let id = escape_markup(child.container_id());
        match (child, document) {
            (HostChild::Notice { text, .. }, _) => {
                writeln!(
                    out,
                    r#"<div class="chart-notice" id="{id}"><p>{}</p></div>"#,
                    escape_markup(text)
                )?;
            }
            (HostChild::Chart(_), Some(svg)) => {
                writeln!(out, r#"<div class="chart" id="{id}">"#)?;
                writeln!(out, "{svg}")?;
                writeln!(out, "</div>")?;
            }
            (HostChild::Chart(_), None) => {}
        }
    }
    write!(out, "</div>")
}
