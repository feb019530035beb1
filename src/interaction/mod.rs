use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::InteractionTiming;
use crate::error::ChartResult;
use crate::render::RenderedChart;

/// Lifecycle phase of one chart's viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewportPhase {
    #[default]
    Settled,
    Brushing,
    /// An empty brush started the idle debounce timer.
    PendingIdle,
    Zoomed,
}

/// What a finished brush gesture did to the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrushOutcome {
    /// Empty selection; the debounce timer was started.
    IdleStarted,
    /// Empty selection while the timer was already running, or no gesture
    /// was active.
    Ignored,
    /// The x domain now covers the selection.
    Zoomed { start: f64, end: f64 },
}

/// Owns the zoom/reset state machine of a single rendered chart.
///
/// The chart handle is passed in by reference on every gesture; the
/// controller never stores it, so one controller cannot touch another
/// chart's handle. Time is driven by the host through `advance`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    phase: ViewportPhase,
    timing: InteractionTiming,
    idle_remaining: Option<Duration>,
    brush: Option<(f64, f64)>,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(InteractionTiming::default())
    }
}

impl ViewportController {
    #[must_use]
    pub fn new(timing: InteractionTiming) -> Self {
        Self {
            phase: ViewportPhase::Settled,
            timing,
            idle_remaining: None,
            brush: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ViewportPhase {
        self.phase
    }

    #[must_use]
    pub fn timing(&self) -> InteractionTiming {
        self.timing
    }

    /// Remaining debounce delay, when the idle timer is running.
    #[must_use]
    pub fn idle_timer(&self) -> Option<Duration> {
        self.idle_remaining
    }

    /// Pixel-space selection of the gesture in progress.
    #[must_use]
    pub fn brush_selection(&self) -> Option<(f64, f64)> {
        self.brush
    }

    /// Begins a brush gesture. Ignored while a gesture is already active.
    pub fn brush_start(&mut self) {
        if self.phase == ViewportPhase::Brushing {
            return;
        }
        trace!(from = ?self.phase, "brush started");
        self.phase = ViewportPhase::Brushing;
        self.brush = None;
    }

    /// Tracks the selection while brushing and mirrors it on the chart's
    /// overlay.
    pub fn brush_move(&mut self, chart: &mut RenderedChart, x0: f64, x1: f64) {
        if self.phase != ViewportPhase::Brushing {
            return;
        }
        let selection = (x0.min(x1), x0.max(x1));
        self.brush = Some(selection);
        chart.set_brush_overlay(Some(selection));
    }

    /// Finishes a brush gesture.
    ///
    /// Outside a gesture (no preceding `brush_start`) the call is ignored.
    /// An empty selection never changes the domain. A non-empty selection is
    /// clamped to the plot area, inverted through the current x map and
    /// becomes the new x domain.
    pub fn brush_end(
        &mut self,
        chart: &mut RenderedChart,
        selection: Option<(f64, f64)>,
    ) -> ChartResult<BrushOutcome> {
        if self.phase != ViewportPhase::Brushing {
            trace!(phase = ?self.phase, "brush end outside a gesture ignored");
            return Ok(BrushOutcome::Ignored);
        }
        self.brush = None;

        let plot_width = chart.layout().plot_width();
        let selection = selection
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .map(|(a, b)| {
                (
                    a.min(b).clamp(0.0, plot_width),
                    a.max(b).clamp(0.0, plot_width),
                )
            })
            .filter(|(a, b)| b > a);

        let Some((px0, px1)) = selection else {
            chart.set_brush_overlay(None);
            if self.idle_remaining.is_some() {
                self.phase = ViewportPhase::PendingIdle;
                trace!("empty brush while idle timer pending");
                return Ok(BrushOutcome::Ignored);
            }
            self.idle_remaining = Some(self.timing.idle_debounce);
            self.phase = ViewportPhase::PendingIdle;
            trace!(delay = ?self.timing.idle_debounce, "idle timer started");
            return Ok(BrushOutcome::IdleStarted);
        };

        let x_map = chart.x_map();
        let start = x_map.invert(px0);
        let end = x_map.invert(px1);
        chart.set_x_domain(start, end, Some(self.timing.zoom_transition))?;
        chart.set_brush_overlay(None);
        self.phase = ViewportPhase::Zoomed;
        debug!(
            container = %chart.container_id(),
            start,
            end,
            "brush zoom applied"
        );
        Ok(BrushOutcome::Zoomed { start, end })
    }

    /// Advances the idle timer by `elapsed`. The domain is never touched.
    pub fn advance(&mut self, elapsed: Duration) {
        let Some(remaining) = self.idle_remaining else {
            return;
        };
        let remaining = remaining.saturating_sub(elapsed);
        if !remaining.is_zero() {
            self.idle_remaining = Some(remaining);
            return;
        }
        self.idle_remaining = None;
        if self.phase == ViewportPhase::PendingIdle {
            self.phase = ViewportPhase::Settled;
        }
        trace!(phase = ?self.phase, "idle timer fired");
    }

    /// Resets the x domain to the data extent of the chart's own rows.
    ///
    /// Declared descriptor bounds are not restored. Without any usable rows
    /// the domain stays as it is.
    pub fn double_click(&mut self, chart: &mut RenderedChart) -> ChartResult<()> {
        self.idle_remaining = None;
        self.brush = None;
        self.phase = ViewportPhase::Settled;
        chart.set_brush_overlay(None);

        match chart.data_x_extent() {
            Some((start, end)) => {
                chart.set_x_domain(start, end, Some(self.timing.reset_transition))?;
                debug!(
                    container = %chart.container_id(),
                    start,
                    end,
                    "viewport reset to data extent"
                );
            }
            None => {
                debug!(
                    container = %chart.container_id(),
                    "viewport reset skipped, chart has no usable rows"
                );
            }
        }
        Ok(())
    }
}
