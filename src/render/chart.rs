use std::time::Duration;

use tracing::{debug, trace};

use crate::config::ChartLayout;
use crate::core::line_series::{x_extent, y_extent};
use crate::core::ticks::DEFAULT_TICK_COUNT;
use crate::core::{
    Bound, CoordinateMap, DataPoint, PathPoint, Row, SeriesColumns, axis_ticks, extract_points,
    project_polyline, scale,
};
use crate::error::{ChartError, ChartResult};
use crate::metadata::{ChartDescriptor, LINE_CHART_TYPE};
use crate::render::{
    LinePrimitive, PathPrimitive, RectPrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive,
    Transition,
};

const AXIS_STROKE: &str = "#000000";
const AXIS_STROKE_WIDTH: f64 = 1.0;
const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const TICK_FONT_SIZE: f64 = 10.0;
const TITLE_FONT_SIZE: f64 = 20.0;
const LABEL_FONT_SIZE: f64 = 12.0;
const LABEL_FONT_FAMILY: &str = "Helvetica";
const TITLE_OFFSET: f64 = 20.0;
const X_LABEL_OFFSET: f64 = 40.0;
const Y_LABEL_OFFSET: f64 = 40.0;
const BRUSH_FILL: &str = "#777777";
const BRUSH_OPACITY: f64 = 0.3;

/// Draws one line chart into a container.
#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    layout: ChartLayout,
    tick_count: usize,
}

impl ChartRenderer {
    #[must_use]
    pub fn new(layout: ChartLayout) -> Self {
        Self {
            layout,
            tick_count: DEFAULT_TICK_COUNT,
        }
    }

    #[must_use]
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count.max(1);
        self
    }

    #[must_use]
    pub fn layout(&self) -> ChartLayout {
        self.layout
    }

    /// Resolves both axes and builds the initial scene.
    ///
    /// Declared bounds win; a missing bound is taken from the data extent of
    /// its column. An unparsable declared bound or a chart type other than
    /// `line` fails the chart.
    pub fn render(
        &self,
        container_id: &str,
        descriptor: &ChartDescriptor,
        rows: &[Row],
    ) -> ChartResult<RenderedChart> {
        let layout = self.layout.validate()?;
        if descriptor.chart_type != LINE_CHART_TYPE {
            return Err(ChartError::Validation(format!(
                "`{}`: unsupported chart_type `{}` (only `{LINE_CHART_TYPE}`)",
                descriptor.filename, descriptor.chart_type
            )));
        }

        let series = extract_points(
            rows,
            SeriesColumns {
                x_column: &descriptor.x_column,
                x_kind: descriptor.x_scale,
                y_column: &descriptor.y_column,
                y_kind: descriptor.y_scale,
            },
        );
        let data_x_extent = x_extent(&series.points);

        let (x_min, x_max) = fill_bounds(
            descriptor.x_min.as_ref(),
            descriptor.x_max.as_ref(),
            data_x_extent,
        );
        let (y_min, y_max) = fill_bounds(
            descriptor.y_min.as_ref(),
            descriptor.y_max.as_ref(),
            y_extent(&series.points),
        );

        let (x_map, x0, x1) = scale::resolve(
            descriptor.x_scale,
            &x_min,
            &x_max,
            (0.0, layout.plot_width()),
        )?;
        let (y_map, y0, y1) = scale::resolve(
            descriptor.y_scale,
            &y_min,
            &y_max,
            (layout.plot_height(), 0.0),
        )?;

        debug!(
            chart = %descriptor.filename,
            container = container_id,
            points = series.points.len(),
            skipped = series.skipped,
            x_domain = ?(x0, x1),
            y_domain = ?(y0, y1),
            "rendered chart"
        );

        let mut chart = RenderedChart {
            container_id: container_id.to_owned(),
            descriptor: descriptor.clone(),
            layout,
            tick_count: self.tick_count,
            x_map,
            y_map,
            points: series.points,
            skipped_rows: series.skipped,
            data_x_extent,
            path: Vec::new(),
            brush: None,
            transition: None,
            frame: RenderFrame::new(layout.viewport(), (0.0, 0.0), layout.plot_area()),
        };
        chart.redraw();
        Ok(chart)
    }
}

fn fill_bounds(
    min: Option<&Bound>,
    max: Option<&Bound>,
    extent: Option<(f64, f64)>,
) -> (Bound, Bound) {
    let (fallback_min, fallback_max) = extent.unwrap_or((0.0, 1.0));
    (
        min.cloned().unwrap_or(Bound::Number(fallback_min)),
        max.cloned().unwrap_or(Bound::Number(fallback_max)),
    )
}

/// A drawn chart: resolved maps, projected path and the current scene.
///
/// The x domain is mutable through `set_x_domain`; the y map is fixed at
/// render time.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    container_id: String,
    descriptor: ChartDescriptor,
    layout: ChartLayout,
    tick_count: usize,
    x_map: CoordinateMap,
    y_map: CoordinateMap,
    points: Vec<DataPoint>,
    skipped_rows: usize,
    data_x_extent: Option<(f64, f64)>,
    path: Vec<PathPoint>,
    brush: Option<(f64, f64)>,
    transition: Option<Transition>,
    frame: RenderFrame,
}

impl RenderedChart {
    #[must_use]
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    #[must_use]
    pub fn descriptor(&self) -> &ChartDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn layout(&self) -> ChartLayout {
        self.layout
    }

    #[must_use]
    pub fn x_map(&self) -> CoordinateMap {
        self.x_map
    }

    #[must_use]
    pub fn y_map(&self) -> CoordinateMap {
        self.y_map
    }

    #[must_use]
    pub fn x_domain(&self) -> (f64, f64) {
        self.x_map.domain()
    }

    #[must_use]
    pub fn y_domain(&self) -> (f64, f64) {
        self.y_map.domain()
    }

    /// Projected polyline in plot-area pixels.
    #[must_use]
    pub fn path(&self) -> &[PathPoint] {
        &self.path
    }

    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[must_use]
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Minimum and maximum x over the rows that coerced at render time.
    #[must_use]
    pub fn data_x_extent(&self) -> Option<(f64, f64)> {
        self.data_x_extent
    }

    #[must_use]
    pub fn frame(&self) -> &RenderFrame {
        &self.frame
    }

    #[must_use]
    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    #[must_use]
    pub fn brush_overlay(&self) -> Option<(f64, f64)> {
        self.brush
    }

    /// Replaces the x domain and redraws the axis and path in place.
    ///
    /// With `transition`, the change is recorded so hosts can animate it via
    /// `frame_at`.
    pub fn set_x_domain(
        &mut self,
        start: f64,
        end: f64,
        transition: Option<Duration>,
    ) -> ChartResult<()> {
        let previous = self.x_map.domain();
        self.x_map = self.x_map.with_domain(start, end)?;
        self.transition =
            transition.map(|duration| Transition::new(previous, (start, end), duration));
        trace!(
            container = %self.container_id,
            from = ?previous,
            to = ?(start, end),
            "x domain updated"
        );
        self.redraw();
        Ok(())
    }

    /// Shows or clears the pixel-space brush rectangle.
    pub fn set_brush_overlay(&mut self, selection: Option<(f64, f64)>) {
        self.brush = selection.map(|(a, b)| (a.min(b), a.max(b)));
        self.redraw();
    }

    /// Scene sampled `elapsed` into the last transition; the settled scene
    /// when there is none.
    pub fn frame_at(&self, elapsed: Duration) -> ChartResult<RenderFrame> {
        match self.transition {
            Some(transition) if !transition.is_complete(elapsed) => {
                let (start, end) = transition.domain_at(elapsed);
                let x_map = self.x_map.with_domain(start, end)?;
                let path = project_polyline(&self.points, x_map, self.y_map);
                Ok(self.compose_frame(x_map, path))
            }
            _ => Ok(self.frame.clone()),
        }
    }

    /// Hands the current scene to a backend.
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) -> ChartResult<()> {
        renderer.render(&self.frame)
    }

    fn redraw(&mut self) {
        self.path = project_polyline(&self.points, self.x_map, self.y_map);
        self.frame = self.compose_frame(self.x_map, self.path.clone());
    }

    fn compose_frame(&self, x_map: CoordinateMap, path: Vec<PathPoint>) -> RenderFrame {
        let width = self.layout.plot_width();
        let height = self.layout.plot_height();
        let mut frame = RenderFrame::new(
            self.layout.viewport(),
            (
                f64::from(self.layout.margin_left),
                f64::from(self.layout.margin_top),
            ),
            self.layout.plot_area(),
        )
        .with_clip_id(format!("clip-{}", self.container_id))
        .with_path(PathPrimitive {
            points: path,
            fill: self.descriptor.fill.clone(),
            stroke: self.descriptor.stroke.clone(),
            stroke_width: self.descriptor.stroke_width,
        });

        // x axis along the bottom edge
        frame = frame.with_line(axis_line(0.0, height, width, height));
        for tick in axis_ticks(x_map, self.tick_count) {
            let px = x_map.apply(tick.value);
            if !within(px, width) {
                continue;
            }
            frame = frame
                .with_line(axis_line(px, height, px, height + TICK_SIZE))
                .with_text(TextPrimitive::new(
                    tick.label,
                    px,
                    height + TICK_SIZE + TICK_PADDING + TICK_FONT_SIZE,
                    TICK_FONT_SIZE,
                    TextHAlign::Center,
                ));
        }

        // y axis along the left edge
        frame = frame.with_line(axis_line(0.0, 0.0, 0.0, height));
        for tick in axis_ticks(self.y_map, self.tick_count) {
            let py = self.y_map.apply(tick.value);
            if !within(py, height) {
                continue;
            }
            frame = frame
                .with_line(axis_line(-TICK_SIZE, py, 0.0, py))
                .with_text(TextPrimitive::new(
                    tick.label,
                    -(TICK_SIZE + TICK_PADDING),
                    py + TICK_FONT_SIZE * 0.32,
                    TICK_FONT_SIZE,
                    TextHAlign::Right,
                ));
        }

        for label in self.labels(width, height) {
            frame = frame.with_text(label);
        }

        if let Some((x0, x1)) = self.brush {
            let x0 = x0.clamp(0.0, width);
            let x1 = x1.clamp(0.0, width);
            frame = frame.with_rect(RectPrimitive {
                x: x0,
                y: 0.0,
                width: x1 - x0,
                height,
                fill: BRUSH_FILL.to_owned(),
                fill_opacity: BRUSH_OPACITY,
            });
        }

        frame
    }

    fn labels(&self, width: f64, height: f64) -> Vec<TextPrimitive> {
        let descriptor = &self.descriptor;
        [
            (
                &descriptor.title,
                width / 2.0,
                -TITLE_OFFSET,
                TITLE_FONT_SIZE,
                0.0,
            ),
            (
                &descriptor.x_label,
                width / 2.0,
                height + X_LABEL_OFFSET,
                LABEL_FONT_SIZE,
                0.0,
            ),
            (
                &descriptor.y_label,
                -Y_LABEL_OFFSET,
                height / 2.0,
                LABEL_FONT_SIZE,
                -90.0,
            ),
        ]
        .into_iter()
        .filter(|(text, ..)| !text.is_empty())
        .map(|(text, x, y, size, rotation)| {
            TextPrimitive::new(text.as_str(), x, y, size, TextHAlign::Center)
                .with_font_family(LABEL_FONT_FAMILY)
                .rotated(rotation)
        })
        .collect()
    }
}

fn axis_line(x1: f64, y1: f64, x2: f64, y2: f64) -> LinePrimitive {
    LinePrimitive::new(x1, y1, x2, y2, AXIS_STROKE_WIDTH, AXIS_STROKE)
}

fn within(pixel: f64, extent: f64) -> bool {
    pixel >= -0.5 && pixel <= extent + 0.5
}
