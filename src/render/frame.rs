use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{LinePrimitive, PathPrimitive, RectPrimitive, TextPrimitive};

/// Backend-agnostic scene for one chart draw pass.
///
/// Primitive coordinates are local to the plot area, whose top-left corner
/// sits at `plot_origin` inside the outer `viewport`. Series paths are
/// clipped to the plot area; axes and labels are not.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub plot_origin: (f64, f64),
    pub plot_area: Viewport,
    pub clip_id: String,
    pub lines: Vec<LinePrimitive>,
    pub texts: Vec<TextPrimitive>,
    pub paths: Vec<PathPrimitive>,
    pub rects: Vec<RectPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport, plot_origin: (f64, f64), plot_area: Viewport) -> Self {
        Self {
            viewport,
            plot_origin,
            plot_area,
            clip_id: "clip".to_owned(),
            lines: Vec::new(),
            texts: Vec::new(),
            paths: Vec::new(),
            rects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_clip_id(mut self, clip_id: impl Into<String>) -> Self {
        self.clip_id = clip_id.into();
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: LinePrimitive) -> Self {
        self.lines.push(line);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: TextPrimitive) -> Self {
        self.texts.push(text);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: PathPrimitive) -> Self {
        self.paths.push(path);
        self
    }

    #[must_use]
    pub fn with_rect(mut self, rect: RectPrimitive) -> Self {
        self.rects.push(rect);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if !self.plot_area.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.plot_area.width,
                height: self.plot_area.height,
            });
        }

        for line in &self.lines {
            line.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }
        for path in &self.paths {
            path.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.texts.is_empty() && self.paths.is_empty() && self.rects.is_empty()
    }
}
