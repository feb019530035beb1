mod chart;
mod frame;
mod null_renderer;
mod primitives;
mod svg;
mod transition;

pub use chart::{ChartRenderer, RenderedChart};
pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{LinePrimitive, PathPrimitive, RectPrimitive, TextHAlign, TextPrimitive};
pub use svg::{SvgRenderer, frame_to_svg};
pub use transition::Transition;

pub(crate) use svg::escape as escape_markup;

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from descriptor parsing and interaction
/// logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}
