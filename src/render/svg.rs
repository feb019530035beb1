use std::fmt::Write as _;

use crate::error::{ChartError, ChartResult};
use crate::render::{PathPrimitive, RenderFrame, Renderer, TextPrimitive};

/// Serializes frames to standalone SVG documents.
///
/// The last document is kept so hosts can embed it after a draw pass.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    document: String,
    frames_rendered: usize,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> String {
        self.document
    }

    #[must_use]
    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.document = frame_to_svg(frame)?;
        self.frames_rendered += 1;
        Ok(())
    }
}

/// Writes one frame as an `<svg>` element.
///
/// Layout mirrors a translated plot group: everything is emitted inside
/// `translate(plot_origin)` and series paths reference a clip rectangle that
/// covers the plot area.
pub fn frame_to_svg(frame: &RenderFrame) -> ChartResult<String> {
    let mut out = String::with_capacity(1024);
    write_svg(&mut out, frame).map_err(|e| {
        ChartError::InvalidData(format!("failed to serialize frame as svg: {e}"))
    })?;
    Ok(out)
}

fn write_svg(out: &mut String, frame: &RenderFrame) -> std::fmt::Result {
    let clip_id = escape(&frame.clip_id);
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
        frame.viewport.width, frame.viewport.height
    )?;
    writeln!(
        out,
        r#"<defs><clipPath id="{clip_id}"><rect width="{}" height="{}"/></clipPath></defs>"#,
        frame.plot_area.width, frame.plot_area.height
    )?;
    writeln!(
        out,
        r#"<g transform="translate({},{})">"#,
        num(frame.plot_origin.0),
        num(frame.plot_origin.1)
    )?;

    for path in &frame.paths {
        write_path(out, path, &clip_id)?;
    }
    for line in &frame.lines {
        writeln!(
            out,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
            num(line.x1),
            num(line.y1),
            num(line.x2),
            num(line.y2),
            escape(&line.stroke),
            num(line.stroke_width)
        )?;
    }
    for text in &frame.texts {
        write_text(out, text)?;
    }
    for rect in &frame.rects {
        writeln!(
            out,
            r#"<rect class="selection" x="{}" y="{}" width="{}" height="{}" fill="{}" fill-opacity="{}"/>"#,
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height),
            escape(&rect.fill),
            num(rect.fill_opacity)
        )?;
    }

    writeln!(out, "</g>")?;
    write!(out, "</svg>")
}

fn write_path(out: &mut String, path: &PathPrimitive, clip_id: &str) -> std::fmt::Result {
    let mut data = String::with_capacity(path.points.len() * 16);
    for (index, point) in path.points.iter().enumerate() {
        let command = if index == 0 { 'M' } else { 'L' };
        write!(data, "{command}{},{}", num(point.x), num(point.y))?;
    }
    writeln!(
        out,
        r#"<path class="line" clip-path="url(#{clip_id})" d="{data}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
        escape(&path.fill),
        escape(&path.stroke),
        num(path.stroke_width)
    )
}

fn write_text(out: &mut String, text: &TextPrimitive) -> std::fmt::Result {
    let transform = if text.rotation_deg == 0.0 {
        format!("translate({},{})", num(text.x), num(text.y))
    } else {
        format!(
            "translate({},{}) rotate({})",
            num(text.x),
            num(text.y),
            num(text.rotation_deg)
        )
    };
    writeln!(
        out,
        r#"<text transform="{transform}" text-anchor="{}" font-family="{}" font-size="{}px">{}</text>"#,
        text.h_align.svg_anchor(),
        escape(&text.font_family),
        num(text.font_size_px),
        escape(&text.text)
    )
}

/// Compact decimal rendering with at most three fractional digits.
fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let text = format!("{rounded:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_owned()
    } else {
        text.to_owned()
    }
}

pub(crate) fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(10.0), "10");
        assert_eq!(num(2.5), "2.5");
        assert_eq!(num(1.23456), "1.235");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn markup_is_escaped() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
