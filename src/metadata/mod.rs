//! Session metadata: parsing and validation of the bundle descriptor document.

mod raw;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::bundle::ArchiveBundle;
use crate::core::{Bound, ScaleKind};
use crate::error::{ChartError, ChartResult};

use raw::{RawDescriptor, RawMetadata};

pub const DEFAULT_FILL: &str = "none";
pub const DEFAULT_STROKE: &str = "steelblue";
pub const DEFAULT_STROKE_WIDTH: f64 = 1.5;
pub const LINE_CHART_TYPE: &str = "line";

/// Validated configuration of one line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescriptor {
    pub filename: String,
    /// Declared chart kind; only `line` renders.
    pub chart_type: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_column: String,
    pub y_column: String,
    pub x_min: Option<Bound>,
    pub x_max: Option<Bound>,
    pub y_min: Option<Bound>,
    pub y_max: Option<Bound>,
    pub x_scale: ScaleKind,
    pub y_scale: ScaleKind,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub columns: Vec<String>,
    pub mimetype: Option<String>,
}

impl ChartDescriptor {
    /// Minimal linear descriptor with default styling; labels follow the
    /// column names.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        x_column: impl Into<String>,
        y_column: impl Into<String>,
    ) -> Self {
        let filename = filename.into();
        let x_column = x_column.into();
        let y_column = y_column.into();
        Self {
            chart_type: LINE_CHART_TYPE.to_owned(),
            title: filename.clone(),
            x_label: x_column.clone(),
            y_label: y_column.clone(),
            filename,
            x_column,
            y_column,
            x_min: None,
            x_max: None,
            y_min: None,
            y_max: None,
            x_scale: ScaleKind::Linear,
            y_scale: ScaleKind::Linear,
            fill: DEFAULT_FILL.to_owned(),
            stroke: DEFAULT_STROKE.to_owned(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            columns: Vec::new(),
            mimetype: None,
        }
    }

    #[must_use]
    pub fn with_x_bounds(mut self, min: impl Into<Bound>, max: impl Into<Bound>) -> Self {
        self.x_min = Some(min.into());
        self.x_max = Some(max.into());
        self
    }

    #[must_use]
    pub fn with_y_bounds(mut self, min: impl Into<Bound>, max: impl Into<Bound>) -> Self {
        self.y_min = Some(min.into());
        self.y_max = Some(max.into());
        self
    }

    #[must_use]
    pub fn with_scales(mut self, x_scale: ScaleKind, y_scale: ScaleKind) -> Self {
        self.x_scale = x_scale;
        self.y_scale = y_scale;
        self
    }

    fn from_raw(raw: RawDescriptor, context: &str, key: Option<&str>) -> ChartResult<Self> {
        let filename = raw
            .filename
            .or_else(|| key.map(str::to_owned))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| missing(context, "filename"))?;
        let x_column = raw.x_column.ok_or_else(|| missing(context, "x_column"))?;
        let y_column = raw.y_column.ok_or_else(|| missing(context, "y_column"))?;

        let chart_type = match raw.chart_type {
            None | Some(Value::Null) => LINE_CHART_TYPE.to_owned(),
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
        };

        let x_scale = parse_scale(raw.x_scale.as_deref(), context, "x_scale")?;
        let y_scale = parse_scale(raw.y_scale.as_deref(), context, "y_scale")?;

        let stroke_width = stroke_width(raw.stroke_width, context);

        Ok(Self {
            chart_type,
            title: raw.title.unwrap_or_else(|| filename.clone()),
            x_label: raw.x_label.unwrap_or_else(|| x_column.clone()),
            y_label: raw.y_label.unwrap_or_else(|| y_column.clone()),
            filename,
            x_column,
            y_column,
            x_min: raw.x_min,
            x_max: raw.x_max,
            y_min: raw.y_min,
            y_max: raw.y_max,
            x_scale,
            y_scale,
            fill: raw.fill.unwrap_or_else(|| DEFAULT_FILL.to_owned()),
            stroke: raw.stroke.unwrap_or_else(|| DEFAULT_STROKE.to_owned()),
            stroke_width,
            columns: raw::text_list(raw.columns),
            mimetype: raw::text(raw.mimetype),
        })
    }
}

/// Root descriptor of one bundle, normalized to the ordered chart list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMetadata {
    pub title: String,
    pub timestamp: String,
    pub chart_data: Vec<ChartDescriptor>,
    pub vendor: Option<String>,
    pub version: Option<String>,
    pub uuid: Option<String>,
    pub create_time: Option<String>,
}

impl SessionMetadata {
    pub fn from_json_str(text: &str) -> ChartResult<Self> {
        parse(text)
    }

    /// Filenames referenced by descriptors but absent from `bundle`.
    #[must_use]
    pub fn validate_entries(&self, bundle: &ArchiveBundle) -> Vec<String> {
        self.chart_data
            .iter()
            .filter(|descriptor| !bundle.contains(&descriptor.filename))
            .map(|descriptor| descriptor.filename.clone())
            .collect()
    }
}

/// Parses and validates a metadata document.
///
/// `chart_data` may be either an ordered list of descriptors or an object
/// keyed by filename; both normalize to the list form. Unknown fields are
/// ignored.
pub fn parse(text: &str) -> ChartResult<SessionMetadata> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| ChartError::Validation(format!("metadata is not valid JSON: {e}")))?;
    if !document.is_object() {
        return Err(ChartError::validation("metadata root must be an object"));
    }
    let raw: RawMetadata = serde_json::from_value(document)
        .map_err(|e| ChartError::Validation(format!("malformed metadata: {e}")))?;

    let title = raw.title.ok_or_else(|| missing("metadata", "title"))?;
    let timestamp = match raw.timestamp {
        None | Some(Value::Null) => return Err(missing("metadata", "timestamp")),
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => {
            return Err(ChartError::Validation(format!(
                "metadata: timestamp must be a string or number, got {other}"
            )));
        }
    };

    let chart_data = match raw.chart_data {
        None | Some(Value::Null) => return Err(missing("metadata", "chart_data")),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let context = format!("chart_data[{index}]");
                descriptor_from_value(item, &context, None)
            })
            .collect::<ChartResult<Vec<_>>>()?,
        Some(Value::Object(entries)) => entries
            .into_iter()
            .map(|(key, item)| {
                let context = format!("chart_data[\"{key}\"]");
                descriptor_from_value(item, &context, Some(&key))
            })
            .collect::<ChartResult<Vec<_>>>()?,
        Some(_) => {
            return Err(ChartError::validation(
                "metadata: chart_data must be a list of descriptors or an object keyed by filename",
            ));
        }
    };
    if chart_data.is_empty() {
        return Err(ChartError::validation("metadata: chart_data is empty"));
    }

    debug!(title = %title, charts = chart_data.len(), "parsed session metadata");
    Ok(SessionMetadata {
        title,
        timestamp,
        chart_data,
        vendor: raw::text(raw.vendor),
        version: raw::text(raw.version),
        uuid: raw::text(raw.uuid),
        create_time: raw::text(raw.create_time),
    })
}

fn descriptor_from_value(
    value: Value,
    context: &str,
    key: Option<&str>,
) -> ChartResult<ChartDescriptor> {
    if !value.is_object() {
        return Err(ChartError::Validation(format!(
            "{context}: descriptor must be an object"
        )));
    }
    let raw: RawDescriptor = serde_json::from_value(value)
        .map_err(|e| ChartError::Validation(format!("{context}: {e}")))?;
    ChartDescriptor::from_raw(raw, context, key)
}

fn parse_scale(value: Option<&str>, context: &str, field: &str) -> ChartResult<ScaleKind> {
    match value {
        None => Ok(ScaleKind::Linear),
        Some(value) => ScaleKind::parse(value).map_err(|_| {
            ChartError::Validation(format!(
                "{context}: {field} must be `linear` or `time`, got `{value}`"
            ))
        }),
    }
}

/// Reads `stroke_width` as a number or numeric text (an optional `px` suffix
/// is accepted). Unusable values fall back to the default width.
fn stroke_width(value: Option<Value>, context: &str) -> f64 {
    let width = match &value {
        None | Some(Value::Null) => return DEFAULT_STROKE_WIDTH,
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text
            .trim()
            .trim_end_matches("px")
            .trim_end()
            .parse::<f64>()
            .ok(),
        Some(_) => None,
    };
    match width {
        Some(width) if width.is_finite() && width >= 0.0 => width,
        _ => {
            warn!(descriptor = context, value = ?value, "unusable stroke_width, using default");
            DEFAULT_STROKE_WIDTH
        }
    }
}

fn missing(context: &str, field: &str) -> ChartError {
    ChartError::Validation(format!("{context}: missing `{field}`"))
}
