use serde::Deserialize;
use serde_json::Value;

use crate::core::Bound;

/// Root document as written; every field optional so validation can report
/// precise messages instead of serde's generic ones.
///
/// Informational fields are kept as raw values: authoring tools may store
/// anything there, and a surprising type must not fail the session.
#[derive(Debug, Deserialize)]
pub(super) struct RawMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default, alias = "chartData")]
    pub chart_data: Option<Value>,
    #[serde(default)]
    pub vendor: Option<Value>,
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default)]
    pub uuid: Option<Value>,
    #[serde(default, alias = "createTime")]
    pub create_time: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawDescriptor {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "chartType")]
    pub chart_type: Option<Value>,
    #[serde(default, alias = "xLabel")]
    pub x_label: Option<String>,
    #[serde(default, alias = "yLabel")]
    pub y_label: Option<String>,
    #[serde(default, alias = "xColumn")]
    pub x_column: Option<String>,
    #[serde(default, alias = "yColumn")]
    pub y_column: Option<String>,
    #[serde(default, alias = "xMin")]
    pub x_min: Option<Bound>,
    #[serde(default, alias = "xMax")]
    pub x_max: Option<Bound>,
    #[serde(default, alias = "yMin")]
    pub y_min: Option<Bound>,
    #[serde(default, alias = "yMax")]
    pub y_max: Option<Bound>,
    #[serde(default, alias = "xScale")]
    pub x_scale: Option<String>,
    #[serde(default, alias = "yScale")]
    pub y_scale: Option<String>,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub stroke: Option<String>,
    #[serde(default, alias = "strokeWidth")]
    pub stroke_width: Option<Value>,
    #[serde(default)]
    pub columns: Option<Value>,
    #[serde(default)]
    pub mimetype: Option<Value>,
}

/// Text form of an informational field; other JSON types are dropped.
pub(super) fn text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text),
        _ => None,
    }
}

/// Array-of-strings form of an informational field; anything else is empty.
pub(super) fn text_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
