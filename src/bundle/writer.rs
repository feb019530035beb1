use std::io::{Cursor, Write};

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::config::DEFAULT_METADATA_ENTRY;
use crate::core::{Bound, ScaleKind};
use crate::core::time::unix_seconds_to_datetime;
use crate::error::{ChartError, ChartResult};
use crate::payload::parse_rows;

const VENDOR: &str = "bundle-charts";

/// Per-chart authoring options. Unset fields fall back to the payload's
/// first two columns and the default line styling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartOptions {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_column: Option<String>,
    pub y_column: Option<String>,
    pub x_scale: ScaleKind,
    pub y_scale: ScaleKind,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    /// Declared bounds that replace the data-derived ones.
    pub x_bounds: Option<(Bound, Bound)>,
    pub y_bounds: Option<(Bound, Bound)>,
    pub remove_zero: bool,
}

impl ChartOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = Some(x_label.into());
        self.y_label = Some(y_label.into());
        self
    }

    #[must_use]
    pub fn columns(mut self, x_column: impl Into<String>, y_column: impl Into<String>) -> Self {
        self.x_column = Some(x_column.into());
        self.y_column = Some(y_column.into());
        self
    }

    #[must_use]
    pub fn x_scale(mut self, kind: ScaleKind) -> Self {
        self.x_scale = kind;
        self
    }

    #[must_use]
    pub fn y_scale(mut self, kind: ScaleKind) -> Self {
        self.y_scale = kind;
        self
    }

    #[must_use]
    pub fn stroke(mut self, stroke: impl Into<String>, stroke_width: f64) -> Self {
        self.stroke = Some(stroke.into());
        self.stroke_width = Some(stroke_width);
        self
    }

    #[must_use]
    pub fn fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    #[must_use]
    pub fn x_bounds(mut self, min: impl Into<Bound>, max: impl Into<Bound>) -> Self {
        self.x_bounds = Some((min.into(), max.into()));
        self
    }

    #[must_use]
    pub fn y_bounds(mut self, min: impl Into<Bound>, max: impl Into<Bound>) -> Self {
        self.y_bounds = Some((min.into(), max.into()));
        self
    }

    /// Drops rows whose y value is zero and stores the payload as `nz_<name>`.
    #[must_use]
    pub fn remove_zero(mut self) -> Self {
        self.remove_zero = true;
        self
    }
}

/// Authors a session bundle in memory.
///
/// Chart bounds are computed from the payload data and stored in the
/// descriptor, so the produced bundle renders with data-fitted axes.
#[derive(Debug, Clone)]
pub struct BundleWriter {
    metadata: Map<String, Value>,
    charts: Vec<Value>,
    entries: IndexMap<String, Vec<u8>>,
}

impl BundleWriter {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut metadata = Map::new();
        metadata.insert("vendor".to_owned(), json!(VENDOR));
        metadata.insert("version".to_owned(), json!(env!("CARGO_PKG_VERSION")));
        metadata.insert("create_time".to_owned(), json!(now));
        metadata.insert("timestamp".to_owned(), json!(now));
        metadata.insert("title".to_owned(), json!(title.into()));
        Self {
            metadata,
            charts: Vec::new(),
            entries: IndexMap::new(),
        }
    }

    /// Sets or replaces a top-level metadata attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn chart_count(&self) -> usize {
        self.charts.len()
    }

    /// Adds a CSV payload and its descriptor; returns the chart index.
    pub fn add_chart(
        &mut self,
        filename: &str,
        csv_text: &str,
        options: ChartOptions,
    ) -> ChartResult<usize> {
        let table = parse_rows(filename, csv_text)?;
        let columns = table.columns().to_vec();
        if columns.len() < 2 {
            return Err(ChartError::InvalidData(format!(
                "`{filename}` needs at least two columns"
            )));
        }

        let x_column = options.x_column.clone().unwrap_or_else(|| columns[0].clone());
        let y_column = options.y_column.clone().unwrap_or_else(|| columns[1].clone());
        for column in [&x_column, &y_column] {
            if !table.has_column(column) {
                return Err(ChartError::InvalidData(format!(
                    "`{filename}` has no column `{column}`"
                )));
            }
        }

        let (arcname, payload) = if options.remove_zero {
            let kept = filter_zero_rows(csv_text, &y_column)?;
            (format!("nz_{filename}"), kept)
        } else {
            (filename.to_owned(), csv_text.to_owned())
        };
        let table = parse_rows(&arcname, &payload)?;

        let x_bounds = column_bounds(table.rows(), &x_column, options.x_scale);
        let y_bounds = column_bounds(table.rows(), &y_column, options.y_scale);
        if x_bounds.is_none() {
            warn!(chart = %arcname, column = %x_column, "no usable x values for bounds");
        }
        if y_bounds.is_none() {
            warn!(chart = %arcname, column = %y_column, "no usable y values for bounds");
        }

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut descriptor = Map::new();
        descriptor.insert("chart_type".to_owned(), json!("line"));
        descriptor.insert("create_time".to_owned(), json!(now));
        descriptor.insert("modify_time".to_owned(), json!(now));
        descriptor.insert("filename".to_owned(), json!(arcname));
        descriptor.insert("mimetype".to_owned(), json!("text/csv"));
        descriptor.insert(
            "title".to_owned(),
            json!(options.title.clone().unwrap_or_else(|| filename.to_owned())),
        );
        descriptor.insert("columns".to_owned(), json!(columns));
        descriptor.insert(
            "x_label".to_owned(),
            json!(options.x_label.clone().unwrap_or_else(|| x_column.clone())),
        );
        descriptor.insert(
            "y_label".to_owned(),
            json!(options.y_label.clone().unwrap_or_else(|| y_column.clone())),
        );
        descriptor.insert("x_column".to_owned(), json!(x_column));
        descriptor.insert("y_column".to_owned(), json!(y_column));
        descriptor.insert("x_scale".to_owned(), json!(options.x_scale.as_str()));
        descriptor.insert("y_scale".to_owned(), json!(options.y_scale.as_str()));
        insert_bounds(&mut descriptor, "x", x_bounds, options.x_scale);
        insert_bounds(&mut descriptor, "y", y_bounds, options.y_scale);
        for (axis, declared) in [("x", &options.x_bounds), ("y", &options.y_bounds)] {
            if let Some((min, max)) = declared {
                descriptor.insert(format!("{axis}_min"), bound_value(min));
                descriptor.insert(format!("{axis}_max"), bound_value(max));
            }
        }
        descriptor.insert(
            "fill".to_owned(),
            json!(options.fill.unwrap_or_else(|| "none".to_owned())),
        );
        descriptor.insert(
            "stroke".to_owned(),
            json!(options.stroke.unwrap_or_else(|| "steelblue".to_owned())),
        );
        descriptor.insert(
            "stroke_width".to_owned(),
            json!(options.stroke_width.unwrap_or(1.5)),
        );

        debug!(chart = %arcname, rows = table.rows().len(), "added chart to bundle");
        self.entries.insert(arcname, payload.into_bytes());
        self.charts.push(Value::Object(descriptor));
        Ok(self.charts.len() - 1)
    }

    /// Sets one descriptor attribute of an added chart and refreshes its
    /// `modify_time`.
    pub fn edit_chart(&mut self, index: usize, key: &str, value: Value) -> ChartResult<()> {
        let Some(Value::Object(descriptor)) = self.charts.get_mut(index) else {
            return Err(ChartError::InvalidData(format!("no chart at index {index}")));
        };
        descriptor.insert(key.to_owned(), value);
        descriptor.insert(
            "modify_time".to_owned(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        Ok(())
    }

    /// Adds a raw entry without touching the descriptor list.
    pub fn add_entry(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), bytes.into());
    }

    /// Serialized metadata document as it will be stored in the archive.
    pub fn metadata_json(&self) -> ChartResult<String> {
        let mut metadata = self.metadata.clone();
        metadata.insert("chart_data".to_owned(), Value::Array(self.charts.clone()));
        serde_json::to_string_pretty(&Value::Object(metadata))
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize metadata: {e}")))
    }

    /// Writes `metadata.json` and every entry into a zip archive.
    pub fn finish(self) -> ChartResult<Vec<u8>> {
        let metadata = self.metadata_json()?;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        let entries = std::iter::once((DEFAULT_METADATA_ENTRY.to_owned(), metadata.into_bytes()))
            .chain(self.entries);
        for (name, bytes) in entries {
            zip.start_file(name.as_str(), options)
                .map_err(|e| ChartError::InvalidData(format!("cannot add `{name}`: {e}")))?;
            zip.write_all(&bytes)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| ChartError::InvalidData(format!("cannot finish archive: {e}")))?;
        Ok(cursor.into_inner())
    }
}

fn column_bounds(rows: &[crate::core::Row], column: &str, kind: ScaleKind) -> Option<(f64, f64)> {
    rows.iter()
        .filter_map(|row| row.coordinate(column, kind))
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
        })
}

fn insert_bounds(
    descriptor: &mut Map<String, Value>,
    axis: &str,
    bounds: Option<(f64, f64)>,
    kind: ScaleKind,
) {
    let Some((min, max)) = bounds else {
        return;
    };
    for (suffix, value) in [("min", min), ("max", max)] {
        let bound = match kind {
            ScaleKind::Linear => json!(value),
            ScaleKind::Time => match unix_seconds_to_datetime(value) {
                Some(instant) => json!(instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
                None => continue,
            },
        };
        descriptor.insert(format!("{axis}_{suffix}"), bound);
    }
}

fn bound_value(bound: &Bound) -> Value {
    match bound {
        Bound::Number(value) => json!(value),
        Bound::Text(text) => json!(text),
    }
}

fn filter_zero_rows(csv_text: &str, y_column: &str) -> ChartResult<String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| ChartError::InvalidData(format!("unreadable header: {e}")))?
        .clone();
    let y_index = headers
        .iter()
        .position(|name| name.trim() == y_column)
        .ok_or_else(|| ChartError::InvalidData(format!("no column `{y_column}`")))?;

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer
        .write_record(&headers)
        .map_err(|e| ChartError::InvalidData(e.to_string()))?;
    for record in reader.records() {
        let record = record.map_err(|e| ChartError::InvalidData(e.to_string()))?;
        let is_zero = record
            .get(y_index)
            .and_then(|cell| cell.trim().parse::<f64>().ok())
            .is_some_and(|value| value == 0.0);
        if !is_zero {
            writer
                .write_record(&record)
                .map_err(|e| ChartError::InvalidData(e.to_string()))?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ChartError::InvalidData(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ChartError::InvalidData(e.to_string()))
}
