use indexmap::IndexMap;

use crate::core::ScaleKind;
use crate::core::time::{datetime_to_unix_seconds, parse_instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One coerced sample in data space.
///
/// For time axes `x`/`y` hold unix seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Typed value of one CSV cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Types a raw cell: finite decimals become numbers, blanks become `Empty`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Number(value),
            _ => Self::Text(trimmed.to_owned()),
        }
    }

    /// Coerces the cell into an axis coordinate for `kind`.
    ///
    /// Linear axes accept numbers only. Time axes accept numbers as unix
    /// seconds and text as a parseable instant.
    #[must_use]
    pub fn coordinate(&self, kind: ScaleKind) -> Option<f64> {
        match (self, kind) {
            (Self::Number(value), _) => Some(*value),
            (Self::Text(text), ScaleKind::Time) => parse_instant(text)
                .ok()
                .map(datetime_to_unix_seconds),
            (Self::Text(_), ScaleKind::Linear) | (Self::Empty, _) => None,
        }
    }
}

/// One parsed payload record keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: IndexMap<String, CellValue>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `(column, raw text)` pairs.
    pub fn from_raw<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let cells = pairs
            .into_iter()
            .map(|(column, raw)| (column.into(), CellValue::parse(raw.as_ref())))
            .collect();
        Self { cells }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    #[must_use]
    pub fn coordinate(&self, column: &str, kind: ScaleKind) -> Option<f64> {
        self.cells.get(column)?.coordinate(kind)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
