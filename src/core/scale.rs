use serde::{Deserialize, Serialize};

use crate::core::time::{datetime_to_unix_seconds, parse_instant};
use crate::error::{ChartError, ChartResult};

/// Declared axis kind of a chart descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    #[default]
    Linear,
    Time,
}

impl ScaleKind {
    pub fn parse(value: &str) -> ChartResult<Self> {
        match value {
            "linear" => Ok(Self::Linear),
            "time" => Ok(Self::Time),
            other => Err(ChartError::Validation(format!(
                "unsupported scale `{other}` (expected `linear` or `time`)"
            ))),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Time => "time",
        }
    }
}

/// Raw axis bound as written in a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Number(f64),
    Text(String),
}

impl Bound {
    /// Resolves the bound into domain units for `kind`.
    ///
    /// Time bounds resolve to unix seconds.
    pub fn resolve(&self, kind: ScaleKind) -> ChartResult<f64> {
        let value = match (self, kind) {
            (Self::Number(value), _) => *value,
            (Self::Text(text), ScaleKind::Linear) => text.trim().parse::<f64>().map_err(|_| {
                ChartError::Validation(format!("linear bound `{text}` is not a number"))
            })?,
            (Self::Text(text), ScaleKind::Time) => datetime_to_unix_seconds(parse_instant(text)?),
        };
        if !value.is_finite() {
            return Err(ChartError::Validation(
                "scale bounds must be finite".to_owned(),
            ));
        }
        Ok(value)
    }
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Bound {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Affine mapping from a data domain onto a fixed pixel range.
///
/// Time domains are expressed in unix seconds, so both scale kinds share the
/// same monotonic mapping. A degenerate domain maps every value onto the
/// middle of the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMap {
    kind: ScaleKind,
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl CoordinateMap {
    pub fn new(kind: ScaleKind, domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        for value in [domain.0, domain.1, range.0, range.1] {
            if !value.is_finite() {
                return Err(ChartError::InvalidData(
                    "coordinate map domain and range must be finite".to_owned(),
                ));
            }
        }
        Ok(Self {
            kind,
            domain_start: domain.0,
            domain_end: domain.1,
            range_start: range.0,
            range_end: range.1,
        })
    }

    #[must_use]
    pub fn kind(self) -> ScaleKind {
        self.kind
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Returns a copy with a replaced domain and the same range.
    pub fn with_domain(self, start: f64, end: f64) -> ChartResult<Self> {
        Self::new(self.kind, (start, end), self.range())
    }

    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        if span == 0.0 {
            return (self.range_start + self.range_end) / 2.0;
        }
        let normalized = (value - self.domain_start) / span;
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let range_span = self.range_end - self.range_start;
        if range_span == 0.0 {
            return self.domain_start;
        }
        let normalized = (pixel - self.range_start) / range_span;
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }
}

/// Resolves declared bounds into a coordinate map over `range`.
///
/// Returns the map together with the resolved domain bounds.
pub fn resolve(
    kind: ScaleKind,
    min: &Bound,
    max: &Bound,
    range: (f64, f64),
) -> ChartResult<(CoordinateMap, f64, f64)> {
    let resolved_min = min.resolve(kind)?;
    let resolved_max = max.resolve(kind)?;
    let map = CoordinateMap::new(kind, (resolved_min, resolved_max), range)?;
    Ok((map, resolved_min, resolved_max))
}
