use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

use crate::core::time::{datetime_to_unix_seconds, unix_seconds_to_datetime};
use crate::core::{CoordinateMap, ScaleKind};

pub const DEFAULT_TICK_COUNT: usize = 10;
const MAX_TICKS: usize = 512;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// One labeled axis tick in domain units.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub value: f64,
    pub label: String,
}

/// Builds labeled ticks for the current domain of `map`.
#[must_use]
pub fn axis_ticks(map: CoordinateMap, count: usize) -> Vec<AxisTick> {
    let (start, end) = map.domain();
    match map.kind() {
        ScaleKind::Linear => {
            let step = tick_step(start.min(end), start.max(end), count).abs();
            linear_ticks(start, end, count)
                .into_iter()
                .map(|value| AxisTick {
                    value,
                    label: format_linear_label(value, step),
                })
                .collect()
        }
        ScaleKind::Time => time_ticks(start, end, count),
    }
}

/// Returns the "nice" step (1, 2 or 5 times a power of ten) that splits
/// `[start, stop]` into roughly `count` intervals.
#[must_use]
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let raw_step = (stop - start).abs() / count.max(1) as f64;
    if !raw_step.is_finite() || raw_step == 0.0 {
        return 0.0;
    }
    let mut step = 10f64.powf(raw_step.log10().floor());
    let error = raw_step / step;
    if error >= 50f64.sqrt() {
        step *= 10.0;
    } else if error >= 10f64.sqrt() {
        step *= 5.0;
    } else if error >= 2f64.sqrt() {
        step *= 2.0;
    }
    if stop < start { -step } else { step }
}

/// Evenly spaced nice values inside the domain, ascending.
#[must_use]
pub fn linear_ticks(start: f64, end: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !end.is_finite() || count == 0 {
        return Vec::new();
    }
    let (low, high) = if start <= end { (start, end) } else { (end, start) };
    if low == high {
        return vec![low];
    }

    let step = tick_step(low, high, count);
    if !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }

    let first = (low / step).ceil() as i64;
    let last = (high / step).floor() as i64;
    if last < first {
        return Vec::new();
    }
    (first..=last)
        .take(MAX_TICKS)
        .map(|index| index as f64 * step)
        .collect()
}

fn format_linear_label(value: f64, step: f64) -> String {
    let precision = if step > 0.0 && step.is_finite() {
        (-step.log10().floor()).max(0.0) as usize
    } else {
        0
    };
    let label = format!("{value:.precision$}");
    // Avoid "-0" labels produced by rounding tiny negatives.
    if label.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        return label.trim_start_matches('-').to_owned();
    }
    label
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeInterval {
    Seconds(i64),
    Months(u32),
}

const TIME_INTERVALS: [TimeInterval; 20] = [
    TimeInterval::Seconds(1),
    TimeInterval::Seconds(5),
    TimeInterval::Seconds(15),
    TimeInterval::Seconds(30),
    TimeInterval::Seconds(MINUTE),
    TimeInterval::Seconds(5 * MINUTE),
    TimeInterval::Seconds(15 * MINUTE),
    TimeInterval::Seconds(30 * MINUTE),
    TimeInterval::Seconds(HOUR),
    TimeInterval::Seconds(3 * HOUR),
    TimeInterval::Seconds(6 * HOUR),
    TimeInterval::Seconds(12 * HOUR),
    TimeInterval::Seconds(DAY),
    TimeInterval::Seconds(2 * DAY),
    TimeInterval::Seconds(7 * DAY),
    TimeInterval::Months(1),
    TimeInterval::Months(3),
    TimeInterval::Months(12),
    TimeInterval::Months(60),
    TimeInterval::Months(120),
];

impl TimeInterval {
    fn approx_seconds(self) -> f64 {
        match self {
            Self::Seconds(seconds) => seconds as f64,
            Self::Months(months) => f64::from(months) * 30.0 * DAY as f64,
        }
    }

    fn label_pattern(self) -> &'static str {
        match self {
            Self::Seconds(seconds) if seconds < MINUTE => "%H:%M:%S",
            Self::Seconds(seconds) if seconds < DAY => "%H:%M",
            Self::Seconds(_) => "%Y-%m-%d",
            Self::Months(months) if months < 12 => "%Y-%m",
            Self::Months(_) => "%Y",
        }
    }
}

fn select_time_interval(span_seconds: f64, count: usize) -> TimeInterval {
    let count = count.max(1) as f64;
    TIME_INTERVALS
        .iter()
        .copied()
        .find(|interval| span_seconds / interval.approx_seconds() <= count)
        .unwrap_or(TimeInterval::Months(120))
}

fn time_ticks(start: f64, end: f64, count: usize) -> Vec<AxisTick> {
    if !start.is_finite() || !end.is_finite() || count == 0 {
        return Vec::new();
    }
    let (low, high) = if start <= end { (start, end) } else { (end, start) };
    let interval = select_time_interval(high - low, count);
    let pattern = interval.label_pattern();

    let values = match interval {
        TimeInterval::Seconds(step) => {
            let step = step as f64;
            let first = (low / step).ceil() as i64;
            let last = (high / step).floor() as i64;
            if last < first {
                Vec::new()
            } else {
                (first..=last)
                    .take(MAX_TICKS)
                    .map(|index| index as f64 * step)
                    .collect()
            }
        }
        TimeInterval::Months(months) => month_ticks(low, high, months),
    };

    values
        .into_iter()
        .filter_map(|value| {
            let instant = unix_seconds_to_datetime(value)?;
            Some(AxisTick {
                value,
                label: instant.format(pattern).to_string(),
            })
        })
        .collect()
}

fn month_ticks(low: f64, high: f64, months: u32) -> Vec<f64> {
    let Some(low_instant) = unix_seconds_to_datetime(low) else {
        return Vec::new();
    };
    let Some(mut cursor) = first_aligned_month(low_instant, months) else {
        return Vec::new();
    };

    let mut values = Vec::new();
    while values.len() < MAX_TICKS {
        let Some(midnight) = cursor.and_hms_opt(0, 0, 0) else {
            break;
        };
        let value = datetime_to_unix_seconds(midnight.and_utc());
        if value > high {
            break;
        }
        if value >= low {
            values.push(value);
        }
        match cursor.checked_add_months(Months::new(months)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    values
}

fn first_aligned_month(instant: DateTime<Utc>, months: u32) -> Option<NaiveDate> {
    let month_index = instant.year() * 12 + instant.month0() as i32;
    let step = months.max(1) as i32;
    let aligned = month_index.div_euclid(step) * step;
    NaiveDate::from_ymd_opt(aligned.div_euclid(12), aligned.rem_euclid(12) as u32 + 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_ticks_use_nice_steps() {
        assert_eq!(
            linear_ticks(0.0, 10.0, 10),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
        );
        let fractional = linear_ticks(0.0, 1.0, 5);
        assert_eq!(fractional.len(), 6);
        assert!((fractional[5] - 1.0).abs() <= 1e-12);
    }

    #[test]
    fn linear_labels_follow_step_precision() {
        assert_eq!(format_linear_label(0.25, 0.05), "0.25");
        assert_eq!(format_linear_label(40.0, 20.0), "40");
        assert_eq!(format_linear_label(-0.0001, 0.5), "0.0");
    }

    #[test]
    fn time_interval_grows_with_span() {
        assert_eq!(select_time_interval(60.0, 10), TimeInterval::Seconds(15));
        assert_eq!(select_time_interval(10.0 * DAY as f64, 10), TimeInterval::Seconds(DAY));
        assert_eq!(select_time_interval(700.0 * DAY as f64, 10), TimeInterval::Months(3));
    }
}
