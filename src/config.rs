use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};

pub const DEFAULT_METADATA_ENTRY: &str = "metadata.json";

/// Outer chart size and plot-area margins, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayout {
    pub width: u32,
    pub height: u32,
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 560,
            height: 400,
            margin_top: 60,
            margin_right: 30,
            margin_bottom: 80,
            margin_left: 60,
        }
    }
}

impl ChartLayout {
    #[must_use]
    pub fn viewport(self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Inner plot area left after margins.
    #[must_use]
    pub fn plot_area(self) -> Viewport {
        Viewport::new(
            self.width
                .saturating_sub(self.margin_left)
                .saturating_sub(self.margin_right),
            self.height
                .saturating_sub(self.margin_top)
                .saturating_sub(self.margin_bottom),
        )
    }

    #[must_use]
    pub fn plot_width(self) -> f64 {
        f64::from(self.plot_area().width)
    }

    #[must_use]
    pub fn plot_height(self) -> f64 {
        f64::from(self.plot_area().height)
    }

    pub fn validate(self) -> ChartResult<Self> {
        let plot = self.plot_area();
        if !plot.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: plot.width,
                height: plot.height,
            });
        }
        Ok(self)
    }
}

/// Presentation timings for viewport interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionTiming {
    #[serde(default = "default_idle_debounce", with = "duration_millis")]
    pub idle_debounce: Duration,
    #[serde(default = "default_zoom_transition", with = "duration_millis")]
    pub zoom_transition: Duration,
    #[serde(default = "default_reset_transition", with = "duration_millis")]
    pub reset_transition: Duration,
}

impl Default for InteractionTiming {
    fn default() -> Self {
        Self {
            idle_debounce: default_idle_debounce(),
            zoom_transition: default_zoom_transition(),
            reset_transition: default_reset_transition(),
        }
    }
}

/// What to show in place of a chart whose payload failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartFailurePolicy {
    /// Leave the chart out entirely.
    #[default]
    Omit,
    /// Mount a short text notice naming the chart and the failure.
    Notice,
}

/// Session bootstrap configuration.
///
/// This type is serializable so hosts can keep presentation settings next to
/// their content instead of inventing an ad-hoc format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_metadata_entry")]
    pub metadata_entry: String,
    #[serde(default)]
    pub layout: ChartLayout,
    #[serde(default)]
    pub timing: InteractionTiming,
    #[serde(default)]
    pub failure_policy: ChartFailurePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            metadata_entry: default_metadata_entry(),
            layout: ChartLayout::default(),
            timing: InteractionTiming::default(),
            failure_policy: ChartFailurePolicy::default(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_layout(mut self, layout: ChartLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: InteractionTiming) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: ChartFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    #[must_use]
    pub fn with_metadata_entry(mut self, name: impl Into<String>) -> Self {
        self.metadata_entry = name.into();
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.metadata_entry.is_empty() {
            return Err(ChartError::InvalidData(
                "metadata entry name must not be empty".to_owned(),
            ));
        }
        self.layout.validate()?;
        Ok(self)
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse session config: {e}")))?;
        config.validate()
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize session config: {e}"))
        })
    }
}

fn default_metadata_entry() -> String {
    DEFAULT_METADATA_ENTRY.to_owned()
}

fn default_idle_debounce() -> Duration {
    Duration::from_millis(350)
}

fn default_zoom_transition() -> Duration {
    Duration::from_millis(1000)
}

fn default_reset_transition() -> Duration {
    Duration::from_millis(250)
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
