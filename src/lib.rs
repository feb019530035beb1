//! bundle-charts: interactive line charts rendered from self-contained data
//! bundles.
//!
//! A bundle is a zip archive holding a `metadata.json` descriptor document
//! and one CSV payload per chart. [`SessionLoader`] fetches a bundle, parses
//! its metadata and renders every chart independently into a
//! [`HostElement`], each with its own brush/zoom [`ViewportController`].

pub mod bundle;
pub mod config;
pub mod core;
pub mod error;
pub mod interaction;
pub mod metadata;
pub mod payload;
pub mod render;
pub mod session;
pub mod telemetry;

pub use bundle::{ArchiveBundle, ArchiveLoader, BlobFetcher, BundleWriter, ChartOptions};
pub use config::{ChartFailurePolicy, ChartLayout, InteractionTiming, SessionConfig};
pub use error::{ChartError, ChartResult};
pub use interaction::{BrushOutcome, ViewportController, ViewportPhase};
pub use metadata::{ChartDescriptor, SessionMetadata};
pub use render::{ChartRenderer, RenderedChart};
pub use session::{HostElement, MountedChart, SessionLoader, SessionOutcome, SessionReport};
