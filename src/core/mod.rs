pub mod line_series;
pub mod scale;
pub mod ticks;
pub mod time;
pub mod types;

pub use line_series::{PathPoint, SeriesColumns, SeriesPoints, extract_points, project_polyline};
pub use scale::{Bound, CoordinateMap, ScaleKind};
pub use ticks::{AxisTick, axis_ticks};
pub use time::parse_instant;
pub use types::{CellValue, DataPoint, Row, Viewport};
