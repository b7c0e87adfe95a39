//! Style and transform engines for the visualisation pipeline.
//!
//! An engine consumes the record set and field catalog produced by a source
//! adapter, applies the configured field resolution (selection, labels,
//! splitting, per-column overrides), and emits plain chart/table
//! specification objects for an external renderer. Invalid or empty input
//! degrades to an empty specification plus a user message.

pub mod axis;
pub mod charts;
pub mod engine;
pub mod settings;
pub mod table;

pub use axis::{chart_build_settings, AxisChartConfig, AxisConfig, ChartConfig, GridConfig};
pub use charts::{ChartKind, KindOptions};
pub use engine::{AxisChartStyle, RenderGroup, RenderOutput, StyleContext, StyleEngine, TableStyle};
pub use settings::{config_pairs, ColumnOverride, DataSettings, UNSPLIT_GROUP};
pub use table::{table_build_settings, TableCell, TableConfig, TableShape};
