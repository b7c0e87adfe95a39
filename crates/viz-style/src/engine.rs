//! Style engines: the build contract and the two engine families (axis
//! charts and tables).

use serde_json::{json, Value};

use viz_core::{FieldCatalog, Messenger, RecordSet, VizError};

use crate::axis::{chart_build_settings, override_base_keys, AxisChartConfig};
use crate::charts::{ChartKind, KindOptions};
use crate::settings::{DataSettings, UNSPLIT_GROUP};
use crate::table::{table_build_settings, TableConfig, TableShape};

/// Everything an engine needs to build its output for one visualisation.
pub struct StyleContext<'a> {
    pub catalog: &'a FieldCatalog,
    pub records: &'a RecordSet,
    pub messenger: &'a Messenger,
    pub download_url: Option<&'a str>,
}

/// One rendered group. Without a split field there is a single group keyed
/// `all` with no heading.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderGroup {
    pub key: String,
    /// Split-value heading; absent for the unsplit group.
    pub heading: Option<String>,
    /// Chart specification for the external charting library.
    pub chart: Option<Value>,
    /// Accessible table specification.
    pub table: Option<Value>,
    /// Validated dataset download link.
    pub download_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutput {
    pub groups: Vec<RenderGroup>,
}

/// A style engine turns records into chart and table specifications. Builds
/// degrade to empty specifications plus user messages, never errors.
pub trait StyleEngine: Send + Sync {
    fn plugin_id(&self) -> &str;
    fn build(&self, ctx: &StyleContext<'_>) -> RenderOutput;
}

fn heading_for(key: &str) -> Option<String> {
    if key == UNSPLIT_GROUP {
        None
    } else {
        Some(key.to_string())
    }
}

/// Accepts a URI for the download button only when it looks like a link:
/// absolute URL or rooted path, with no embedded whitespace.
fn valid_download_uri(uri: Option<&str>) -> Option<String> {
    let uri = uri?.trim();
    if uri.is_empty() || uri.chars().any(char::is_whitespace) {
        return None;
    }
    if uri.contains("://") || uri.starts_with('/') {
        Some(uri.to_string())
    } else {
        None
    }
}

/// Axis-based chart engine covering all chart kinds.
pub struct AxisChartStyle {
    kind: ChartKind,
    config: AxisChartConfig,
    kind_options: KindOptions,
}

impl AxisChartStyle {
    pub fn new(kind: ChartKind, options: &Value) -> Result<Self, VizError> {
        let config: AxisChartConfig = serde_json::from_value(options.clone())
            .map_err(|e| VizError::Configuration(format!("{} options: {e}", kind.plugin_id())))?;
        let kind_options = KindOptions::parse(kind, options)?;
        Ok(Self {
            kind,
            config,
            kind_options,
        })
    }

    pub fn data_settings(&self) -> &DataSettings {
        &self.config.data
    }
}

impl StyleEngine for AxisChartStyle {
    fn plugin_id(&self) -> &str {
        self.kind.plugin_id()
    }

    fn build(&self, ctx: &StyleContext<'_>) -> RenderOutput {
        let mut output = RenderOutput::default();

        for (key, group_records) in self.config.data.split_groups(ctx.records) {
            let mut chart =
                chart_build_settings(&self.config, ctx.catalog, &group_records, ctx.messenger);
            let base_keys = override_base_keys(&self.config, &group_records, ctx.catalog);
            self.kind_options.layer(&mut chart, &self.config, &base_keys);

            // Accessible twin of the chart; the X tick field leads each row.
            let shape = TableShape {
                table_header_field: None,
                row_header_field: Some(self.config.axis.x.tick.values.field.clone())
                    .filter(|f| !f.is_empty()),
            };
            let table =
                table_build_settings(&self.config.data, ctx.catalog, &group_records, &shape);

            output.groups.push(RenderGroup {
                heading: heading_for(&key),
                chart: Some(chart),
                table: Some(table),
                download_uri: valid_download_uri(ctx.download_url),
                key,
            });
        }
        output
    }
}

/// The standalone table engine (`table`).
pub struct TableStyle {
    data: DataSettings,
    table: TableConfig,
}

impl TableStyle {
    pub const PLUGIN_ID: &'static str = "table";

    pub fn new(options: &Value) -> Result<Self, VizError> {
        #[derive(serde::Deserialize, Default)]
        #[serde(default)]
        struct TableStyleOptions {
            data: DataSettings,
            table: TableConfig,
        }
        let options: TableStyleOptions = serde_json::from_value(options.clone())
            .map_err(|e| VizError::Configuration(format!("table options: {e}")))?;
        Ok(Self {
            data: options.data,
            table: options.table,
        })
    }

    pub fn data_settings(&self) -> &DataSettings {
        &self.data
    }
}

impl StyleEngine for TableStyle {
    fn plugin_id(&self) -> &str {
        Self::PLUGIN_ID
    }

    fn build(&self, ctx: &StyleContext<'_>) -> RenderOutput {
        let mut output = RenderOutput::default();
        let shape = self.table.shape();

        for (key, group_records) in self.data.split_groups(ctx.records) {
            let mut settings =
                table_build_settings(&self.data, ctx.catalog, &group_records, &shape);
            settings["tableOptions"] = json!({
                "pageLength": self.table.options.page_length,
                "searching": self.table.options.searching,
            });
            settings["datatable"] = json!(self.table.datatable);

            output.groups.push(RenderGroup {
                heading: heading_for(&key),
                chart: None,
                table: Some(settings),
                download_uri: valid_download_uri(ctx.download_url),
                key,
            });
        }
        output
    }
}
