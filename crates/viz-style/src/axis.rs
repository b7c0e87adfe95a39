//! Axis chart configuration and the shared chart-specification assembly.
//!
//! Every axis-based engine layers its own keys onto the settings object this
//! module produces. The output is a plain JSON tree for the external
//! charting library; only the behavior-relevant parts are typed, styling
//! blocks pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use viz_core::{value_is_numeric, FieldCatalog, Messenger, Record};

use crate::settings::DataSettings;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AxisConfig {
    pub styles: AxisStyles,
    pub x: XAxisConfig,
    pub y: YAxisConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AxisStyles {
    pub rotated: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct XAxisConfig {
    /// `indexed`, `category`, `timeseries`, or empty for automatic.
    #[serde(rename = "type")]
    pub kind: String,
    pub label: AxisLabel,
    pub tick: XTickConfig,
    /// `keys` (default) or `values` (pivot on the tick field).
    pub x_axis_grouping: String,
    pub styles: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct YAxisConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub label: AxisLabel,
    pub tick: YTickConfig,
    pub styles: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AxisLabel {
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct XTickConfig {
    pub count: String,
    pub culling: String,
    pub values: TickValues,
    pub format: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct YTickConfig {
    pub count: String,
    pub values: TickValues,
    pub rounding: String,
    pub format: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TickValues {
    /// Field whose per-record values become the tick labels; overrides the
    /// manual list.
    pub field: String,
    /// Manual comma-separated tick labels.
    pub custom: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub x: GridShow,
    pub y: GridShow,
    pub lines: Vec<GridLine>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GridShow {
    pub show: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GridLine {
    pub axis: String,
    pub value: String,
    pub text: String,
    pub position: String,
    pub class: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartConfig {
    pub title: ChartTitle,
    pub interaction: bool,
    pub table: ChartTableToggle,
    pub data: ChartDataConfig,
    pub styles: Value,
    pub component: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: ChartTitle::default(),
            interaction: true,
            table: ChartTableToggle::default(),
            data: ChartDataConfig::default(),
            styles: Value::Null,
            component: "table-chart".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartTitle {
    #[serde(default = "default_true")]
    pub show: bool,
    pub text: String,
}

impl Default for ChartTitle {
    fn default() -> Self {
        Self {
            show: true,
            text: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartTableToggle {
    pub disable: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartDataConfig {
    pub labels: GridShow,
    pub legends: LegendConfig,
}

impl Default for ChartDataConfig {
    fn default() -> Self {
        Self {
            labels: GridShow { show: false },
            legends: LegendConfig { interaction: true },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LegendConfig {
    #[serde(default = "default_true")]
    pub interaction: bool,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self { interaction: true }
    }
}

/// The common axis/grid/chart sections of an axis-chart configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AxisChartConfig {
    pub data: DataSettings,
    pub axis: AxisConfig,
    pub grid: GridConfig,
    pub chart: ChartConfig,
}

fn trimmed_list(raw: &str) -> Vec<Value> {
    raw.split(',')
        .map(|item| Value::String(item.trim().to_string()))
        .collect()
}

/// Assembles the shared chart specification for one record group.
///
/// The exact step order matters: custom ticks are resolved before columns,
/// the pre-pivot tick list feeds axis type inference, and the pivot (X
/// grouping by values) rewrites both columns and ticks at the end.
pub fn chart_build_settings(
    config: &AxisChartConfig,
    catalog: &FieldCatalog,
    records: &[(String, Record)],
    messenger: &Messenger,
) -> Value {
    let mut settings = json!({
        "axis": serde_json::to_value(&config.axis).unwrap_or(Value::Null),
        "grid": serde_json::to_value(&config.grid).unwrap_or(Value::Null),
        "chart": serde_json::to_value(&config.chart).unwrap_or(Value::Null),
    });

    if records.is_empty() {
        messenger.error("Invalid records.");
        return json!({});
    }

    // Manual comma-separated tick lists.
    if !config.axis.x.tick.values.custom.is_empty() {
        settings["axis"]["x"]["tick"]["values"]["custom"] =
            Value::Array(trimmed_list(&config.axis.x.tick.values.custom));
    }
    if !config.axis.y.tick.values.custom.is_empty() {
        settings["axis"]["y"]["tick"]["values"]["custom"] =
            Value::Array(trimmed_list(&config.axis.y.tick.values.custom));
    }

    // Tick values from a source field override the manual list.
    let tick_field = config.axis.x.tick.values.field.as_str();
    if !tick_field.is_empty() {
        let values: Vec<Value> = records
            .iter()
            .filter(|(_, record)| record.has_field(tick_field))
            .map(|(_, record)| Value::String(record.text(tick_field).trim().to_string()))
            .collect();
        settings["axis"]["x"]["tick"]["values"]["custom"] = Value::Array(values);
    }

    // Pre-pivot tick list, used for axis type inference.
    let ticks_custom: Vec<Value> = settings["axis"]["x"]["tick"]["values"]["custom"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    // One data column per selected field, values from records carrying it.
    let fields = config.data.selected_fields();
    let columns: Vec<Value> = fields
        .iter()
        .map(|field| {
            let mut column = vec![Value::String(field.clone())];
            column.extend(
                records
                    .iter()
                    .filter(|(_, record)| record.has_field(field))
                    .map(|(_, record)| record.get(field).cloned().unwrap_or(Value::Null)),
            );
            Value::Array(column)
        })
        .collect();
    settings["chart"]["data"]["columns"] = Value::Array(columns);

    settings["chart"]["data"]["names"] =
        serde_json::to_value(config.data.field_labels(catalog)).unwrap_or(Value::Null);
    settings["chart"]["title"]["text"] = Value::String(config.chart.title.text.clone());
    settings["chart"]["data"]["column_overrides"] =
        serde_json::to_value(config.data.column_overrides(&override_base_keys(config, records, catalog)))
            .unwrap_or(Value::Null);

    // X grouping by values: transpose so each record becomes a row keyed by
    // its tick value, and the field names become the ticks.
    if config.axis.x.x_axis_grouping == "values" {
        let column_labels: Vec<String> = fields.clone();
        let mut flipped: Vec<Value> = Vec::with_capacity(records.len());

        for (index, (_, record)) in records.iter().enumerate() {
            let tick = ticks_custom
                .get(index)
                .cloned()
                .unwrap_or(Value::String(String::new()));
            let mut row = vec![tick];
            row.extend(
                record
                    .iter()
                    .filter(|(field, _)| column_labels.iter().any(|label| label == field))
                    .map(|(_, value)| value.clone()),
            );
            flipped.push(Value::Array(row));
        }

        settings["chart"]["data"]["columns"] = Value::Array(flipped);
        settings["axis"]["x"]["tick"]["values"]["custom"] = Value::Array(
            column_labels.into_iter().map(Value::String).collect(),
        );
    }

    // Automatic axis types, sampled from the first record.
    let first = records.first().map(|(_, record)| record);
    if config.axis.x.kind.is_empty() {
        if let Some(record) = first {
            if !tick_field.is_empty() && record.has_field(tick_field) {
                let value = record.get(tick_field).cloned().unwrap_or(Value::Null);
                let tick_text = Value::String(record.text(tick_field).trim().to_string());
                let kind = if value_is_numeric(&value) && !ticks_custom.contains(&tick_text) {
                    "indexed"
                } else {
                    "category"
                };
                settings["axis"]["x"]["type"] = Value::String(kind.to_string());
            }
        }
    }
    if config.axis.y.kind.is_empty() {
        if let (Some(record), Some(field)) = (first, fields.first()) {
            if record.has_field(field) {
                let value = record.get(field).cloned().unwrap_or(Value::Null);
                let kind = if value_is_numeric(&value) { "indexed" } else { "category" };
                settings["axis"]["y"]["type"] = Value::String(kind.to_string());
            }
        }
    }

    settings
}

/// The key space column-override bags apply to: per-record tick values when
/// the X axis groups by values, catalog labels otherwise.
pub fn override_base_keys(
    config: &AxisChartConfig,
    records: &[(String, Record)],
    catalog: &FieldCatalog,
) -> Vec<String> {
    let tick_field = config.axis.x.tick.values.field.as_str();
    if config.axis.x.x_axis_grouping == "values" && !tick_field.is_empty() {
        records
            .iter()
            .filter(|(_, record)| record.has_field(tick_field))
            .map(|(_, record)| record.text(tick_field))
            .collect()
    } else {
        config.data.labels_original(catalog)
    }
}
