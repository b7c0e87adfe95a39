//! Bar chart: stacking, draw order and bar width.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::axis::AxisChartConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BarOptions {
    pub stacked: bool,
    pub data: BarData,
    pub bar: BarShape,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BarData {
    /// Series draw order: `asc`, `desc`, or empty for dataset order.
    pub order: String,
}

impl Default for BarData {
    fn default() -> Self {
        Self {
            order: "desc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BarShape {
    pub width: BarWidth,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BarWidth {
    pub ratio: String,
    /// Explicit pixel width, used when the ratio is `manual`.
    pub value: String,
}

impl Default for BarWidth {
    fn default() -> Self {
        Self {
            ratio: "0.5".to_string(),
            value: String::new(),
        }
    }
}

pub fn layer(settings: &mut Value, options: &BarOptions, config: &AxisChartConfig) {
    settings["chart"]["data"]["type"] = json!("bar");
    settings["chart"]["data"]["stacked"] = json!(options.stacked);
    if options.stacked {
        settings["chart"]["data"]["groups"] = json!([config.data.selected_fields()]);
    }
    settings["chart"]["data"]["order"] = json!(options.data.order);
    settings["bar"] = json!({
        "width": {
            "ratio": options.bar.width.ratio,
            "value": options.bar.width.value,
        }
    });
}
