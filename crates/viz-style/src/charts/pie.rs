//! Pie chart: one group of all series, in column-override weight order.

use serde_json::{json, Value};

use crate::axis::AxisChartConfig;

pub fn layer(settings: &mut Value, config: &AxisChartConfig, base_keys: &[String]) {
    settings["chart"]["data"]["type"] = json!("pie");
    settings["chart"]["data"]["groups"] = json!([config.data.fields_sorted(base_keys)]);
}
