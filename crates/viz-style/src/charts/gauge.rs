//! Gauge chart: range, units and label formatting.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::axis::AxisChartConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GaugeOptions {
    pub gauge: GaugeSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GaugeSettings {
    pub label: GaugeLabel,
    pub units: String,
    pub width: String,
    pub min: String,
    pub max: String,
}

impl Default for GaugeSettings {
    fn default() -> Self {
        Self {
            label: GaugeLabel::default(),
            units: String::new(),
            width: "39".to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GaugeLabel {
    pub show: bool,
    pub percentage: bool,
}

pub fn layer(settings: &mut Value, options: &GaugeOptions, config: &AxisChartConfig) {
    settings["chart"]["data"]["type"] = json!("gauge");
    settings["chart"]["data"]["groups"] = json!([config.data.selected_fields()]);
    settings["gauge"] = json!({
        "label": {
            "show": options.gauge.label.show,
            "percentage": options.gauge.label.percentage,
        },
        "units": options.gauge.units,
        "width": options.gauge.width,
        "min": options.gauge.min,
        "max": options.gauge.max,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauge_settings_carry_range_and_units() {
        let config: AxisChartConfig =
            serde_json::from_value(json!({"data": {"fields": ["score"]}})).unwrap();
        let options: GaugeOptions = serde_json::from_value(json!({
            "gauge": {"units": "%", "min": "0", "max": "200"}
        }))
        .unwrap();
        let mut settings = json!({"chart": {"data": {}}});
        layer(&mut settings, &options, &config);

        assert_eq!(settings["chart"]["data"]["type"], json!("gauge"));
        assert_eq!(settings["chart"]["data"]["groups"], json!([["score"]]));
        assert_eq!(settings["gauge"]["max"], json!("200"));
        assert_eq!(settings["gauge"]["width"], json!("39"));
        assert_eq!(settings["gauge"]["label"]["show"], json!(false));
    }
}
