//! Donut chart: pie layering plus a center label. A configured chart title
//! moves into the donut center instead of the regular title slot.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::axis::AxisChartConfig;
use crate::charts::pie;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DonutOptions {
    pub label: DonutLabel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DonutLabel {
    pub show: bool,
}

impl Default for DonutLabel {
    fn default() -> Self {
        Self { show: true }
    }
}

pub fn layer(
    settings: &mut Value,
    options: &DonutOptions,
    config: &AxisChartConfig,
    base_keys: &[String],
) {
    pie::layer(settings, config, base_keys);
    settings["chart"]["data"]["type"] = json!("donut");
    settings["overrides"]["donut"]["label"]["show"] = json!(options.label.show);

    let title = &config.chart.title.text;
    if !title.is_empty() {
        settings["chart"]["title"]["show"] = json!(false);
        settings["overrides"]["donut"]["title"] = json!(title);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(value: Value) -> AxisChartConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn title_relocates_to_center_label() {
        let config = config(json!({
            "data": {"fields": ["a"]},
            "chart": {"title": {"text": "Pets"}}
        }));
        let mut settings = json!({"chart": {"data": {}, "title": {"show": true}}});
        layer(&mut settings, &DonutOptions::default(), &config, &[]);

        assert_eq!(settings["chart"]["data"]["type"], json!("donut"));
        assert_eq!(settings["chart"]["title"]["show"], json!(false));
        assert_eq!(settings["overrides"]["donut"]["title"], json!("Pets"));
        assert_eq!(settings["overrides"]["donut"]["label"]["show"], json!(true));
    }

    #[test]
    fn empty_title_stays_put() {
        let config = config(json!({"data": {"fields": ["a"]}}));
        let mut settings = json!({"chart": {"data": {}, "title": {"show": true}}});
        layer(&mut settings, &DonutOptions::default(), &config, &[]);

        assert_eq!(settings["chart"]["title"]["show"], json!(true));
        assert!(settings["overrides"]["donut"].get("title").is_none());
    }
}
