//! Spline chart: smoothed lines with optional area fill.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::charts::line::{AreaToggle, LinePoints};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SplineOptions {
    pub data: LinePoints,
    pub area: AreaToggle,
}

pub fn layer(settings: &mut Value, options: &SplineOptions) {
    let kind = if options.area.enabled { "area-spline" } else { "spline" };
    settings["chart"]["data"]["type"] = json!(kind);
    settings["point"] = json!({"show": options.data.points.show});
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spline_types() {
        let mut settings = json!({"chart": {"data": {}}});
        layer(&mut settings, &SplineOptions::default());
        assert_eq!(settings["chart"]["data"]["type"], json!("spline"));

        let mut settings = json!({"chart": {"data": {}}});
        let options: SplineOptions =
            serde_json::from_value(json!({"area": {"enabled": true}})).unwrap();
        layer(&mut settings, &options);
        assert_eq!(settings["chart"]["data"]["type"], json!("area-spline"));
    }
}
