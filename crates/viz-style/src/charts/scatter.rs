//! Scatter plot: point radius tuning.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScatterOptions {
    pub point: ScatterPoint,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScatterPoint {
    pub size: String,
}

impl Default for ScatterPoint {
    fn default() -> Self {
        Self {
            size: "2.5".to_string(),
        }
    }
}

pub fn layer(settings: &mut Value, options: &ScatterOptions) {
    settings["chart"]["data"]["type"] = json!("scatter");
    settings["point"] = json!({"radius": options.point.size});
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_radius_defaults() {
        let mut settings = json!({"chart": {"data": {}}});
        layer(&mut settings, &ScatterOptions::default());
        assert_eq!(settings["chart"]["data"]["type"], json!("scatter"));
        assert_eq!(settings["point"]["radius"], json!("2.5"));
    }
}
