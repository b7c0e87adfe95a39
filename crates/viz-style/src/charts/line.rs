//! Line chart: optional area fill and point visibility.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LineOptions {
    pub data: LinePoints,
    pub area: AreaToggle,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LinePoints {
    pub points: PointShow,
}

impl Default for LinePoints {
    fn default() -> Self {
        Self {
            points: PointShow { show: true },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PointShow {
    pub show: bool,
}

impl Default for PointShow {
    fn default() -> Self {
        Self { show: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AreaToggle {
    pub enabled: bool,
}

pub fn layer(settings: &mut Value, options: &LineOptions) {
    let kind = if options.area.enabled { "area" } else { "line" };
    settings["chart"]["data"]["type"] = json!(kind);
    settings["point"] = json!({"show": options.data.points.show});
}
