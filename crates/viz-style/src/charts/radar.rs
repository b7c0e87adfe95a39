//! Radar chart: direction and axis-line overrides for the renderer.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RadarOptions {
    pub direction: RadarDirection,
    pub axis: RadarAxis,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RadarDirection {
    pub clockwise: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RadarAxis {
    pub line: RadarAxisLine,
}

impl Default for RadarAxis {
    fn default() -> Self {
        Self {
            line: RadarAxisLine { show: true },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RadarAxisLine {
    pub show: bool,
}

impl Default for RadarAxisLine {
    fn default() -> Self {
        Self { show: true }
    }
}

pub fn layer(settings: &mut Value, options: &RadarOptions) {
    settings["chart"]["data"]["type"] = json!("radar");
    settings["overrides"]["radar"] = json!({
        "direction": {"clockwise": options.direction.clockwise},
        "axis": {"line": {"show": options.axis.line.show}},
    });
}
