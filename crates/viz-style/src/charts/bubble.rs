//! Bubble chart: maximum radius override for the renderer.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BubbleOptions {
    pub max_radius: Value,
}

impl Default for BubbleOptions {
    fn default() -> Self {
        Self {
            max_radius: json!(35),
        }
    }
}

pub fn layer(settings: &mut Value, options: &BubbleOptions) {
    settings["chart"]["data"]["type"] = json!("bubble");
    settings["overrides"]["bubble"] = json!({"maxR": options.max_radius});
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_radius_override() {
        let mut settings = json!({"chart": {"data": {}}});
        layer(&mut settings, &BubbleOptions::default());
        assert_eq!(settings["overrides"]["bubble"]["maxR"], json!(35));

        let mut settings = json!({"chart": {"data": {}}});
        let options: BubbleOptions =
            serde_json::from_value(json!({"max_radius": 12})).unwrap();
        layer(&mut settings, &options);
        assert_eq!(settings["overrides"]["bubble"]["maxR"], json!(12));
    }
}
