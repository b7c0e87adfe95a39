//! Configuration surface a caller supplies to construct a visualisation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One plugin binding: which implementation, plus its options tree.
///
/// Options are a partial JSON tree; each plugin deserializes it onto its own
/// typed defaults, so caller-supplied keys override defaults key-by-key at
/// every nesting level rather than wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfiguration {
    pub plugin_id: String,
    #[serde(default = "default_options")]
    pub options: Value,
}

fn default_options() -> Value {
    Value::Object(Default::default())
}

impl PluginConfiguration {
    pub fn new(plugin_id: impl Into<String>, options: Value) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            options,
        }
    }
}

/// Opaque reference to the content entity a visualisation is attached to.
///
/// Passed through untouched; extension hooks may use it to vary configuration
/// per bundle or id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_type: String,
    pub bundle: String,
    pub id: String,
}

/// Everything needed to construct one visualisation instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualisationConfiguration {
    pub source: PluginConfiguration,
    pub style: PluginConfiguration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityRef>,
}

impl VisualisationConfiguration {
    pub fn new(source: PluginConfiguration, style: PluginConfiguration) -> Self {
        Self {
            source,
            style,
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }
}
