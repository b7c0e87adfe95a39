//! JSON source adapter (`json_file`).
//!
//! Fetches a JSON document, selects records with a path expression (default
//! `$[*]`), and builds the catalog from the keys of the first selected
//! object. A document that fails to parse is replaced by `{}` so the
//! pipeline still renders, with a user message explaining the gap.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use viz_core::{FieldCatalog, Record, RecordSet, VizError};

use crate::cache::{cache_key, CacheExpiry};
use crate::{SourceAdapter, SourceDeps};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JsonParseOptions {
    /// Path expression selecting the record list. Empty means `$[*]`.
    pub expression: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JsonOptions {
    pub uri: String,
    pub json: JsonParseOptions,
    pub cache_expiry: CacheExpiry,
}

pub struct JsonSource {
    plugin_id: String,
    options: JsonOptions,
    deps: SourceDeps,
    data: OnceCell<(FieldCatalog, RecordSet)>,
}

impl JsonSource {
    pub fn new(plugin_id: &str, options: &Value, deps: SourceDeps) -> Result<Self, VizError> {
        let options: JsonOptions = serde_json::from_value(options.clone())
            .map_err(|e| VizError::Configuration(format!("{plugin_id} options: {e}")))?;
        Ok(Self {
            plugin_id: plugin_id.to_string(),
            options,
            deps,
            data: OnceCell::new(),
        })
    }

    fn text(&self) -> Result<String, VizError> {
        let ttl = self.options.cache_expiry.resolve(self.deps.global_cache_ttl);
        let key = cache_key(&self.plugin_id, &self.options.uri, None);

        if ttl.is_some() {
            if let Some(Value::String(cached)) = self.deps.cache.get(&key) {
                return Ok(cached);
            }
        }

        let text = self.deps.fetcher.fetch(&self.options.uri)?;
        if let Some(ttl) = ttl {
            self.deps.cache.set(&key, Value::String(text.clone()), ttl);
        }
        Ok(text)
    }

    /// Parsed document; malformed JSON degrades to `{}` with a user message.
    fn document(&self, text: &str) -> Value {
        match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(target: "viz::json", uri = %self.options.uri, error = %e, "document is not valid JSON");
                self.deps
                    .messenger
                    .error(format!("Invalid JSON in data source ({}).", self.options.uri));
                Value::Object(serde_json::Map::new())
            }
        }
    }

    fn assemble(&self, selected: Vec<Value>) -> (FieldCatalog, RecordSet) {
        let catalog: FieldCatalog = match selected.iter().find_map(Value::as_object) {
            Some(first) => first.keys().map(|k| (k.clone(), k.clone())).collect(),
            None => FieldCatalog::new(),
        };

        let mut records = RecordSet::new();
        for (index, value) in selected.into_iter().enumerate() {
            let object = match value {
                Value::Object(object) => object,
                other => {
                    tracing::debug!(target: "viz::json", uri = %self.options.uri, index, ?other, "skipping non-object element");
                    continue;
                }
            };
            let mut record = Record::new();
            for id in catalog.ids() {
                let value = object.get(id).cloned().unwrap_or(Value::String(String::new()));
                record.set(id.to_string(), value);
            }
            records.insert(index.to_string(), record);
        }
        (catalog, records)
    }

    fn load(&self) -> &(FieldCatalog, RecordSet) {
        self.data.get_or_init(|| {
            let text = match self.text() {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(target: "viz::json", uri = %self.options.uri, error = %e, "json fetch failed");
                    self.deps
                        .messenger
                        .error(format!("Unable to read the dataset ({}).", self.options.uri));
                    return (FieldCatalog::new(), RecordSet::new());
                }
            };
            let document = self.document(&text);
            match crate::path::select(&document, &self.options.json.expression) {
                Ok(selected) => self.assemble(selected),
                Err(e) => {
                    tracing::warn!(target: "viz::json", uri = %self.options.uri, error = %e, "path expression rejected");
                    self.deps.messenger.error(format!(
                        "Invalid record expression ({}).",
                        self.options.json.expression
                    ));
                    (FieldCatalog::new(), RecordSet::new())
                }
            }
        })
    }
}

impl SourceAdapter for JsonSource {
    fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    fn fields(&self) -> FieldCatalog {
        self.load().0.clone()
    }

    fn records(&self) -> RecordSet {
        self.load().1.clone()
    }

    fn download_url(&self) -> Option<String> {
        if self.options.uri.is_empty() {
            None
        } else {
            Some(self.options.uri.clone())
        }
    }
}
