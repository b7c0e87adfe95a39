//! Data settings shared by every style engine: field selection, label
//! overrides, split grouping and per-column override bags.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use viz_core::{FieldCatalog, Record, RecordSet};

/// Group key used when no split field is configured.
pub const UNSPLIT_GROUP: &str = "all";

/// Override keys accepted in a per-column bag.
const ALLOWED_OVERRIDES: [&str; 6] = ["color", "type", "legend", "style", "weight", "class"];

/// The `data` section of every style configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DataSettings {
    /// Field ids to visualise, in series/column order.
    pub fields: Vec<String>,
    /// `original|override` label pairs, one per line.
    pub field_labels: String,
    /// Field whose values partition the records into separate outputs.
    pub split_field: String,
    /// Cache lifetime, consumed by the source adapter.
    pub cache_expiry: Value,
    /// Per-field multi-line `key|value` override bags.
    pub column_overrides: IndexMap<String, String>,
    /// Record filters, consumed by the CKAN source adapter.
    pub data_filters: Value,
}

impl DataSettings {
    /// Configured fields with empties removed and duplicates dropped,
    /// preserving the configured order. This order is canonical downstream.
    pub fn selected_fields(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for field in &self.fields {
            if !field.is_empty() && !seen.contains(field) {
                seen.push(field.clone());
            }
        }
        seen
    }

    /// Effective field-id → label map: selected fields present in the
    /// catalog, in selection order, with `original|override` pairs applied.
    /// Overrides are keyed, so applying them twice changes nothing.
    pub fn field_labels(&self, catalog: &FieldCatalog) -> IndexMap<String, String> {
        let mut labels: IndexMap<String, String> = self
            .selected_fields()
            .into_iter()
            .filter(|field| catalog.contains(field))
            .map(|field| (field.clone(), field))
            .collect();

        for (original, replacement) in config_pairs(&self.field_labels) {
            if let Some(label) = labels.get_mut(&original) {
                *label = replacement;
            }
        }
        labels
    }

    /// Label for one field, or empty when the field is not selected.
    pub fn field_label(&self, field: &str, catalog: &FieldCatalog) -> String {
        self.field_labels(catalog)
            .get(field)
            .cloned()
            .unwrap_or_default()
    }

    /// Catalog labels with the synthetic identifier stripped; the default
    /// key space for column overrides.
    pub fn labels_original(&self, catalog: &FieldCatalog) -> Vec<String> {
        catalog.without_synthetic()
    }

    /// Partitions records by the split field's value. Without a split field
    /// (or for records missing it) everything lands in the `all` group.
    /// Record order is preserved within each group, and the groups appear in
    /// first-encounter order. An empty record set still yields the `all`
    /// group so downstream transforms can report it.
    pub fn split_groups(&self, records: &RecordSet) -> IndexMap<String, Vec<(String, Record)>> {
        let mut groups: IndexMap<String, Vec<(String, Record)>> = IndexMap::new();

        for (id, record) in records.iter() {
            let key = if !self.split_field.is_empty() && record.has_field(&self.split_field) {
                record.text(&self.split_field)
            } else {
                UNSPLIT_GROUP.to_string()
            };
            groups
                .entry(key)
                .or_default()
                .push((id.to_string(), record.clone()));
        }

        if groups.is_empty() {
            groups.insert(UNSPLIT_GROUP.to_string(), Vec::new());
        }
        groups
    }

    /// Ordered per-column overrides. `base_keys` is the key space the bags
    /// apply to: catalog labels normally, or per-record tick values when the
    /// X axis groups by values.
    pub fn column_overrides(&self, base_keys: &[String]) -> Vec<ColumnOverride> {
        let mut columns: IndexMap<String, ColumnOverride> = base_keys
            .iter()
            .map(|key| (key.clone(), ColumnOverride::new(key.clone())))
            .collect();

        for (field_name, bag) in &self.column_overrides {
            let Some(column) = columns.get_mut(field_name) else {
                continue;
            };
            for (key, value) in config_pairs(bag) {
                if ALLOWED_OVERRIDES.contains(&key.as_str()) {
                    column.apply(&key, value);
                }
            }
        }

        order_by_weight(columns.into_values().collect())
    }

    /// Column keys in weight order; pie and donut groups use this.
    pub fn fields_sorted(&self, base_keys: &[String]) -> Vec<String> {
        self.column_overrides(base_keys)
            .into_iter()
            .map(|column| column.key)
            .collect()
    }
}

/// Parses a multi-line `key|value` configuration string. Lines without a
/// pipe are ignored; a later duplicate key wins.
pub fn config_pairs(raw: &str) -> IndexMap<String, String> {
    let mut pairs = IndexMap::new();
    for line in raw.lines() {
        let line = line.trim();
        if let Some((key, value)) = line.split_once('|') {
            pairs.insert(key.to_string(), value.to_string());
        }
    }
    pairs
}

/// Styling overrides for one chart column or series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnOverride {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub weight: i64,
    #[serde(skip)]
    explicit_weight: bool,
}

impl ColumnOverride {
    fn new(key: String) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    fn apply(&mut self, key: &str, value: String) {
        match key {
            "color" => self.color = Some(value),
            "type" => self.kind = Some(value),
            "legend" => self.legend = Some(value),
            "style" => self.style = Some(value),
            "class" => self.class = Some(value),
            "weight" => {
                self.weight = value.trim().parse().unwrap_or(0);
                self.explicit_weight = true;
            }
            _ => {}
        }
    }
}

/// Resolves default weights (discovery index) and stable-sorts ascending,
/// so unweighted columns keep their discovery order among equal weights.
fn order_by_weight(mut columns: Vec<ColumnOverride>) -> Vec<ColumnOverride> {
    for (index, column) in columns.iter_mut().enumerate() {
        if !column.explicit_weight {
            column.weight = index as i64;
        }
    }
    columns.sort_by_key(|column| column.weight);
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog(ids: &[&str]) -> FieldCatalog {
        ids.iter().map(|id| (id.to_string(), id.to_string())).collect()
    }

    fn settings(value: Value) -> DataSettings {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn selected_fields_dedupes_and_drops_empties() {
        let data = settings(json!({"fields": ["b", "", "a", "b"]}));
        assert_eq!(data.selected_fields(), vec!["b", "a"]);
    }

    #[test]
    fn field_labels_follow_selection_order_and_apply_overrides() {
        let data = settings(json!({
            "fields": ["dogs", "cats"],
            "field_labels": "cats|Cats at home\nmissing|Ignored\nbroken line"
        }));
        let labels = data.field_labels(&catalog(&["year", "cats", "dogs"]));
        assert_eq!(
            labels.into_iter().collect::<Vec<_>>(),
            vec![
                ("dogs".to_string(), "dogs".to_string()),
                ("cats".to_string(), "Cats at home".to_string()),
            ]
        );
    }

    #[test]
    fn label_overrides_are_idempotent() {
        let data = settings(json!({
            "fields": ["cats"],
            "field_labels": "cats|Felines"
        }));
        let catalog = catalog(&["cats"]);
        let once = data.field_labels(&catalog);
        let twice = data.field_labels(&catalog);
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_catalog_fields_are_dropped() {
        let data = settings(json!({"fields": ["cats", "ghost"]}));
        let labels = data.field_labels(&catalog(&["cats"]));
        assert_eq!(labels.len(), 1);
        assert!(labels.contains_key("cats"));
    }

    #[test]
    fn split_groups_partition_is_complete_and_exclusive() {
        let mut records = RecordSet::new();
        for (id, state) in [("0", "vic"), ("1", "nsw"), ("2", "vic")] {
            let mut record = Record::new();
            record.set("state", json!(state));
            records.insert(id, record);
        }
        let data = settings(json!({"split_field": "state"}));
        let groups = data.split_groups(&records);

        let keys: Vec<&String> = groups.keys().collect();
        assert_eq!(keys, vec!["vic", "nsw"]);
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, records.len());
        assert_eq!(
            groups["vic"].iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>(),
            vec!["0", "2"]
        );
    }

    #[test]
    fn records_missing_the_split_field_fall_back_to_all() {
        let mut records = RecordSet::new();
        records.insert("0", Record::new());
        let data = settings(json!({"split_field": "state"}));
        let groups = data.split_groups(&records);
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec![UNSPLIT_GROUP]);
    }

    #[test]
    fn empty_record_set_still_yields_one_group() {
        let data = DataSettings::default();
        let groups = data.split_groups(&RecordSet::new());
        assert_eq!(groups.len(), 1);
        assert!(groups[UNSPLIT_GROUP].is_empty());
    }

    #[test]
    fn column_override_ordering_weighted_then_discovery() {
        let data = settings(json!({
            "column_overrides": {
                "C": "weight|0",
                "A": "weight|1"
            }
        }));
        let base = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let order: Vec<String> = data
            .column_overrides(&base)
            .into_iter()
            .map(|c| c.key)
            .collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn column_override_ties_keep_discovery_order() {
        let data = settings(json!({
            "column_overrides": {
                "B": "weight|0",
                "D": "weight|0"
            }
        }));
        let base: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let order: Vec<String> = data
            .column_overrides(&base)
            .into_iter()
            .map(|c| c.key)
            .collect();
        assert_eq!(order, vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn column_override_bags_keep_allowed_keys_only() {
        let data = settings(json!({
            "column_overrides": {
                "cats": "color|#f00\ntype|line\nbogus|x\nlegend|hide"
            }
        }));
        let columns = data.column_overrides(&["cats".to_string()]);
        let cats = &columns[0];
        assert_eq!(cats.color.as_deref(), Some("#f00"));
        assert_eq!(cats.kind.as_deref(), Some("line"));
        assert_eq!(cats.legend.as_deref(), Some("hide"));
        assert_eq!(cats.style, None);
    }

    #[test]
    fn config_pairs_later_duplicates_win() {
        let pairs = config_pairs("a|1\nno pipe here\na|2\nb|3");
        assert_eq!(pairs.get("a").map(String::as_str), Some("2"));
        assert_eq!(pairs.len(), 2);
    }
}
