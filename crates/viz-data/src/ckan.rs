//! CKAN datastore source adapter (`ckan_resource`).
//!
//! Talks to a CKAN portal's `datastore_search` action. The schema comes from
//! a one-row probe; records come from a sequential paginated loop bounded by
//! the reported total and a hard page ceiling. A page failure keeps whatever
//! was accumulated so far rather than discarding the lot.

use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use viz_core::{value_text, FieldCatalog, Record, RecordSet, VizError, SYNTHETIC_ID_FIELD};

use crate::cache::{cache_key, CacheExpiry};
use crate::{SourceAdapter, SourceDeps};

/// Page size for record pagination.
const PAGE_LIMIT: usize = 100;
/// One-row request used to discover the schema.
const PROBE_LIMIT: usize = 1;
/// Hard ceiling on pages per dataset, independent of the reported total.
const MAX_PAGES: usize = 500;

/// One `datastore_search` request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub resource_id: String,
    pub limit: usize,
    pub offset: usize,
    /// Full-text filter.
    pub q: Option<String>,
    /// Field filter dictionary, passed through as JSON.
    pub filters: Option<Value>,
}

/// A datastore field descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkanField {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// The useful part of a `datastore_search` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub fields: Vec<CkanField>,
    pub records: Vec<Value>,
    pub total: u64,
}

/// Transport seam for the datastore API; tests inject an in-memory client.
pub trait CkanClient: Send + Sync {
    fn search(&self, query: &SearchQuery) -> Result<SearchResult, VizError>;
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: SearchResult,
}

/// Client for a real CKAN portal.
pub struct HttpCkanClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpCkanClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, VizError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VizError::Configuration(format!("ckan client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

impl CkanClient for HttpCkanClient {
    fn search(&self, query: &SearchQuery) -> Result<SearchResult, VizError> {
        let url = format!("{}/api/3/action/datastore_search", self.base_url);
        let mut params: Vec<(&str, String)> = vec![
            ("resource_id", query.resource_id.clone()),
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        if let Some(q) = &query.q {
            params.push(("q", q.clone()));
        }
        if let Some(filters) = &query.filters {
            params.push(("filters", filters.to_string()));
        }

        tracing::debug!(target: "viz::ckan", resource = %query.resource_id, offset = query.offset, "datastore search");
        let mut request = self.client.get(&url).query(&params);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", key);
        }
        let envelope: Envelope = request
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| VizError::fetch(&url, e))?
            .json()
            .map_err(|e| VizError::parse(&url, e))?;

        if !envelope.success {
            return Err(VizError::fetch(&url, "datastore_search reported failure"));
        }
        Ok(envelope.result)
    }
}

/// Style-supplied record filters.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DataFilters {
    /// Full-text search term.
    pub q: String,
    /// Field filter dictionary, configured as a JSON string.
    pub filters: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CkanOptions {
    pub uri: String,
    pub cache_expiry: CacheExpiry,
    pub data_filters: DataFilters,
}

pub struct CkanSource {
    plugin_id: String,
    options: CkanOptions,
    deps: SourceDeps,
    data: OnceCell<(FieldCatalog, RecordSet)>,
}

impl CkanSource {
    pub fn new(plugin_id: &str, options: &Value, deps: SourceDeps) -> Result<Self, VizError> {
        let options: CkanOptions = serde_json::from_value(options.clone())
            .map_err(|e| VizError::Configuration(format!("{plugin_id} options: {e}")))?;
        Ok(Self {
            plugin_id: plugin_id.to_string(),
            options,
            deps,
            data: OnceCell::new(),
        })
    }

    /// Resource id = last non-empty path segment of the configured URI.
    fn resource_id(&self) -> Result<String, VizError> {
        self.options
            .uri
            .split('/')
            .filter(|segment| !segment.is_empty())
            .next_back()
            .map(|segment| segment.split('?').next().unwrap_or(segment).to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                VizError::fetch(&self.options.uri, "no resource id in the configured URI")
            })
    }

    /// Validated filters: trimmed `q`, and `filters` only when it parses as a
    /// JSON object. A malformed dictionary is dropped before the request.
    fn filters(&self) -> (Option<String>, Option<Value>) {
        let q = Some(self.options.data_filters.q.trim())
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        let filters = match self.options.data_filters.filters.trim() {
            "" => None,
            raw => match serde_json::from_str::<Value>(raw) {
                Ok(value @ Value::Object(_)) => Some(value),
                Ok(_) | Err(_) => {
                    tracing::warn!(target: "viz::ckan", raw, "dropping malformed filters dictionary");
                    None
                }
            },
        };
        (q, filters)
    }

    fn ttl(&self) -> Option<Duration> {
        self.options.cache_expiry.resolve(self.deps.global_cache_ttl)
    }

    fn cached<T: serde::de::DeserializeOwned>(&self, resource: &str, artifact: &str) -> Option<T> {
        if self.ttl().is_none() {
            return None;
        }
        let key = cache_key(&self.plugin_id, resource, Some(artifact));
        let value = self.deps.cache.get(&key)?;
        serde_json::from_value(value).ok()
    }

    fn store<T: Serialize>(&self, resource: &str, artifact: &str, data: &T) {
        let Some(ttl) = self.ttl() else { return };
        if let Ok(value) = serde_json::to_value(data) {
            let key = cache_key(&self.plugin_id, resource, Some(artifact));
            self.deps.cache.set(&key, value, ttl);
        }
    }

    fn probe_fields(&self, resource: &str) -> Result<Vec<CkanField>, VizError> {
        if let Some(fields) = self.cached::<Vec<CkanField>>(resource, "fields") {
            return Ok(fields);
        }
        let (q, filters) = self.filters();
        let result = self.deps.ckan.search(&SearchQuery {
            resource_id: resource.to_string(),
            limit: PROBE_LIMIT,
            offset: 0,
            q,
            filters,
        })?;
        self.store(resource, "fields", &result.fields);
        Ok(result.fields)
    }

    /// Sequential paginated fetch. Bounded by the reported total and
    /// [`MAX_PAGES`]. A failing page ends the loop with the records
    /// accumulated so far.
    fn paginate(&self, resource: &str) -> Vec<Value> {
        if let Some(records) = self.cached::<Vec<Value>>(resource, "records") {
            return records;
        }
        let (q, filters) = self.filters();
        let mut accumulated: Vec<Value> = Vec::new();
        let mut total: Option<u64> = None;

        for page in 0..MAX_PAGES {
            let query = SearchQuery {
                resource_id: resource.to_string(),
                limit: PAGE_LIMIT,
                offset: page * PAGE_LIMIT,
                q: q.clone(),
                filters: filters.clone(),
            };
            let result = match self.deps.ckan.search(&query) {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(target: "viz::ckan", resource, page, error = %e, "page fetch failed, keeping partial records");
                    self.deps.messenger.error(format!(
                        "Some records could not be retrieved ({resource})."
                    ));
                    return accumulated;
                }
            };
            total = Some(result.total);
            let received = result.records.len();
            accumulated.extend(result.records);
            if received < PAGE_LIMIT || accumulated.len() as u64 >= result.total {
                break;
            }
        }

        if let Some(total) = total {
            if (accumulated.len() as u64) < total && accumulated.len() >= MAX_PAGES * PAGE_LIMIT {
                tracing::warn!(target: "viz::ckan", resource, total, fetched = accumulated.len(), "page ceiling reached");
            }
        }
        self.store(resource, "records", &accumulated);
        accumulated
    }

    fn assemble(&self, fields: Vec<CkanField>, raw: Vec<Value>) -> (FieldCatalog, RecordSet) {
        let catalog: FieldCatalog = fields
            .iter()
            .map(|field| (field.id.clone(), field.id.clone()))
            .collect();

        let mut records = RecordSet::new();
        for (index, value) in raw.into_iter().enumerate() {
            let Value::Object(object) = value else { continue };
            let id = object
                .get(SYNTHETIC_ID_FIELD)
                .map(value_text)
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| index.to_string());
            let mut record = Record::new();
            for field in catalog.ids() {
                let value = object
                    .get(field)
                    .cloned()
                    .unwrap_or(Value::String(String::new()));
                record.set(field.to_string(), value);
            }
            records.insert(id, record);
        }
        (catalog, records)
    }

    fn load(&self) -> &(FieldCatalog, RecordSet) {
        self.data.get_or_init(|| {
            let resource = match self.resource_id() {
                Ok(resource) => resource,
                Err(e) => {
                    tracing::warn!(target: "viz::ckan", uri = %self.options.uri, error = %e, "cannot determine resource");
                    self.deps
                        .messenger
                        .error(format!("Unable to read the dataset ({}).", self.options.uri));
                    return (FieldCatalog::new(), RecordSet::new());
                }
            };
            let fields = match self.probe_fields(&resource) {
                Ok(fields) => fields,
                Err(e) => {
                    tracing::warn!(target: "viz::ckan", resource = %resource, error = %e, "schema probe failed");
                    self.deps
                        .messenger
                        .error(format!("Unable to read the dataset ({resource})."));
                    return (FieldCatalog::new(), RecordSet::new());
                }
            };
            let raw = self.paginate(&resource);
            self.assemble(fields, raw)
        })
    }
}

impl SourceAdapter for CkanSource {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::ContentFetcher;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;
    use viz_core::Messenger;

    struct NoFetch;

    impl ContentFetcher for NoFetch {
        fn fetch(&self, uri: &str) -> Result<String, VizError> {
            Err(VizError::fetch(uri, "unused in ckan tests"))
        }
    }

    /// Serves a fixed dataset page by page; can fail one page index.
    struct FakeCkan {
        records: Vec<Value>,
        fail_page: Option<usize>,
        queries: Mutex<Vec<SearchQuery>>,
    }

    impl FakeCkan {
        fn with_rows(count: usize) -> Self {
            let records = (0..count)
                .map(|i| json!({"_id": i + 1, "name": format!("row {i}"), "value": i}))
                .collect();
            Self {
                records,
                fail_page: None,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<SearchQuery> {
            self.queries.lock().clone()
        }
    }

    impl CkanClient for FakeCkan {
        fn search(&self, query: &SearchQuery) -> Result<SearchResult, VizError> {
            self.queries.lock().push(query.clone());
            if query.limit == PAGE_LIMIT {
                let page = query.offset / PAGE_LIMIT;
                if self.fail_page == Some(page) {
                    return Err(VizError::fetch("ckan", "page unavailable"));
                }
            }
            let start = query.offset.min(self.records.len());
            let end = (query.offset + query.limit).min(self.records.len());
            Ok(SearchResult {
                fields: vec![
                    CkanField {
                        id: SYNTHETIC_ID_FIELD.into(),
                        kind: "int".into(),
                    },
                    CkanField {
                        id: "name".into(),
                        kind: "text".into(),
                    },
                    CkanField {
                        id: "value".into(),
                        kind: "int".into(),
                    },
                ],
                records: self.records[start..end].to_vec(),
                total: self.records.len() as u64,
            })
        }
    }

    fn source_with(client: Arc<FakeCkan>, options: Value) -> (CkanSource, Messenger) {
        let messenger = Messenger::default();
        let deps = SourceDeps {
            fetcher: Arc::new(NoFetch),
            ckan: client,
            cache: Arc::new(MemoryCache::new()),
            messenger: messenger.clone(),
            global_cache_ttl: Duration::from_secs(3600),
        };
        (
            CkanSource::new("ckan_resource", &options, deps).unwrap(),
            messenger,
        )
    }

    fn uri() -> Value {
        json!({"uri": "https://data.example.org/dataset/abc/resource/res-123"})
    }

    #[test]
    fn resource_id_is_last_path_segment() {
        let (source, _) = source_with(Arc::new(FakeCkan::with_rows(0)), uri());
        assert_eq!(source.resource_id().unwrap(), "res-123");

        let (source, _) = source_with(
            Arc::new(FakeCkan::with_rows(0)),
            json!({"uri": "https://data.example.org/resource/res-9/"}),
        );
        assert_eq!(source.resource_id().unwrap(), "res-9");
    }

    #[test]
    fn schema_probe_uses_single_row() {
        let client = Arc::new(FakeCkan::with_rows(5));
        let (source, _) = source_with(client.clone(), uri());
        let catalog = source.fields();
        assert!(catalog.contains(SYNTHETIC_ID_FIELD));
        assert!(catalog.contains("name"));
        assert_eq!(client.queries()[0].limit, PROBE_LIMIT);
    }

    #[test]
    fn pagination_covers_total_in_fixed_pages() {
        let client = Arc::new(FakeCkan::with_rows(250));
        let (source, messenger) = source_with(client.clone(), uri());
        let records = source.records();
        assert_eq!(records.len(), 250);
        assert!(messenger.is_empty());

        let pages: Vec<usize> = client
            .queries()
            .iter()
            .filter(|q| q.limit == PAGE_LIMIT)
            .map(|q| q.offset)
            .collect();
        assert_eq!(pages, vec![0, 100, 200]);
    }

    #[test]
    fn page_failure_keeps_accumulated_records() {
        let mut client = FakeCkan::with_rows(250);
        client.fail_page = Some(1);
        let client = Arc::new(client);
        let (source, messenger) = source_with(client.clone(), uri());

        let records = source.records();
        assert_eq!(records.len(), 100);
        assert_eq!(messenger.messages().len(), 1);

        // No retry: exactly one request for the failed page.
        let second_page = client
            .queries()
            .iter()
            .filter(|q| q.limit == PAGE_LIMIT && q.offset == 100)
            .count();
        assert_eq!(second_page, 1);
    }

    #[test]
    fn records_keyed_by_synthetic_id_and_limited_to_catalog() {
        let client = Arc::new(FakeCkan::with_rows(3));
        let (source, _) = source_with(client, uri());
        let records = source.records();
        let first = records.get("1").unwrap();
        assert_eq!(first.text("name"), "row 0");
        assert_eq!(
            first.fields().collect::<Vec<_>>(),
            vec![SYNTHETIC_ID_FIELD, "name", "value"]
        );
    }

    #[test]
    fn filters_are_trimmed_and_malformed_dictionaries_dropped() {
        let client = Arc::new(FakeCkan::with_rows(1));
        let (source, _) = source_with(
            client.clone(),
            json!({
                "uri": "https://x/resource/r1",
                "data_filters": {"q": "  cats  ", "filters": "{not json"}
            }),
        );
        source.records();
        let query = &client.queries()[0];
        assert_eq!(query.q.as_deref(), Some("cats"));
        assert_eq!(query.filters, None);

        let client = Arc::new(FakeCkan::with_rows(1));
        let (source, _) = source_with(
            client.clone(),
            json!({
                "uri": "https://x/resource/r1",
                "data_filters": {"filters": r#"{"state": "open"}"#}
            }),
        );
        source.records();
        assert_eq!(client.queries()[0].filters, Some(json!({"state": "open"})));
    }

    #[test]
    fn missing_resource_id_degrades_with_message() {
        let (source, messenger) =
            source_with(Arc::new(FakeCkan::with_rows(1)), json!({"uri": ""}));
        assert!(source.records().is_empty());
        assert_eq!(messenger.messages().len(), 1);
    }

    #[test]
    fn second_instance_reads_records_from_cache() {
        let cache = Arc::new(MemoryCache::new());
        let client = Arc::new(FakeCkan::with_rows(5));
        let make = || SourceDeps {
            fetcher: Arc::new(NoFetch),
            ckan: client.clone(),
            cache: cache.clone(),
            messenger: Messenger::default(),
            global_cache_ttl: Duration::from_secs(3600),
        };

        let first = CkanSource::new("ckan_resource", &uri(), make()).unwrap();
        first.records();
        let after_first = client.queries().len();

        let second = CkanSource::new("ckan_resource", &uri(), make()).unwrap();
        assert_eq!(second.records().len(), 5);
        assert_eq!(client.queries().len(), after_first);
    }
}
