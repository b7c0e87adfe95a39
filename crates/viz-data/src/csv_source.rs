//! CSV source adapter.
//!
//! Covers both local files (`csv_file`) and remote URLs (`csv_remote`) — the
//! fetch boundary resolves the URI either way, so one adapter serves both
//! plugin ids. The first row is the header and doubles as the field catalog
//! (id == label); data rows map to headers positionally and short rows pad
//! with empty strings.

use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use viz_core::{FieldCatalog, Record, RecordSet, VizError};

use crate::cache::{cache_key, CacheExpiry};
use crate::{SourceAdapter, SourceDeps};

/// Parse settings for the CSV reader. Single-character strings; longer values
/// use their first byte.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CsvParseOptions {
    pub delimiter: String,
    pub enclosure: String,
    pub escape: String,
}

impl Default for CsvParseOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".into(),
            enclosure: "\"".into(),
            escape: "\\".into(),
        }
    }
}

fn first_byte(raw: &str, fallback: u8) -> u8 {
    raw.bytes().next().unwrap_or(fallback)
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CsvOptions {
    pub uri: String,
    pub csv: CsvParseOptions,
    pub cache_expiry: CacheExpiry,
}

pub struct CsvSource {
    plugin_id: String,
    options: CsvOptions,
    deps: SourceDeps,
    data: OnceCell<(FieldCatalog, RecordSet)>,
}

impl CsvSource {
    pub fn new(plugin_id: &str, options: &Value, deps: SourceDeps) -> Result<Self, VizError> {
        let options: CsvOptions = serde_json::from_value(options.clone())
            .map_err(|e| VizError::Configuration(format!("{plugin_id} options: {e}")))?;
        Ok(Self {
            plugin_id: plugin_id.to_string(),
            options,
            deps,
            data: OnceCell::new(),
        })
    }

    /// Raw CSV text, from the cache when fresh, otherwise fetched and cached.
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

    fn parse(&self, text: &str) -> (FieldCatalog, RecordSet) {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(first_byte(&self.options.csv.delimiter, b','))
            .quote(first_byte(&self.options.csv.enclosure, b'"'))
            .escape(Some(first_byte(&self.options.csv.escape, b'\\')))
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = reader.records();
        let headers: Vec<String> = match rows.next() {
            Some(Ok(row)) => row.iter().map(str::to_string).collect(),
            Some(Err(e)) => {
                tracing::warn!(target: "viz::csv", uri = %self.options.uri, error = %e, "header row unreadable");
                self.deps
                    .messenger
                    .error(format!("Invalid data source ({}).", self.options.uri));
                return (FieldCatalog::new(), RecordSet::new());
            }
            None => return (FieldCatalog::new(), RecordSet::new()),
        };

        let catalog: FieldCatalog = headers
            .iter()
            .map(|h| (h.clone(), h.clone()))
            .collect();

        let mut records = RecordSet::new();
        for (index, row) in rows.enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(target: "viz::csv", uri = %self.options.uri, row = index, error = %e, "skipping unreadable row");
                    continue;
                }
            };
            let mut record = Record::new();
            for (position, header) in headers.iter().enumerate() {
                let value = row.get(position).unwrap_or("");
                record.set(header.clone(), Value::String(value.to_string()));
            }
            records.insert(index.to_string(), record);
        }
        (catalog, records)
    }

    fn load(&self) -> &(FieldCatalog, RecordSet) {
        self.data.get_or_init(|| match self.text() {
            Ok(text) => self.parse(&text),
            Err(e) => {
                tracing::warn!(target: "viz::csv", uri = %self.options.uri, error = %e, "csv fetch failed");
                self.deps
                    .messenger
                    .error(format!("Unable to read the dataset ({}).", self.options.uri));
                (FieldCatalog::new(), RecordSet::new())
            }
        })
    }
}

impl SourceAdapter for CsvSource {
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
    use crate::ckan::{CkanClient, SearchQuery, SearchResult};
    use crate::ContentFetcher;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use viz_core::Messenger;

    struct FixedFetcher {
        body: Result<String, String>,
        calls: AtomicUsize,
    }

    impl FixedFetcher {
        fn ok(body: &str) -> Self {
            Self {
                body: Ok(body.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                body: Err("boom".into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ContentFetcher for FixedFetcher {
        fn fetch(&self, uri: &str) -> Result<String, VizError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body
                .clone()
                .map_err(|reason| VizError::fetch(uri, reason))
        }
    }

    struct NoCkan;

    impl CkanClient for NoCkan {
        fn search(&self, _query: &SearchQuery) -> Result<SearchResult, VizError> {
            Err(VizError::fetch("ckan", "unused in csv tests"))
        }
    }

    fn deps(fetcher: Arc<FixedFetcher>) -> SourceDeps {
        SourceDeps {
            fetcher,
            ckan: Arc::new(NoCkan),
            cache: Arc::new(MemoryCache::new()),
            messenger: Messenger::default(),
            global_cache_ttl: Duration::from_secs(3600),
        }
    }

    fn source(body: &str, options: Value) -> (CsvSource, Arc<FixedFetcher>) {
        let fetcher = Arc::new(FixedFetcher::ok(body));
        let source = CsvSource::new("csv_file", &options, deps(fetcher.clone())).unwrap();
        (source, fetcher)
    }

    #[test]
    fn header_row_becomes_catalog_and_rows_map_positionally() {
        let (source, _) = source(
            "year,cats,dogs\n2018,3,5\n2019,4,6\n",
            json!({"uri": "data.csv"}),
        );

        let catalog = source.fields();
        assert_eq!(
            catalog.iter().collect::<Vec<_>>(),
            vec![("year", "year"), ("cats", "cats"), ("dogs", "dogs")]
        );

        let records = source.records();
        assert_eq!(records.len(), 2);
        let first = records.get("0").unwrap();
        assert_eq!(first.text("year"), "2018");
        assert_eq!(first.text("dogs"), "5");
    }

    #[test]
    fn short_rows_pad_with_empty_strings() {
        let (source, _) = source("a,b,c\n1\n1,2,3\n", json!({"uri": "data.csv"}));
        let records = source.records();
        let short = records.get("0").unwrap();
        assert_eq!(short.text("a"), "1");
        assert_eq!(short.text("b"), "");
        assert_eq!(short.text("c"), "");
        assert_eq!(records.get("1").unwrap().text("c"), "3");
    }

    #[test]
    fn custom_delimiter() {
        let (source, _) = source(
            "a;b\n1;2\n",
            json!({"uri": "data.csv", "csv": {"delimiter": ";"}}),
        );
        assert_eq!(source.records().get("0").unwrap().text("b"), "2");
    }

    #[test]
    fn fetch_failure_degrades_to_empty_with_message() {
        let fetcher = Arc::new(FixedFetcher::failing());
        let deps = deps(fetcher);
        let messenger = deps.messenger.clone();
        let source = CsvSource::new("csv_file", &json!({"uri": "gone.csv"}), deps).unwrap();

        assert!(source.fields().is_empty());
        assert!(source.records().is_empty());
        assert_eq!(messenger.messages().len(), 1);
    }

    #[test]
    fn repeated_reads_fetch_once() {
        let (source, fetcher) = source("a\n1\n", json!({"uri": "data.csv"}));
        source.fields();
        source.records();
        source.records();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cache_expiry_zero_skips_the_store() {
        let body = "a\n1\n";
        let cache = Arc::new(MemoryCache::new());
        let deps = SourceDeps {
            fetcher: Arc::new(FixedFetcher::ok(body)),
            ckan: Arc::new(NoCkan),
            cache: cache.clone(),
            messenger: Messenger::default(),
            global_cache_ttl: Duration::from_secs(3600),
        };
        let source = CsvSource::new(
            "csv_file",
            &json!({"uri": "data.csv", "cache_expiry": "0"}),
            deps,
        )
        .unwrap();
        source.records();
        assert!(cache.is_empty());
    }

    #[test]
    fn second_instance_reads_from_cache() {
        let body = "a\n1\n";
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(FixedFetcher::ok(body));
        let make = |fetcher: Arc<FixedFetcher>| SourceDeps {
            fetcher,
            ckan: Arc::new(NoCkan),
            cache: cache.clone(),
            messenger: Messenger::default(),
            global_cache_ttl: Duration::from_secs(3600),
        };

        let first = CsvSource::new("csv_file", &json!({"uri": "data.csv"}), make(fetcher.clone()))
            .unwrap();
        first.records();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let second =
            CsvSource::new("csv_file", &json!({"uri": "data.csv"}), make(fetcher.clone())).unwrap();
        assert_eq!(second.records().len(), 1);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }
}
