//! Source adapters for the visualisation pipeline.
//!
//! An adapter turns a raw dataset location (CSV text, JSON document, CKAN
//! datastore) into a [`FieldCatalog`] and a [`RecordSet`]. Fetching is
//! blocking and inline; results are memoized per instance and cached in a
//! shared TTL store. Failures degrade to empty data plus a user message so
//! the pipeline always renders something.

pub mod cache;
pub mod ckan;
pub mod csv_source;
pub mod fetch;
pub mod json_source;
pub mod path;

use std::sync::Arc;
use std::time::Duration;

use viz_core::{FieldCatalog, Messenger, RecordSet};

pub use cache::{cache_key, CacheExpiry, CacheStore, MemoryCache};
pub use ckan::{CkanClient, CkanField, CkanSource, HttpCkanClient, SearchQuery, SearchResult};
pub use csv_source::CsvSource;
pub use fetch::{ContentFetcher, FetchOptions, HttpFetcher};
pub use json_source::JsonSource;

/// Shared services handed to every adapter at construction.
#[derive(Clone)]
pub struct SourceDeps {
    pub fetcher: Arc<dyn ContentFetcher>,
    pub ckan: Arc<dyn CkanClient>,
    pub cache: Arc<dyn CacheStore>,
    pub messenger: Messenger,
    /// Cache lifetime applied when the configuration does not set one.
    pub global_cache_ttl: Duration,
}

/// Contract every source adapter satisfies.
///
/// `fields` and `records` are idempotent: the first call fetches (or reads
/// the cache), later calls reuse the memoized result. `records` is a finite,
/// restartable produce operation, not a stateful cursor — a new adapter
/// instance re-fetches.
pub trait SourceAdapter: Send + Sync {
    fn plugin_id(&self) -> &str;

    /// Discovered field-id to label mapping for the dataset.
    fn fields(&self) -> FieldCatalog;

    /// The full record set. Every record carries a value (possibly empty)
    /// for every catalog field.
    fn records(&self) -> RecordSet;

    /// URL a viewer can use to download the raw dataset, when one exists.
    fn download_url(&self) -> Option<String>;
}
