//! Blocking content fetch boundary.
//!
//! Adapters read dataset bytes through [`ContentFetcher`] so tests can swap
//! in an in-memory implementation. The HTTP implementation resolves local
//! and relative URIs to something fetchable before dispatch and bounds every
//! request with a timeout.

use std::time::Duration;

use viz_core::VizError;

/// Fetches the text content behind a URI.
pub trait ContentFetcher: Send + Sync {
    fn fetch(&self, uri: &str) -> Result<String, VizError>;
}

/// Tuning for outbound fetches.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Hard bound on each request.
    pub timeout: Duration,
    /// Base URL for resolving relative URIs. Without one, relative URIs are
    /// treated as local file paths.
    pub base_url: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            base_url: None,
        }
    }
}

enum ResolvedUri {
    Local(String),
    Remote(String),
}

/// Fetcher backed by a blocking HTTP client. Follows redirects.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    options: FetchOptions,
}

impl HttpFetcher {
    pub fn new(options: FetchOptions) -> Result<Self, VizError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| VizError::Configuration(format!("http client: {e}")))?;
        Ok(Self { client, options })
    }

    fn resolve(&self, uri: &str) -> Result<ResolvedUri, VizError> {
        if let Some(path) = uri.strip_prefix("file://") {
            return Ok(ResolvedUri::Local(path.to_string()));
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return Ok(ResolvedUri::Remote(uri.to_string()));
        }
        // Relative paths resolve against the configured base URL when one is
        // set, otherwise they name a local file.
        if let Some(base) = &self.options.base_url {
            let base = reqwest::Url::parse(base)
                .map_err(|e| VizError::Configuration(format!("base url {base}: {e}")))?;
            let resolved = base
                .join(uri)
                .map_err(|e| VizError::Configuration(format!("uri {uri}: {e}")))?;
            return Ok(ResolvedUri::Remote(resolved.into()));
        }
        Ok(ResolvedUri::Local(uri.to_string()))
    }
}

impl ContentFetcher for HttpFetcher {
    fn fetch(&self, uri: &str) -> Result<String, VizError> {
        match self.resolve(uri)? {
            ResolvedUri::Local(path) => {
                std::fs::read_to_string(&path).map_err(|e| VizError::fetch(path, e))
            }
            ResolvedUri::Remote(url) => {
                tracing::debug!(target: "viz::fetch", %url, "fetching remote content");
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| VizError::fetch(&url, e))?;
                response.text().map_err(|e| VizError::fetch(&url, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_uri_forms() {
        let fetcher = HttpFetcher::new(FetchOptions {
            base_url: Some("https://example.org/site/".into()),
            ..FetchOptions::default()
        })
        .unwrap();

        assert!(matches!(
            fetcher.resolve("https://example.org/a.csv").unwrap(),
            ResolvedUri::Remote(u) if u == "https://example.org/a.csv"
        ));
        assert!(matches!(
            fetcher.resolve("file:///tmp/a.csv").unwrap(),
            ResolvedUri::Local(p) if p == "/tmp/a.csv"
        ));
        assert!(matches!(
            fetcher.resolve("datasets/a.csv").unwrap(),
            ResolvedUri::Remote(u) if u == "https://example.org/site/datasets/a.csv"
        ));
    }

    #[test]
    fn relative_uri_without_base_is_local() {
        let fetcher = HttpFetcher::new(FetchOptions::default()).unwrap();
        assert!(matches!(
            fetcher.resolve("data/local.csv").unwrap(),
            ResolvedUri::Local(p) if p == "data/local.csv"
        ));
    }

    #[test]
    fn local_fetch_reads_file() {
        let dir = std::env::temp_dir().join("viz-fetch-test");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("sample.csv");
        std::fs::write(&file, "a,b\n1,2\n").unwrap();

        let fetcher = HttpFetcher::new(FetchOptions::default()).unwrap();
        let content = fetcher.fetch(file.to_str().unwrap()).unwrap();
        assert_eq!(content, "a,b\n1,2\n");
    }
}
