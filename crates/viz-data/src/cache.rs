//! TTL cache store for fetched dataset artifacts.

use std::fmt;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Key-value store with per-entry expiry. The cache is advisory: concurrent
/// requests for one key may both fetch and both write, last write wins.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, data: Value, ttl: Duration);
}

struct CacheEntry {
    data: Value,
    expires_at: Instant,
}

/// In-memory cache store with lazy expiry.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<AHashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops expired entries. Reads already ignore them; this just frees
    /// memory.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.write().retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        tracing::debug!(target: "viz::cache", key, "cache hit");
        Some(entry.data.clone())
    }

    fn set(&self, key: &str, data: Value, ttl: Duration) {
        let entry = CacheEntry {
            data,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
    }
}

/// Builds a cache key from plugin identity and the normalized resource
/// identifier, with an optional artifact suffix for sources that cache
/// multiple artifacts (e.g. CKAN fields vs records) under different costs.
pub fn cache_key(plugin_id: &str, resource: &str, artifact: Option<&str>) -> String {
    let digest = Sha256::digest(plugin_id.as_bytes());
    let mut key = String::with_capacity(64 + resource.len() + 10);
    for byte in digest {
        key.push_str(&format!("{byte:02x}"));
    }
    key.push(':');
    key.push_str(resource);
    if let Some(artifact) = artifact {
        key.push(':');
        key.push_str(artifact);
    }
    key
}

/// Cache lifetime policy from style configuration.
///
/// A numeric value is a lifetime in seconds, with `0` disabling caching.
/// Anything else (unset, non-numeric) falls back to the global default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CacheExpiry {
    #[default]
    GlobalDefault,
    Seconds(u64),
}

impl CacheExpiry {
    /// Parses a raw configuration value: digits mean seconds, anything else
    /// means the global default.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<u64>() {
            Ok(seconds) => CacheExpiry::Seconds(seconds),
            Err(_) => CacheExpiry::GlobalDefault,
        }
    }

    /// The single precedence point for cache lifetimes: an explicit number of
    /// seconds wins, `0` disables caching, otherwise the global default
    /// applies.
    pub fn resolve(&self, global_default: Duration) -> Option<Duration> {
        match self {
            CacheExpiry::GlobalDefault => Some(global_default),
            CacheExpiry::Seconds(0) => None,
            CacheExpiry::Seconds(seconds) => Some(Duration::from_secs(*seconds)),
        }
    }
}

impl Serialize for CacheExpiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CacheExpiry::GlobalDefault => serializer.serialize_str(""),
            CacheExpiry::Seconds(seconds) => serializer.serialize_str(&seconds.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for CacheExpiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExpiryVisitor;

        impl<'de> Visitor<'de> for ExpiryVisitor {
            type Value = CacheExpiry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number of seconds or a string")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<CacheExpiry, E> {
                Ok(CacheExpiry::Seconds(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<CacheExpiry, E> {
                Ok(if value >= 0 {
                    CacheExpiry::Seconds(value as u64)
                } else {
                    CacheExpiry::GlobalDefault
                })
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<CacheExpiry, E> {
                Ok(CacheExpiry::parse(value))
            }
        }

        deserializer.deserialize_any(ExpiryVisitor)
    }
}
