//! In-memory TTL caches for provider responses.
//!
//! Entries are evicted lazily: an expired entry is removed only when it is
//! looked up. There is no capacity bound.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::constants::constants;
use crate::model::{ChannelDetail, ChannelInsights, VideoSearchResult};

/// Key prefixes, one per cached resource.
pub const SEARCH_PREFIX: &str = "search";
pub const CHANNEL_DETAIL_PREFIX: &str = "channel-detail";
pub const CHANNEL_INSIGHTS_PREFIX: &str = "channel-insights";

#[derive(Debug, Clone)]
struct CacheEntry<V> {
  value: V,
  expires_at: Instant,
}

/// A keyed store whose entries stay valid for a fixed TTL after insertion.
#[derive(Debug)]
pub struct TtlCache<V> {
  entries: Mutex<HashMap<String, CacheEntry<V>>>,
  ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
  pub fn new(ttl: Duration) -> Self {
    Self { entries: Mutex::new(HashMap::new()), ttl }
  }

  /// Returns the cached value, or `None` if it is missing or past its expiry.
  pub fn get(&self, key: &str) -> Option<V> {
    let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let entry = entries.get(key)?;
    if Instant::now() > entry.expires_at {
      entries.remove(key);
      return None;
    }
    Some(entry.value.clone())
  }

  /// Stores `value`, replacing any previous entry for `key`.
  pub fn set(&self, key: impl Into<String>, value: V) {
    let entry = CacheEntry { value, expires_at: Instant::now() + self.ttl };
    let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    entries.insert(key.into(), entry);
  }

  /// Number of stored entries, expired ones included.
  pub fn len(&self) -> usize {
    self.entries.lock().map(|e| e.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// The three caches a [`crate::client::YouTubeClient`] consults.
#[derive(Debug)]
pub struct Caches {
  pub search: TtlCache<Vec<VideoSearchResult>>,
  pub channel_detail: TtlCache<ChannelDetail>,
  pub channel_insights: TtlCache<ChannelInsights>,
}

impl Caches {
  pub fn with_ttl(ttl: Duration) -> Self {
    Self { search: TtlCache::new(ttl), channel_detail: TtlCache::new(ttl), channel_insights: TtlCache::new(ttl) }
  }
}

impl Default for Caches {
  fn default() -> Self {
    Self::with_ttl(constants().cache_ttl())
  }
}

/// Build a deterministic cache key: `prefix:{json}` where the JSON object
/// holds only non-null parameters, keys sorted.
pub fn cache_key<'a>(prefix: &str, params: impl IntoIterator<Item = (&'a str, Value)>) -> String {
  let defined: BTreeMap<&str, Value> = params.into_iter().filter(|(_, value)| !value.is_null()).collect();
  // A BTreeMap of JSON values always serializes.
  let payload = serde_json::to_string(&defined).unwrap_or_default();
  format!("{prefix}:{payload}")
}
