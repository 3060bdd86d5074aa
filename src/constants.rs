//! Client constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!`, so nothing is read from disk
//! at runtime. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

/// All tuneable client constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  pub api_base_url: String,
  pub request_timeout_secs: u64,

  // Provider limits
  pub search_page_size: usize,
  pub lookup_batch_size: usize,

  // Search
  pub max_result_count: u32,
  pub default_result_count: u32,
  pub earliest_search_year: i32,

  // Cache
  pub cache_ttl_secs: u64,

  // Channel insights
  pub insights_video_count: usize,
  pub featured_video_count: usize,

  // Shorts heuristic
  pub short_max_duration_secs: u64,
}

impl Constants {
  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn cache_ttl(&self) -> Duration {
    Duration::from_secs(self.cache_ttl_secs)
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; a malformed file fails the first test run.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed client constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
