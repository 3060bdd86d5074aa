//! Domain records returned to callers, and the parameters that request them.

use chrono::{SecondsFormat, TimeZone, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::constants::constants;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSearchResult {
  pub video_id: String,
  pub title: String,
  pub description: String,
  pub thumbnail_url: String,
  pub published_at: String,
  pub channel_id: String,
  pub channel_title: String,
  pub channel_link: String,
  pub views: u64,
  pub likes: u64,
  pub channel_subscribers: u64,
  pub channel_video_count: u64,
  pub tags: Vec<String>,
  pub duration_seconds: Option<u64>,
}

impl VideoSearchResult {
  pub fn watch_url(&self) -> String {
    watch_url(&self.video_id)
  }

  /// Views per channel subscriber; infinite when the channel reports no subscribers.
  pub fn engagement_ratio(&self) -> f64 {
    if self.channel_subscribers == 0 {
      f64::INFINITY
    } else {
      self.views as f64 / self.channel_subscribers as f64
    }
  }
}

pub fn watch_url(video_id: &str) -> String {
  format!("https://www.youtube.com/watch?v={video_id}")
}

pub fn channel_link(channel_id: &str) -> String {
  format!("https://www.youtube.com/channel/{channel_id}")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelThumbnails {
  pub default: Option<String>,
  pub medium: Option<String>,
  pub high: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDetail {
  pub channel_id: String,
  pub title: String,
  pub description: String,
  pub custom_url: Option<String>,
  pub subscribers: u64,
  pub video_count: u64,
  pub view_count: u64,
  pub country: Option<String>,
  pub published_at: String,
  pub thumbnails: ChannelThumbnails,
  pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopVideo {
  pub id: String,
  pub title: String,
  pub thumbnail_url: String,
  pub view_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedVideo {
  pub id: String,
  pub title: String,
  pub thumbnail_url: String,
  pub description: String,
  pub view_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInsights {
  pub top_videos: Vec<TopVideo>,
  pub featured_videos: Vec<FeaturedVideo>,
  pub contact_email: Option<String>,
}

/// Channel detail and insights fetched together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOverview {
  pub detail: ChannelDetail,
  pub insights: ChannelInsights,
}

// --- Request parameters ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DurationFilter {
  #[default]
  Any,
  Short,
  Long,
}

impl DurationFilter {
  pub fn as_str(self) -> &'static str {
    match self {
      DurationFilter::Any => "any",
      DurationFilter::Short => "short",
      DurationFilter::Long => "long",
    }
  }

  /// Value for the provider's `videoDuration` parameter. Shorts are never
  /// filtered server-side because the provider does not classify them reliably.
  pub fn provider_param(self) -> Option<&'static str> {
    match self {
      DurationFilter::Any | DurationFilter::Short => None,
      DurationFilter::Long => Some("long"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum RegionCode {
  #[value(name = "us")]
  US,
  #[value(name = "jp")]
  JP,
  #[value(name = "es")]
  ES,
}

impl RegionCode {
  pub fn as_str(self) -> &'static str {
    match self {
      RegionCode::US => "US",
      RegionCode::JP => "JP",
      RegionCode::ES => "ES",
    }
  }
}

#[derive(Debug, Clone)]
pub struct SearchParams {
  pub query: String,
  pub api_key: String,
  pub duration: DurationFilter,
  pub max_results: i64,
  pub year: Option<i32>,
  pub region: Option<RegionCode>,
}

impl SearchParams {
  pub fn new(query: impl Into<String>, api_key: impl Into<String>) -> Self {
    Self {
      query: query.into(),
      api_key: api_key.into(),
      duration: DurationFilter::Any,
      max_results: i64::from(constants().default_result_count),
      year: None,
      region: None,
    }
  }

  /// Requested result count clamped to the provider-friendly range.
  pub fn result_count(&self) -> usize {
    self.max_results.clamp(1, i64::from(constants().max_result_count)) as usize
  }

  /// RFC 3339 bounds (`publishedAfter`, `publishedBefore`) covering the target year in UTC.
  pub fn published_range(&self) -> Option<(String, String)> {
    self.year.and_then(year_range)
  }
}

/// Inclusive UTC range `[Jan 1 00:00:00, Dec 31 23:59:59]` of `year`, millisecond precision.
pub fn year_range(year: i32) -> Option<(String, String)> {
  let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
  let end = Utc.with_ymd_and_hms(year, 12, 31, 23, 59, 59).single()?;
  Some((start.to_rfc3339_opts(SecondsFormat::Millis, true), end.to_rfc3339_opts(SecondsFormat::Millis, true)))
}

/// Clamp a year input to the range searches make sense for.
pub fn clamp_year(year: i32, current_year: i32) -> i32 {
  year.clamp(constants().earliest_search_year, current_year.max(constants().earliest_search_year))
}
