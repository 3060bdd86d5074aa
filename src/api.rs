//! Wire types for the YouTube Data API v3 endpoints the client consumes.
//!
//! The provider omits fields freely (hidden statistics, missing thumbnails,
//! absent branding), so almost everything is optional with a serde default.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
  #[serde(default)]
  pub url: String,
  pub width: Option<u32>,
  pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
  pub default: Option<Thumbnail>,
  pub medium: Option<Thumbnail>,
  pub high: Option<Thumbnail>,
  pub standard: Option<Thumbnail>,
  pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
  /// Candidates from largest to smallest.
  pub fn by_priority(&self) -> [Option<&Thumbnail>; 5] {
    [self.maxres.as_ref(), self.standard.as_ref(), self.high.as_ref(), self.medium.as_ref(), self.default.as_ref()]
  }
}

// --- /search ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
  pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub channel_id: String,
  #[serde(default)]
  pub channel_title: String,
  #[serde(default)]
  pub published_at: String,
  #[serde(default)]
  pub thumbnails: Thumbnails,
  pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
  #[serde(default)]
  pub id: SearchItemId,
  #[serde(default)]
  pub snippet: VideoSnippet,
}

impl SearchItem {
  pub fn video_id(&self) -> Option<&str> {
    self.id.video_id.as_deref().filter(|id| !id.is_empty())
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
  #[serde(default)]
  pub items: Vec<SearchItem>,
  pub next_page_token: Option<String>,
}

// --- /videos ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
  pub view_count: Option<String>,
  pub like_count: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentDetails {
  pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
  pub id: String,
  #[serde(default)]
  pub snippet: VideoSnippet,
  pub statistics: Option<VideoStatistics>,
  pub content_details: Option<ContentDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideosResponse {
  #[serde(default)]
  pub items: Vec<Video>,
}

// --- /channels ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  pub custom_url: Option<String>,
  pub country: Option<String>,
  #[serde(default)]
  pub published_at: String,
  #[serde(default)]
  pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
  pub subscriber_count: Option<String>,
  pub video_count: Option<String>,
  pub view_count: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandingChannel {
  pub description: Option<String>,
  pub keywords: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandingSettings {
  pub channel: Option<BrandingChannel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
  pub id: String,
  #[serde(default)]
  pub snippet: ChannelSnippet,
  pub statistics: Option<ChannelStatistics>,
  pub branding_settings: Option<BrandingSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelsResponse {
  #[serde(default)]
  pub items: Vec<Channel>,
}

// --- Errors ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
  pub message: Option<String>,
}

/// The `{"error": {"message": ...}}` envelope the provider sends on failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
  pub error: Option<ErrorBody>,
}

/// Extract the provider's error message from a raw response body, if any.
pub fn provider_message(body: &str) -> Option<String> {
  serde_json::from_str::<ErrorEnvelope>(body)
    .ok()
    .and_then(|envelope| envelope.error)
    .and_then(|error| error.message)
    .filter(|message| !message.trim().is_empty())
}

/// Parse one of the provider's stringified counters, treating anything missing or malformed as zero.
pub fn parse_count(raw: Option<&str>) -> u64 {
  raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}
