//! Request orchestration against the YouTube Data API.
//!
//! Every public operation validates its input, consults its cache, and on a
//! miss issues the provider calls it needs. Any failure discards whatever was
//! fetched so far and surfaces one translated [`ApiError`].

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{Channel, ChannelsResponse, SearchItem, SearchResponse, Video, VideosResponse, parse_count};
use crate::cache::{CHANNEL_DETAIL_PREFIX, CHANNEL_INSIGHTS_PREFIX, Caches, SEARCH_PREFIX, cache_key};
use crate::constants::constants;
use crate::error::{ApiError, Result, translate};
use crate::media::{first_email, is_vertical_short, parse_iso_duration, resolve_thumbnail_url, thumbnail_dimensions};
use crate::model::{
  ChannelDetail, ChannelInsights, ChannelOverview, ChannelThumbnails, DurationFilter, FeaturedVideo, SearchParams,
  TopVideo, VideoSearchResult, channel_link,
};
use crate::transport::{HttpTransport, Query, Transport, TransportError, get_json};

const QUERY_REQUIRED: &str = "Enter a search term.";
const API_KEY_REQUIRED: &str = "Enter your YouTube API key.";
const CHANNEL_ID_REQUIRED: &str = "A channel id is required.";
const CHANNEL_KEY_REQUIRED: &str = "An API key is required to view channel information.";
const CHANNEL_NOT_FOUND: &str = "Channel information could not be found.";

const SEARCH_FALLBACK: &str = "Something went wrong while searching videos. Please try again shortly.";
const CHANNEL_DETAIL_FALLBACK: &str = "Something went wrong while loading channel information.";
const CHANNEL_INSIGHTS_FALLBACK: &str = "Something went wrong while analysing channel data.";

const SEARCH_VIDEO_PARTS: &str = "snippet,statistics,contentDetails";
const INSIGHTS_VIDEO_PARTS: &str = "snippet,statistics";
const CHANNEL_PARTS: &str = "snippet,statistics,brandingSettings";

pub struct YouTubeClient<T = HttpTransport> {
  transport: T,
  caches: Arc<Caches>,
}

impl YouTubeClient<HttpTransport> {
  /// Client against the public API with fresh default caches.
  pub fn http() -> std::result::Result<Self, TransportError> {
    Ok(Self::new(HttpTransport::new()?))
  }
}

impl<T: Transport> YouTubeClient<T> {
  pub fn new(transport: T) -> Self {
    Self::with_caches(transport, Arc::new(Caches::default()))
  }

  /// Share `caches` with other clients, e.g. one set per process.
  pub fn with_caches(transport: T, caches: Arc<Caches>) -> Self {
    Self { transport, caches }
  }

  pub fn caches(&self) -> &Arc<Caches> {
    &self.caches
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  // --- Search ---

  /// Search videos, merge in video and channel statistics, and apply the
  /// client-side Shorts filter when `params.duration` is `Short`.
  pub async fn search_videos(&self, params: &SearchParams) -> Result<Vec<VideoSearchResult>> {
    let query = params.query.trim();
    if query.is_empty() {
      return Err(ApiError::validation(QUERY_REQUIRED));
    }
    let api_key = require(&params.api_key, API_KEY_REQUIRED)?;

    let count = params.result_count();
    let range = params.published_range();
    let key = cache_key(
      SEARCH_PREFIX,
      [
        ("query", json!(query)),
        ("duration", json!(params.duration.as_str())),
        ("maxResults", json!(count)),
        ("publishedAfter", json!(range.as_ref().map(|r| &r.0))),
        ("publishedBefore", json!(range.as_ref().map(|r| &r.1))),
        ("regionCode", json!(params.region.map(|r| r.as_str()))),
      ],
    );

    if let Some(hit) = self.caches.search.get(&key) {
      info!(query, results = hit.len(), "search: cache hit");
      return Ok(hit);
    }

    let request = SearchRequest { api_key, query, count, range: range.as_ref(), params };
    match self.run_search(&request).await.map_err(|e| translate(e, SEARCH_FALLBACK))? {
      Some(results) => {
        info!(query, results = results.len(), "search: fetched");
        self.caches.search.set(key, results.clone());
        Ok(results)
      }
      None => {
        info!(query, "search: no hits");
        Ok(Vec::new())
      }
    }
  }

  /// `None` when the provider returned no usable hits at all.
  async fn run_search(&self, request: &SearchRequest<'_>) -> std::result::Result<Option<Vec<VideoSearchResult>>, TransportError> {
    let items = self.paginate_search(request).await?;

    let video_ids: Vec<String> = items.iter().filter_map(|item| item.video_id().map(str::to_string)).collect();
    if video_ids.is_empty() {
      return Ok(None);
    }

    let videos: HashMap<String, Video> = self
      .batched_lookup::<VideosResponse>("/videos", request.api_key, &video_ids, SEARCH_VIDEO_PARTS)
      .await?
      .into_iter()
      .flat_map(|response| response.items)
      .map(|video| (video.id.clone(), video))
      .collect();

    let mut seen = HashSet::new();
    let channel_ids: Vec<String> = video_ids
      .iter()
      .filter_map(|id| videos.get(id))
      .map(|video| video.snippet.channel_id.clone())
      .filter(|id| !id.is_empty() && seen.insert(id.clone()))
      .collect();

    let channels: HashMap<String, Channel> = if channel_ids.is_empty() {
      HashMap::new()
    } else {
      self
        .batched_lookup::<ChannelsResponse>("/channels", request.api_key, &channel_ids, CHANNEL_PARTS)
        .await?
        .into_iter()
        .flat_map(|response| response.items)
        .map(|channel| (channel.id.clone(), channel))
        .collect()
    };

    let shorts_only = request.params.duration == DurationFilter::Short;
    let results =
      items.iter().filter_map(|item| merge_search_item(item, &videos, &channels, shorts_only)).collect::<Vec<_>>();
    Ok(Some(results))
  }

  /// Follow `nextPageToken` until `count` items are collected or pages run out.
  async fn paginate_search(&self, request: &SearchRequest<'_>) -> std::result::Result<Vec<SearchItem>, TransportError> {
    let page_size = constants().search_page_size;
    let mut items: Vec<SearchItem> = Vec::with_capacity(request.count);
    let mut page_token: Option<String> = None;

    while items.len() < request.count {
      let wanted = (request.count - items.len()).min(page_size);
      let mut query: Query = vec![
        ("key", request.api_key.to_string()),
        ("q", request.query.to_string()),
        ("part", "snippet".into()),
        ("type", "video".into()),
        ("maxResults", wanted.to_string()),
      ];
      if let Some(duration) = request.params.duration.provider_param() {
        query.push(("videoDuration", duration.into()));
      }
      if let Some(token) = &page_token {
        query.push(("pageToken", token.clone()));
      }
      if let Some((after, before)) = request.range {
        query.push(("publishedAfter", after.clone()));
        query.push(("publishedBefore", before.clone()));
      }
      if let Some(region) = request.params.region {
        query.push(("regionCode", region.as_str().into()));
      }

      let page: SearchResponse = get_json(&self.transport, "/search", &query).await?;
      let received = page.items.len();
      debug!(wanted, received, "search: page fetched");
      items.extend(page.items);

      match page.next_page_token {
        Some(token) if received > 0 && !token.is_empty() => page_token = Some(token),
        _ => break,
      }
    }

    items.truncate(request.count);
    Ok(items)
  }

  /// Look up `ids` in batches the provider accepts, concurrently. The first
  /// failing batch fails the whole lookup.
  async fn batched_lookup<R: DeserializeOwned>(
    &self,
    path: &str,
    api_key: &str,
    ids: &[String],
    part: &str,
  ) -> std::result::Result<Vec<R>, TransportError> {
    let queries: Vec<Query> = ids
      .chunks(constants().lookup_batch_size)
      .map(|chunk| vec![("key", api_key.to_string()), ("id", chunk.join(",")), ("part", part.to_string())])
      .collect();
    debug!(path, ids = ids.len(), batches = queries.len(), "lookup: dispatching batches");
    try_join_all(queries.iter().map(|query| get_json(&self.transport, path, query))).await
  }

  // --- Channels ---

  pub async fn fetch_channel_detail(&self, channel_id: &str, api_key: &str) -> Result<ChannelDetail> {
    let api_key = require(api_key, API_KEY_REQUIRED)?;
    let channel_id = require(channel_id, CHANNEL_ID_REQUIRED)?;

    let key = cache_key(CHANNEL_DETAIL_PREFIX, [("channelId", json!(channel_id))]);
    if let Some(hit) = self.caches.channel_detail.get(&key) {
      info!(channel_id, "channel detail: cache hit");
      return Ok(hit);
    }

    let query: Query = vec![("key", api_key.to_string()), ("id", channel_id.to_string()), ("part", CHANNEL_PARTS.into())];
    let response: ChannelsResponse =
      get_json(&self.transport, "/channels", &query).await.map_err(|e| translate(e, CHANNEL_DETAIL_FALLBACK))?;

    let Some(channel) = response.items.into_iter().next() else {
      return Err(ApiError::NotFound(CHANNEL_NOT_FOUND.to_string()));
    };

    let detail = channel_detail(channel);
    info!(channel_id, has_email = detail.email.is_some(), "channel detail: fetched");
    self.caches.channel_detail.set(key, detail.clone());
    Ok(detail)
  }

  /// The channel's most-viewed videos, a featured subset, and any contact
  /// email found in their descriptions.
  pub async fn fetch_channel_insights(&self, channel_id: &str, api_key: &str) -> Result<ChannelInsights> {
    let api_key = require(api_key, API_KEY_REQUIRED)?;
    let channel_id = require(channel_id, CHANNEL_ID_REQUIRED)?;

    let key = cache_key(CHANNEL_INSIGHTS_PREFIX, [("channelId", json!(channel_id))]);
    if let Some(hit) = self.caches.channel_insights.get(&key) {
      info!(channel_id, "channel insights: cache hit");
      return Ok(hit);
    }

    let insights = self
      .run_channel_insights(channel_id, api_key)
      .await
      .map_err(|e| translate(e, CHANNEL_INSIGHTS_FALLBACK))?;

    match insights {
      Some(insights) => {
        info!(channel_id, top = insights.top_videos.len(), "channel insights: fetched");
        self.caches.channel_insights.set(key, insights.clone());
        Ok(insights)
      }
      None => {
        info!(channel_id, "channel insights: channel has no videos");
        Ok(ChannelInsights::default())
      }
    }
  }

  async fn run_channel_insights(
    &self,
    channel_id: &str,
    api_key: &str,
  ) -> std::result::Result<Option<ChannelInsights>, TransportError> {
    let c = constants();
    let query: Query = vec![
      ("key", api_key.to_string()),
      ("channelId", channel_id.to_string()),
      ("part", "snippet".into()),
      ("order", "viewCount".into()),
      ("maxResults", c.insights_video_count.to_string()),
      ("type", "video".into()),
    ];
    let search: SearchResponse = get_json(&self.transport, "/search", &query).await?;

    let ranked: Vec<(&str, &SearchItem)> =
      search.items.iter().filter_map(|item| item.video_id().map(|id| (id, item))).collect();
    if ranked.is_empty() {
      return Ok(None);
    }

    let ids = ranked.iter().map(|(id, _)| *id).collect::<Vec<_>>().join(",");
    let query: Query = vec![("key", api_key.to_string()), ("id", ids), ("part", INSIGHTS_VIDEO_PARTS.into())];
    let videos: VideosResponse = get_json(&self.transport, "/videos", &query).await?;
    let details: HashMap<&str, &Video> = videos.items.iter().map(|video| (video.id.as_str(), video)).collect();

    let top_videos: Vec<TopVideo> = ranked
      .iter()
      .map(|(id, item)| {
        let detail = details.get(id).copied();
        TopVideo {
          id: id.to_string(),
          title: item.snippet.title.clone(),
          thumbnail_url: resolve_thumbnail_url(&[detail.map(|d| &d.snippet.thumbnails), Some(&item.snippet.thumbnails)]),
          view_count: parse_count(detail.and_then(|d| d.statistics.as_ref()).and_then(|s| s.view_count.as_deref())),
        }
      })
      .collect();

    let featured_videos = top_videos
      .iter()
      .take(c.featured_video_count)
      .map(|video| FeaturedVideo {
        id: video.id.clone(),
        title: video.title.clone(),
        thumbnail_url: video.thumbnail_url.clone(),
        description: details.get(video.id.as_str()).map(|d| d.snippet.description.clone()).unwrap_or_default(),
        view_count: video.view_count,
      })
      .collect();

    let contact_email = ranked.iter().find_map(|(id, item)| {
      let full = details.get(id).map(|d| d.snippet.description.as_str());
      first_email([full, Some(item.snippet.description.as_str())])
    });

    Ok(Some(ChannelInsights { top_videos, featured_videos, contact_email }))
  }

  /// Fetch channel detail and insights concurrently.
  pub async fn open_channel(&self, channel_id: &str, api_key: &str) -> Result<ChannelOverview> {
    require(api_key, CHANNEL_KEY_REQUIRED)?;
    let (detail, insights) =
      futures::try_join!(self.fetch_channel_detail(channel_id, api_key), self.fetch_channel_insights(channel_id, api_key))?;
    Ok(ChannelOverview { detail, insights })
  }
}

// --- Helpers ---

struct SearchRequest<'a> {
  api_key: &'a str,
  query: &'a str,
  count: usize,
  range: Option<&'a (String, String)>,
  params: &'a SearchParams,
}

fn require<'a>(value: &'a str, message: &str) -> Result<&'a str> {
  let trimmed = value.trim();
  if trimmed.is_empty() { Err(ApiError::validation(message)) } else { Ok(trimmed) }
}

/// Join one search hit with its video detail and channel statistics. `None`
/// when the provider returned no detail for it, or when it fails the Shorts filter.
fn merge_search_item(
  item: &SearchItem,
  videos: &HashMap<String, Video>,
  channels: &HashMap<String, Channel>,
  shorts_only: bool,
) -> Option<VideoSearchResult> {
  let video_id = item.video_id()?;
  let Some(video) = videos.get(video_id) else {
    warn!(video_id, "search: no detail returned, skipping");
    return None;
  };

  let channel_stats = channels.get(&video.snippet.channel_id).and_then(|c| c.statistics.as_ref());
  let video_stats = video.statistics.as_ref();
  let duration_seconds = video.content_details.as_ref().and_then(|d| d.duration.as_deref()).and_then(parse_iso_duration);

  if shorts_only {
    let combined_tags: Vec<String> =
      video.snippet.tags.iter().flatten().chain(item.snippet.tags.iter().flatten()).cloned().collect();
    if !is_vertical_short(duration_seconds, thumbnail_dimensions(&video.snippet.thumbnails), &combined_tags) {
      return None;
    }
  }

  Some(VideoSearchResult {
    video_id: video.id.clone(),
    title: video.snippet.title.clone(),
    description: video.snippet.description.clone(),
    thumbnail_url: resolve_thumbnail_url(&[Some(&video.snippet.thumbnails), Some(&item.snippet.thumbnails)]),
    published_at: video.snippet.published_at.clone(),
    channel_id: video.snippet.channel_id.clone(),
    channel_title: video.snippet.channel_title.clone(),
    channel_link: channel_link(&video.snippet.channel_id),
    views: parse_count(video_stats.and_then(|s| s.view_count.as_deref())),
    likes: parse_count(video_stats.and_then(|s| s.like_count.as_deref())),
    channel_subscribers: parse_count(channel_stats.and_then(|s| s.subscriber_count.as_deref())),
    channel_video_count: parse_count(channel_stats.and_then(|s| s.video_count.as_deref())),
    tags: video.snippet.tags.clone().or_else(|| item.snippet.tags.clone()).unwrap_or_default(),
    duration_seconds,
  })
}

fn channel_detail(channel: Channel) -> ChannelDetail {
  let branding = channel.branding_settings.as_ref().and_then(|b| b.channel.as_ref());
  let email = first_email([
    Some(channel.snippet.description.as_str()),
    branding.and_then(|b| b.description.as_deref()),
    branding.and_then(|b| b.keywords.as_deref()),
  ]);
  let stats = channel.statistics.as_ref();
  let thumbs = &channel.snippet.thumbnails;
  let url = |t: &Option<crate::api::Thumbnail>| t.as_ref().map(|t| t.url.clone()).filter(|u| !u.is_empty());

  ChannelDetail {
    subscribers: parse_count(stats.and_then(|s| s.subscriber_count.as_deref())),
    video_count: parse_count(stats.and_then(|s| s.video_count.as_deref())),
    view_count: parse_count(stats.and_then(|s| s.view_count.as_deref())),
    thumbnails: ChannelThumbnails { default: url(&thumbs.default), medium: url(&thumbs.medium), high: url(&thumbs.high) },
    email,
    channel_id: channel.id,
    title: channel.snippet.title,
    description: channel.snippet.description,
    custom_url: channel.snippet.custom_url,
    country: channel.snippet.country,
    published_at: channel.snippet.published_at,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::CredentialIssue;
  use crate::model::RegionCode;
  use async_trait::async_trait;
  use serde_json::Value;
  use std::sync::Mutex;

  // --- Fake provider ---

  type Handler = Box<dyn Fn(&str, &Query) -> std::result::Result<String, TransportError> + Send + Sync>;

  struct FakeTransport {
    handler: Handler,
    calls: Mutex<Vec<(String, Query)>>,
  }

  impl FakeTransport {
    fn new(handler: impl Fn(&str, &Query) -> std::result::Result<String, TransportError> + Send + Sync + 'static) -> Self {
      Self { handler: Box::new(handler), calls: Mutex::new(Vec::new()) }
    }

    fn calls_to(&self, path: &str) -> Vec<Query> {
      self.calls.lock().unwrap().iter().filter(|(p, _)| p == path).map(|(_, q)| q.clone()).collect()
    }

    fn call_count(&self) -> usize {
      self.calls.lock().unwrap().len()
    }
  }

  #[async_trait]
  impl Transport for FakeTransport {
    async fn get(&self, path: &str, query: &Query) -> std::result::Result<String, TransportError> {
      self.calls.lock().unwrap().push((path.to_string(), query.clone()));
      (self.handler)(path, query)
    }
  }

  fn param<'a>(query: &'a Query, name: &str) -> Option<&'a str> {
    query.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
  }

  fn client(handler: impl Fn(&str, &Query) -> std::result::Result<String, TransportError> + Send + Sync + 'static) -> YouTubeClient<FakeTransport> {
    YouTubeClient::new(FakeTransport::new(handler))
  }

  fn search_item(id: &str) -> Value {
    json!({
      "id": { "kind": "youtube#video", "videoId": id },
      "snippet": {
        "title": format!("search title {id}"),
        "description": "",
        "channelId": "",
        "channelTitle": "",
        "publishedAt": "2023-05-01T00:00:00Z",
        "thumbnails": { "default": { "url": format!("https://i.ytimg.com/vi/{id}/default.jpg"), "width": 120, "height": 90 } }
      }
    })
  }

  fn search_page(items: Vec<Value>, next: Option<&str>) -> String {
    let mut page = json!({ "items": items });
    if let Some(token) = next {
      page["nextPageToken"] = json!(token);
    }
    page.to_string()
  }

  fn video(id: &str, channel: &str) -> Value {
    json!({
      "id": id,
      "snippet": {
        "title": format!("title {id}"),
        "description": format!("description {id}"),
        "channelId": channel,
        "channelTitle": format!("channel {channel}"),
        "publishedAt": "2023-05-01T00:00:00Z",
        "thumbnails": { "high": { "url": format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"), "width": 480, "height": 360 } },
        "tags": ["music"]
      },
      "statistics": { "viewCount": "1000", "likeCount": "10" },
      "contentDetails": { "duration": "PT4M13S" }
    })
  }

  fn channel(id: &str, subscribers: &str) -> Value {
    json!({
      "id": id,
      "snippet": { "title": format!("channel {id}"), "description": "", "publishedAt": "2015-01-01T00:00:00Z", "thumbnails": {} },
      "statistics": { "subscriberCount": subscribers, "videoCount": "42", "viewCount": "99999" }
    })
  }

  fn items(values: Vec<Value>) -> String {
    json!({ "items": values }).to_string()
  }

  /// Serves `maxResults` sequential ids per page forever, and echoes every id
  /// it is asked about on `/videos` and `/channels`.
  fn endless_provider(path: &str, query: &Query) -> std::result::Result<String, TransportError> {
    match path {
      "/search" => {
        let wanted: usize = param(query, "maxResults").unwrap().parse().unwrap();
        let offset: usize = param(query, "pageToken").map(|t| t.parse().unwrap()).unwrap_or(0);
        let page = (offset..offset + wanted).map(|i| search_item(&format!("v{i}"))).collect();
        Ok(search_page(page, Some(&(offset + wanted).to_string())))
      }
      "/videos" => {
        let ids = param(query, "id").unwrap().split(',');
        Ok(items(ids.map(|id| video(id, &format!("c{}", id.len()))).collect()))
      }
      "/channels" => {
        let ids = param(query, "id").unwrap().split(',');
        Ok(items(ids.map(|id| channel(id, "500")).collect()))
      }
      other => panic!("unexpected path {other}"),
    }
  }

  fn provider_error(status: u16, message: &str) -> TransportError {
    TransportError::Status { status, body: json!({ "error": { "code": status, "message": message } }).to_string() }
  }

  // --- Validation ---

  #[tokio::test]
  async fn search_requires_query_and_key() {
    let client = client(endless_provider);

    let err = client.search_videos(&SearchParams::new("   ", "key")).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let err = client.search_videos(&SearchParams::new("cats", " \t")).await.unwrap_err();
    assert_eq!(err, ApiError::Validation(API_KEY_REQUIRED.to_string()));

    assert_eq!(client.transport().call_count(), 0);
  }

  // --- Pagination ---

  #[tokio::test]
  async fn result_count_is_clamped_to_two_full_pages() {
    let client = client(endless_provider);
    let mut params = SearchParams::new("test", "valid-key");
    params.max_results = 120;

    let results = client.search_videos(&params).await.unwrap();
    assert_eq!(results.len(), 100);

    let searches = client.transport().calls_to("/search");
    assert_eq!(searches.len(), 2);
    assert!(searches.iter().all(|q| param(q, "maxResults") == Some("50")));
    assert_eq!(param(&searches[0], "pageToken"), None);
    assert_eq!(param(&searches[1], "pageToken"), Some("50"));

    let lookups = client.transport().calls_to("/videos");
    assert_eq!(lookups.len(), 2);
    assert!(lookups.iter().all(|q| param(q, "id").unwrap().split(',').count() == 50));
    assert_eq!(param(&lookups[0], "part"), Some(SEARCH_VIDEO_PARTS));
  }

  #[tokio::test]
  async fn pagination_stops_without_next_token() {
    let client = client(|path, query| match path {
      "/search" => Ok(search_page((0..7).map(|i| search_item(&format!("v{i}"))).collect(), None)),
      _ => endless_provider(path, query),
    });

    let results = client.search_videos(&SearchParams::new("cats", "key")).await.unwrap();
    assert_eq!(results.len(), 7);
    assert_eq!(client.transport().calls_to("/search").len(), 1);
  }

  #[tokio::test]
  async fn odd_count_requests_only_the_remainder() {
    let client = client(endless_provider);
    let mut params = SearchParams::new("cats", "key");
    params.max_results = 73;

    let results = client.search_videos(&params).await.unwrap();
    assert_eq!(results.len(), 73);
    let searches = client.transport().calls_to("/search");
    assert_eq!(param(&searches[0], "maxResults"), Some("50"));
    assert_eq!(param(&searches[1], "maxResults"), Some("23"));
  }

  #[tokio::test]
  async fn zero_hits_skip_lookups() {
    let client = client(|path, _| match path {
      "/search" => Ok(search_page(Vec::new(), None)),
      other => panic!("unexpected call to {other}"),
    });

    let results = client.search_videos(&SearchParams::new("nothing", "key")).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(client.transport().call_count(), 1);
    assert!(client.caches().search.is_empty());
  }

  // --- Request parameters ---

  #[tokio::test]
  async fn year_and_region_are_forwarded() {
    let client = client(endless_provider);
    let mut params = SearchParams::new("test", "valid-key");
    params.year = Some(2023);
    params.region = Some(RegionCode::JP);
    params.max_results = 5;

    client.search_videos(&params).await.unwrap();
    let search = &client.transport().calls_to("/search")[0];
    assert_eq!(param(search, "publishedAfter"), Some("2023-01-01T00:00:00.000Z"));
    assert_eq!(param(search, "publishedBefore"), Some("2023-12-31T23:59:59.000Z"));
    assert_eq!(param(search, "regionCode"), Some("JP"));
    assert_eq!(param(search, "key"), Some("valid-key"));
    assert_eq!(param(search, "type"), Some("video"));
  }

  #[tokio::test]
  async fn long_filter_is_sent_to_provider_but_short_is_not() {
    let client = client(endless_provider);
    let mut params = SearchParams::new("test", "key");
    params.max_results = 3;

    params.duration = DurationFilter::Long;
    client.search_videos(&params).await.unwrap();
    params.duration = DurationFilter::Short;
    client.search_videos(&params).await.unwrap();

    let searches = client.transport().calls_to("/search");
    assert_eq!(param(&searches[0], "videoDuration"), Some("long"));
    assert_eq!(param(&searches[1], "videoDuration"), None);
  }

  // --- Merging ---

  #[tokio::test]
  async fn merge_skips_missing_details_and_defaults_channel_stats() {
    let client = client(|path, _| match path {
      "/search" => {
        let mut with_tags = search_item("b");
        with_tags["snippet"]["tags"] = json!(["from-search"]);
        Ok(search_page(vec![search_item("a"), with_tags, search_item("ghost")], None))
      }
      "/videos" => {
        let a = video("a", "known");
        let mut b = video("b", "hidden");
        b["snippet"]["thumbnails"] = json!({});
        b["snippet"].as_object_mut().unwrap().remove("tags");
        b.as_object_mut().unwrap().remove("statistics");
        Ok(items(vec![a, b]))
      }
      "/channels" => Ok(items(vec![channel("known", "2500")])),
      other => panic!("unexpected path {other}"),
    });

    let results = client.search_videos(&SearchParams::new("q", "key")).await.unwrap();
    assert_eq!(results.len(), 2);

    let a = &results[0];
    assert_eq!(a.video_id, "a");
    assert_eq!(a.views, 1000);
    assert_eq!(a.likes, 10);
    assert_eq!(a.channel_subscribers, 2500);
    assert_eq!(a.channel_video_count, 42);
    assert_eq!(a.thumbnail_url, "https://i.ytimg.com/vi/a/hqdefault.jpg");
    assert_eq!(a.channel_link, "https://www.youtube.com/channel/known");
    assert_eq!(a.duration_seconds, Some(253));
    assert_eq!(a.tags, vec!["music".to_string()]);

    let b = &results[1];
    assert_eq!(b.views, 0);
    assert_eq!(b.channel_subscribers, 0);
    assert_eq!(b.thumbnail_url, "https://i.ytimg.com/vi/b/default.jpg");
    assert_eq!(b.tags, vec!["from-search".to_string()]);
  }

  #[tokio::test]
  async fn channel_lookup_uses_distinct_ids() {
    let client = client(|path, query| match path {
      "/search" => Ok(search_page(vec![search_item("a"), search_item("b"), search_item("c")], None)),
      "/videos" => Ok(items(vec![video("a", "one"), video("b", "two"), video("c", "one")])),
      _ => endless_provider(path, query),
    });

    client.search_videos(&SearchParams::new("q", "key")).await.unwrap();
    let lookups = client.transport().calls_to("/channels");
    assert_eq!(lookups.len(), 1);
    assert_eq!(param(&lookups[0], "id"), Some("one,two"));
    assert_eq!(param(&lookups[0], "part"), Some(CHANNEL_PARTS));
  }

  #[tokio::test]
  async fn short_filter_applies_heuristic() {
    let client = client(|path, query| match path {
      "/search" => {
        let mut tagged = search_item("tagged");
        tagged["snippet"]["tags"] = json!(["Shorts"]);
        Ok(search_page(vec![search_item("portrait"), search_item("long"), search_item("landscape"), tagged], None))
      }
      "/videos" => {
        let mut portrait = video("portrait", "c");
        portrait["snippet"]["thumbnails"] = json!({ "maxres": { "url": "p", "width": 720, "height": 1280 } });
        portrait["contentDetails"]["duration"] = json!("PT30S");
        let mut long = video("long", "c");
        long["snippet"]["thumbnails"] = json!({ "maxres": { "url": "l", "width": 720, "height": 1280 } });
        long["contentDetails"]["duration"] = json!("PT15M");
        let mut landscape = video("landscape", "c");
        landscape["contentDetails"]["duration"] = json!("PT45S");
        let mut tagged = video("tagged", "c");
        tagged["contentDetails"]["duration"] = json!("PT50S");
        Ok(items(vec![portrait, long, landscape, tagged]))
      }
      _ => endless_provider(path, query),
    });

    let mut params = SearchParams::new("q", "key");
    params.duration = DurationFilter::Short;
    let results = client.search_videos(&params).await.unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.video_id.as_str()).collect();
    assert_eq!(ids, vec!["portrait", "tagged"]);
  }

  // --- Caching & failures ---

  #[tokio::test]
  async fn repeated_search_is_served_from_cache() {
    let client = client(endless_provider);
    let mut params = SearchParams::new("cats", "key");
    params.max_results = 10;

    let first = client.search_videos(&params).await.unwrap();
    let calls = client.transport().call_count();
    let second = client.search_videos(&params).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(client.transport().call_count(), calls);
  }

  #[tokio::test]
  async fn failing_batch_fails_whole_search_and_caches_nothing() {
    let client = client(|path, query| match path {
      "/videos" if param(query, "id").unwrap().starts_with("v50") => Err(provider_error(500, "backend error")),
      _ => endless_provider(path, query),
    });
    let mut params = SearchParams::new("cats", "key");
    params.max_results = 60;

    let err = client.search_videos(&params).await.unwrap_err();
    assert_eq!(err, ApiError::Provider { status: 500, message: "backend error".into() });
    assert!(client.caches().search.is_empty());
    assert!(client.transport().calls_to("/channels").is_empty());
  }

  #[tokio::test]
  async fn quota_error_surfaces_provider_message() {
    let client = client(|_, _| Err(provider_error(403, "quota exceeded")));
    let err = client.search_videos(&SearchParams::new("cats", "key")).await.unwrap_err();
    assert_eq!(err.to_string(), "quota exceeded");
    assert!(matches!(err, ApiError::Credential { issue: CredentialIssue::QuotaOrPermission, .. }));
  }

  #[tokio::test]
  async fn unknown_failure_uses_search_fallback() {
    let client = client(|_, _| Err(TransportError::Status { status: 502, body: "<html/>".into() }));
    let err = client.search_videos(&SearchParams::new("cats", "key")).await.unwrap_err();
    assert_eq!(err, ApiError::Unknown(SEARCH_FALLBACK.to_string()));
  }

  // --- Channel detail ---

  #[tokio::test]
  async fn channel_detail_extracts_email_from_branding() {
    let client = client(|path, query| {
      assert_eq!(path, "/channels");
      assert_eq!(param(query, "id"), Some("UC1"));
      let mut c = channel("UC1", "123");
      c["snippet"]["customUrl"] = json!("@one");
      c["snippet"]["country"] = json!("US");
      c["snippet"]["thumbnails"] = json!({ "default": { "url": "d" }, "high": { "url": "h" } });
      c["brandingSettings"] = json!({ "channel": { "description": "no mail here", "keywords": "collab biz@one.tv" } });
      Ok(items(vec![c]))
    });

    let detail = client.fetch_channel_detail("UC1", "key").await.unwrap();
    assert_eq!(detail.email.as_deref(), Some("biz@one.tv"));
    assert_eq!(detail.subscribers, 123);
    assert_eq!(detail.video_count, 42);
    assert_eq!(detail.view_count, 99999);
    assert_eq!(detail.custom_url.as_deref(), Some("@one"));
    assert_eq!(detail.thumbnails, ChannelThumbnails { default: Some("d".into()), medium: None, high: Some("h".into()) });

    client.fetch_channel_detail("UC1", "key").await.unwrap();
    assert_eq!(client.transport().call_count(), 1);
  }

  #[tokio::test]
  async fn channel_detail_missing_channel_is_not_found() {
    let client = client(|_, _| Ok(items(Vec::new())));
    let err = client.fetch_channel_detail("UCgone", "key").await.unwrap_err();
    assert_eq!(err, ApiError::NotFound(CHANNEL_NOT_FOUND.to_string()));
  }

  #[tokio::test]
  async fn channel_detail_requires_key() {
    let client = client(|_, _| panic!("no call expected"));
    let err = client.fetch_channel_detail("UC1", "").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
  }

  // --- Channel insights ---

  fn insights_provider(path: &str, query: &Query) -> std::result::Result<String, TransportError> {
    match path {
      "/search" => {
        assert_eq!(param(query, "order"), Some("viewCount"));
        assert_eq!(param(query, "maxResults"), Some("5"));
        let ranked = ["v1", "v2", "v3", "v4"].iter().map(|id| search_item(id)).collect();
        Ok(search_page(ranked, None))
      }
      "/videos" => {
        assert_eq!(param(query, "id"), Some("v1,v2,v3,v4"));
        assert_eq!(param(query, "part"), Some(INSIGHTS_VIDEO_PARTS));
        let mut v2 = video("v2", "UC1");
        v2["snippet"]["description"] = json!("Contact: hello@creator.com");
        v2["statistics"]["viewCount"] = json!("800");
        let mut v4 = video("v4", "UC1");
        v4["snippet"]["description"] = json!("other@creator.com");
        // v3 deliberately missing from the detail response
        Ok(items(vec![v4, video("v1", "UC1"), v2]))
      }
      other => panic!("unexpected path {other}"),
    }
  }

  #[tokio::test]
  async fn insights_preserve_ranking_and_feature_top_three() {
    let client = client(insights_provider);
    let insights = client.fetch_channel_insights("UC1", "key").await.unwrap();

    let ids: Vec<&str> = insights.top_videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2", "v3", "v4"]);
    assert_eq!(insights.top_videos[1].view_count, 800);
    assert_eq!(insights.top_videos[2].view_count, 0);
    assert_eq!(insights.top_videos[2].thumbnail_url, "https://i.ytimg.com/vi/v3/default.jpg");
    assert_eq!(insights.top_videos[0].title, "search title v1");

    assert_eq!(insights.featured_videos.len(), 3);
    assert_eq!(insights.featured_videos[0].description, "description v1");
    assert_eq!(insights.featured_videos[2].description, "");

    assert_eq!(insights.contact_email.as_deref(), Some("hello@creator.com"));
  }

  #[tokio::test]
  async fn insights_for_empty_channel_make_one_call() {
    let client = client(|path, _| match path {
      "/search" => Ok(search_page(Vec::new(), None)),
      other => panic!("unexpected call to {other}"),
    });
    let insights = client.fetch_channel_insights("UCempty", "key").await.unwrap();
    assert_eq!(insights, ChannelInsights::default());
    assert_eq!(client.transport().call_count(), 1);
  }

  #[tokio::test]
  async fn insights_failure_uses_insights_fallback() {
    let client = client(|path, query| match path {
      "/videos" => Err(TransportError::Status { status: 500, body: String::new() }),
      _ => insights_provider(path, query),
    });
    let err = client.fetch_channel_insights("UC1", "key").await.unwrap_err();
    assert_eq!(err, ApiError::Unknown(CHANNEL_INSIGHTS_FALLBACK.to_string()));
    assert!(client.caches().channel_insights.is_empty());
  }

  // --- open_channel ---

  #[tokio::test]
  async fn open_channel_returns_detail_and_insights() {
    let client = client(|path, query| match path {
      "/channels" => Ok(items(vec![channel("UC1", "10")])),
      _ => insights_provider(path, query),
    });
    let overview = client.open_channel("UC1", "key").await.unwrap();
    assert_eq!(overview.detail.channel_id, "UC1");
    assert_eq!(overview.insights.top_videos.len(), 4);
  }

  #[tokio::test]
  async fn open_channel_fails_if_either_half_fails() {
    let client = client(|path, query| match path {
      "/channels" => Err(TransportError::Network("timed out".into())),
      _ => insights_provider(path, query),
    });
    let err = client.open_channel("UC1", "key").await.unwrap_err();
    assert_eq!(err.kind(), "connectivity");
  }

  #[tokio::test]
  async fn open_channel_requires_key() {
    let client = client(|_, _| panic!("no call expected"));
    let err = client.open_channel("UC1", "  ").await.unwrap_err();
    assert_eq!(err, ApiError::Validation(CHANNEL_KEY_REQUIRED.to_string()));
  }

  #[tokio::test]
  async fn shared_caches_serve_other_clients() {
    let caches = Arc::new(Caches::default());
    let first = YouTubeClient::with_caches(FakeTransport::new(endless_provider), Arc::clone(&caches));
    let mut params = SearchParams::new("cats", "key");
    params.max_results = 2;
    first.search_videos(&params).await.unwrap();

    let second = YouTubeClient::with_caches(FakeTransport::new(|_, _| panic!("should be cached")), caches);
    assert_eq!(second.search_videos(&params).await.unwrap().len(), 2);
  }
}
