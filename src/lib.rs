//! YouTube Data API search client: paginated search with merged video and
//! channel statistics, channel insights, TTL caching, and result export.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod media;
pub mod model;
pub mod transport;
pub mod view;

pub use cache::Caches;
pub use client::YouTubeClient;
pub use error::{ApiError, CredentialIssue};
pub use model::{ChannelDetail, ChannelInsights, ChannelOverview, DurationFilter, RegionCode, SearchParams, VideoSearchResult};
pub use transport::{HttpTransport, Transport, TransportError};
