//! The single seam between the orchestrators and the network.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::constants::constants;

/// Query parameters for one provider call, in the order they are sent.
pub type Query = Vec<(&'static str, String)>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
  /// Connection failure, DNS failure, or timeout.
  #[error("network error: {0}")]
  Network(String),

  /// The provider answered with a non-2xx status.
  #[error("HTTP {status}")]
  Status { status: u16, body: String },

  /// A 2xx body that did not match the expected shape.
  #[error("decode error: {0}")]
  Decode(String),
}

/// Issues one `GET` against a provider endpoint and returns the 2xx body.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn get(&self, path: &str, query: &Query) -> Result<String, TransportError>;
}

/// Decode a JSON body fetched through a [`Transport`].
pub async fn get_json<T, R>(transport: &T, path: &str, query: &Query) -> Result<R, TransportError>
where
  T: Transport + ?Sized,
  R: serde::de::DeserializeOwned,
{
  let body = transport.get(path, query).await?;
  serde_json::from_str(&body).map_err(|e| TransportError::Decode(format!("{path}: {e}")))
}

/// reqwest-backed transport against the public Data API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
  client: Client,
  base_url: String,
}

impl HttpTransport {
  pub fn new() -> Result<Self, TransportError> {
    let c = constants();
    Self::with_base_url(&c.api_base_url, c.request_timeout())
  }

  pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
    let client = Client::builder()
      .timeout(timeout)
      .gzip(true)
      .user_agent(concat!("yt-scout/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn get(&self, path: &str, query: &Query) -> Result<String, TransportError> {
    let url = Url::parse_with_params(&format!("{}{}", self.base_url, path), query.iter().map(|(k, v)| (*k, v.as_str())))
      .map_err(|e| TransportError::Network(format!("invalid request URL: {e}")))?;

    debug!(path, params = query.len(), "youtube: GET");
    let response = self.client.get(url).send().await.map_err(|e| TransportError::Network(e.to_string()))?;

    let status = response.status();
    let body = response.text().await.map_err(|e| TransportError::Network(e.to_string()))?;
    if !status.is_success() {
      debug!(path, status = status.as_u16(), "youtube: non-success response");
      return Err(TransportError::Status { status: status.as_u16(), body });
    }
    Ok(body)
  }
}
