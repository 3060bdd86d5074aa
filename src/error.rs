use thiserror::Error;
use tracing::warn;

use crate::api::provider_message;
use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, ApiError>;

const CONNECTIVITY_MESSAGE: &str = "Could not reach the YouTube API. Check your internet connection or VPN.";
const API_NOT_ENABLED_MESSAGE: &str = "The YouTube Data API v3 is blocked for this project. Enable it in the Google Cloud \
   Console and check the application/domain restrictions on your API key, then try again.";
const INVALID_KEY_MESSAGE: &str = "The API key is not valid. Check the key and try again.";
const QUOTA_MESSAGE: &str = "YouTube API quota exceeded. Try again later or use another key.";
const NOT_FOUND_MESSAGE: &str = "The requested data could not be found.";

/// Phrase the provider uses when the Data API is disabled for the key's project.
const METHOD_DISABLED_PHRASE: &str = "requests to this api youtube method";

/// Why a request was refused for credential reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialIssue {
  ApiNotEnabled,
  InvalidKey,
  QuotaOrPermission,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  /// Missing query or API key. The caller should ask for input instead of retrying.
  #[error("{0}")]
  Validation(String),

  /// Network failure or timeout. Safe to retry.
  #[error("{0}")]
  Connectivity(String),

  /// The key was rejected, is over quota, or its project cannot use the API.
  #[error("{message}")]
  Credential { issue: CredentialIssue, message: String, provider_message: Option<String> },

  #[error("{0}")]
  NotFound(String),

  /// Any other non-2xx response that carried a provider message.
  #[error("{message}")]
  Provider { status: u16, message: String },

  #[error("{0}")]
  Unknown(String),
}

impl ApiError {
  pub fn validation(message: impl Into<String>) -> Self {
    ApiError::Validation(message.into())
  }

  /// Whether the caller should route the user to the API key prompt.
  pub fn requires_credential(&self) -> bool {
    matches!(self, ApiError::Credential { .. })
  }

  pub fn kind(&self) -> &'static str {
    match self {
      ApiError::Validation(_) => "validation",
      ApiError::Connectivity(_) => "connectivity",
      ApiError::Credential { .. } => "credential",
      ApiError::NotFound(_) => "not_found",
      ApiError::Provider { .. } => "provider",
      ApiError::Unknown(_) => "unknown",
    }
  }

  /// The provider's own message, when the failure carried one.
  pub fn provider_message(&self) -> Option<&str> {
    match self {
      ApiError::Credential { provider_message, .. } => provider_message.as_deref(),
      ApiError::Provider { message, .. } => Some(message),
      _ => None,
    }
  }
}

/// Translate a transport failure into the error surfaced to callers.
///
/// `fallback` is the operation-specific text used when nothing more precise
/// is known.
pub fn translate(error: TransportError, fallback: &str) -> ApiError {
  let (status, body) = match error {
    TransportError::Network(detail) => {
      warn!(detail = %detail, "youtube: network failure");
      return ApiError::Connectivity(CONNECTIVITY_MESSAGE.to_string());
    }
    TransportError::Decode(detail) => {
      warn!(detail = %detail, "youtube: could not decode provider response");
      return ApiError::Unknown(fallback.to_string());
    }
    TransportError::Status { status, body } => (status, body),
  };

  let api_message = provider_message(&body);

  if api_message.as_deref().is_some_and(|m| m.to_lowercase().contains(METHOD_DISABLED_PHRASE)) {
    return ApiError::Credential {
      issue: CredentialIssue::ApiNotEnabled,
      message: API_NOT_ENABLED_MESSAGE.to_string(),
      provider_message: api_message,
    };
  }

  match status {
    401 => ApiError::Credential {
      issue: CredentialIssue::InvalidKey,
      message: INVALID_KEY_MESSAGE.to_string(),
      provider_message: api_message,
    },
    403 => ApiError::Credential {
      issue: CredentialIssue::QuotaOrPermission,
      message: api_message.clone().unwrap_or_else(|| QUOTA_MESSAGE.to_string()),
      provider_message: api_message,
    },
    404 => ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()),
    _ => match api_message {
      Some(message) => ApiError::Provider { status, message },
      None => ApiError::Unknown(fallback.to_string()),
    },
  }
}
