//! Pure helpers over provider metadata: durations, thumbnails, the Shorts
//! heuristic, and contact-email extraction.

use regex::Regex;
use std::sync::LazyLock;

use crate::api::Thumbnails;
use crate::constants::constants;

// --- Durations ---

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$").expect("duration pattern is valid")
});

/// Parse an ISO-8601 duration such as `PT1H2M3S` into whole seconds.
///
/// Every component is optional, but at least one must be present. A leading
/// day component (`P1DT2H`) is accepted. Fractional seconds are truncated.
pub fn parse_iso_duration(raw: &str) -> Option<u64> {
  let caps = ISO_DURATION.captures(raw.trim())?;
  if caps.iter().skip(1).all(|group| group.is_none()) {
    return None;
  }
  let int = |idx: usize| -> Option<u64> {
    match caps.get(idx) {
      Some(m) => m.as_str().parse().ok(),
      None => Some(0),
    }
  };
  let seconds = match caps.get(4) {
    Some(m) => m.as_str().parse::<f64>().ok()?.trunc() as u64,
    None => 0,
  };
  // Values that overflow u64 are malformed, not wrapped.
  int(1)?
    .checked_mul(86_400)?
    .checked_add(int(2)?.checked_mul(3_600)?)?
    .checked_add(int(3)?.checked_mul(60)?)?
    .checked_add(seconds)
}

// --- Thumbnails ---

/// Largest available thumbnail URL in a single set.
pub fn thumbnail_url(thumbnails: &Thumbnails) -> Option<&str> {
  thumbnails.by_priority().into_iter().flatten().map(|t| t.url.as_str()).find(|url| !url.is_empty())
}

/// First URL found across an ordered list of thumbnail sets, or an empty string.
pub fn resolve_thumbnail_url(candidates: &[Option<&Thumbnails>]) -> String {
  candidates.iter().flatten().find_map(|set| thumbnail_url(set)).unwrap_or_default().to_string()
}

/// Width and height of the largest thumbnail that reports both.
pub fn thumbnail_dimensions(thumbnails: &Thumbnails) -> Option<(u32, u32)> {
  thumbnails.by_priority().into_iter().flatten().find_map(|t| match (t.width, t.height) {
    (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
    _ => None,
  })
}

// --- Shorts heuristic ---

const PORTRAIT_RATIO: f64 = 9.0 / 16.0;
const PORTRAIT_TOLERANCE: f64 = 0.15;
const STRONGLY_PORTRAIT: f64 = 0.75;

/// Best-effort guess at whether a video is a vertical Short.
///
/// The provider exposes no reliable Shorts flag, so this looks at duration
/// (unknown or over the ceiling is never short), thumbnail aspect ratio, and
/// finally tags mentioning "short" or "vertical".
pub fn is_vertical_short(duration_secs: Option<u64>, dimensions: Option<(u32, u32)>, tags: &[String]) -> bool {
  let Some(duration) = duration_secs else { return false };
  if duration > constants().short_max_duration_secs {
    return false;
  }

  if let Some((width, height)) = dimensions {
    let ratio = f64::from(width) / f64::from(height);
    if (ratio - PORTRAIT_RATIO).abs() <= PORTRAIT_TOLERANCE || ratio < STRONGLY_PORTRAIT {
      return true;
    }
  }

  tags.iter().any(|tag| {
    let tag = tag.to_lowercase();
    tag.contains("short") || tag.contains("vertical")
  })
}

// --- Contact email ---

static EMAIL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("email pattern is valid"));

pub fn extract_email(text: &str) -> Option<String> {
  EMAIL.find(text).map(|m| m.as_str().to_string())
}

/// First email found scanning `sources` in order.
pub fn first_email<'a>(sources: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
  sources.into_iter().flatten().find_map(extract_email)
}
