use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use yt_scout::model::{ChannelOverview, VideoSearchResult};

// --- Helpers ---

/// Truncate to at most `max_width` terminal columns, appending "…" if truncated.
/// Double-width (CJK) characters count as two columns.
pub fn truncate_str(s: &str, max_width: usize) -> String {
  if s.width() <= max_width {
    return s.to_string();
  }
  let budget = max_width.saturating_sub(1);
  let mut used = 0;
  let mut out = String::new();
  for c in s.chars() {
    let w = c.width().unwrap_or(0);
    if used + w > budget {
      break;
    }
    used += w;
    out.push(c);
  }
  out.push('…');
  out
}

/// Truncate or right-pad `s` to exactly `width` columns.
pub fn fit(s: &str, width: usize) -> String {
  let truncated = truncate_str(s, width);
  let pad = width.saturating_sub(truncated.width());
  format!("{}{}", truncated, " ".repeat(pad))
}

pub fn format_count(n: u64) -> String {
  if n >= 1_000_000_000 {
    format!("{:.1}B", n as f64 / 1_000_000_000.0)
  } else if n >= 1_000_000 {
    format!("{:.1}M", n as f64 / 1_000_000.0)
  } else if n >= 1_000 {
    format!("{:.1}K", n as f64 / 1_000.0)
  } else {
    n.to_string()
  }
}

pub fn format_duration(secs: Option<u64>) -> String {
  match secs {
    Some(s) if s >= 3600 => format!("{}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60),
    Some(s) => format!("{}:{:02}", s / 60, s % 60),
    None => "-".to_string(),
  }
}

fn format_ratio(video: &VideoSearchResult) -> String {
  let ratio = video.engagement_ratio();
  if ratio.is_infinite() { "-".to_string() } else { format!("{ratio:.2}") }
}

// --- Rendering ---

const TITLE_W: usize = 48;
const CHANNEL_W: usize = 22;

pub fn print_results(videos: &[&VideoSearchResult]) {
  if videos.is_empty() {
    println!("No results found.");
    return;
  }

  println!(
    "{:>3}  {}  {}  {:>7}  {:>7}  {:>7}  {:>6}  {:>8}  {}",
    "#",
    fit("Title", TITLE_W),
    fit("Channel", CHANNEL_W),
    "Views",
    "Likes",
    "Subs",
    "Ratio",
    "Length",
    "Published"
  );
  for (i, video) in videos.iter().enumerate() {
    let published = video.published_at.split('T').next().unwrap_or("");
    println!(
      "{:>3}  {}  {}  {:>7}  {:>7}  {:>7}  {:>6}  {:>8}  {}",
      i + 1,
      fit(&video.title, TITLE_W),
      fit(&video.channel_title, CHANNEL_W),
      format_count(video.views),
      format_count(video.likes),
      format_count(video.channel_subscribers),
      format_ratio(video),
      format_duration(video.duration_seconds),
      published
    );
    println!("     {}  [{}]", video.watch_url(), video.channel_id);
  }
  println!();
  println!("{} video(s)", videos.len());
}

pub fn print_channel(overview: &ChannelOverview) {
  let d = &overview.detail;
  println!("{}", d.title);
  if let Some(url) = &d.custom_url {
    println!("  {}", url);
  }
  println!("  https://www.youtube.com/channel/{}", d.channel_id);
  println!(
    "  {} subscribers · {} videos · {} views",
    format_count(d.subscribers),
    format_count(d.video_count),
    format_count(d.view_count)
  );
  let since = d.published_at.split('T').next().unwrap_or("");
  match &d.country {
    Some(country) => println!("  Since {} · {}", since, country),
    None => println!("  Since {}", since),
  }

  let email = d.email.as_ref().or(overview.insights.contact_email.as_ref());
  println!("  Contact: {}", email.map(String::as_str).unwrap_or("not found"));

  if !d.description.trim().is_empty() {
    println!();
    for line in d.description.lines().take(6) {
      println!("  {}", truncate_str(line, 100));
    }
  }

  let insights = &overview.insights;
  if !insights.top_videos.is_empty() {
    println!();
    println!("Top videos");
    for (i, video) in insights.top_videos.iter().enumerate() {
      println!("{:>3}. {}  {:>7} views", i + 1, fit(&video.title, TITLE_W + CHANNEL_W), format_count(video.view_count));
    }
  }

  if !insights.featured_videos.is_empty() {
    println!();
    println!("Featured");
    for video in &insights.featured_videos {
      println!("  {}", video.title);
      println!("    https://www.youtube.com/watch?v={}", video.id);
      if let Some(first) = video.description.lines().find(|l| !l.trim().is_empty()) {
        println!("    {}", truncate_str(first, 96));
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncate_ascii() {
    assert_eq!(truncate_str("hello", 10), "hello");
    assert_eq!(truncate_str("hello world", 6), "hello…");
  }

  #[test]
  fn truncate_counts_wide_chars() {
    // Each of these takes two columns.
    assert_eq!(truncate_str("日本語テキスト", 7), "日本語…");
    assert_eq!(truncate_str("日本", 4), "日本");
  }

  #[test]
  fn fit_pads_to_width() {
    assert_eq!(fit("ab", 5), "ab   ");
    assert_eq!(fit("日本", 6), "日本  ");
    assert_eq!(fit("abcdefgh", 5).width(), 5);
  }

  #[test]
  fn count_formatting() {
    assert_eq!(format_count(999), "999");
    assert_eq!(format_count(1_500), "1.5K");
    assert_eq!(format_count(2_300_000), "2.3M");
    assert_eq!(format_count(1_500_000_000), "1.5B");
  }

  #[test]
  fn duration_formatting() {
    assert_eq!(format_duration(Some(45)), "0:45");
    assert_eq!(format_duration(Some(3723)), "1:02:03");
    assert_eq!(format_duration(None), "-");
  }
}
