//! Spreadsheet export of a result list.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::model::VideoSearchResult;

pub const SHEET_NAME: &str = "YouTube Search Results";

pub const COLUMNS: [&str; 9] =
  ["Title", "Channel", "Video URL", "Views", "Likes", "Subscribers", "Channel Videos", "Published", "Tags"];

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("There are no search results to export.")]
  Empty,

  #[error("failed to write spreadsheet: {0}")]
  Xlsx(#[from] XlsxError),
}

/// One spreadsheet row, fields in [`COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
  pub title: String,
  pub channel: String,
  pub video_url: String,
  pub views: u64,
  pub likes: u64,
  pub subscribers: u64,
  pub channel_videos: u64,
  pub published: String,
  pub tags: String,
}

impl From<&VideoSearchResult> for ExportRow {
  fn from(video: &VideoSearchResult) -> Self {
    Self {
      title: video.title.clone(),
      channel: video.channel_title.clone(),
      video_url: video.watch_url(),
      views: video.views,
      likes: video.likes,
      subscribers: video.channel_subscribers,
      channel_videos: video.channel_video_count,
      published: video.published_at.clone(),
      tags: video.tags.join(", "),
    }
  }
}

pub fn export_rows<'a>(videos: impl IntoIterator<Item = &'a VideoSearchResult>) -> Result<Vec<ExportRow>, ExportError> {
  let rows: Vec<ExportRow> = videos.into_iter().map(ExportRow::from).collect();
  if rows.is_empty() {
    return Err(ExportError::Empty);
  }
  Ok(rows)
}

/// `youtube-search-results-YYYY-MM-DD.xlsx`
pub fn default_file_name(date: NaiveDate) -> String {
  format!("youtube-search-results-{}.xlsx", date.format("%Y-%m-%d"))
}

/// One worksheet cell value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
  Text(&'a str),
  Number(u64),
}

impl ExportRow {
  /// Cell values in [`COLUMNS`] order.
  pub fn cells(&self) -> [Cell<'_>; COLUMNS.len()] {
    [
      Cell::Text(&self.title),
      Cell::Text(&self.channel),
      Cell::Text(&self.video_url),
      Cell::Number(self.views),
      Cell::Number(self.likes),
      Cell::Number(self.subscribers),
      Cell::Number(self.channel_videos),
      Cell::Text(&self.published),
      Cell::Text(&self.tags),
    ]
  }
}

/// Write `rows` under a bold header row. Nothing is written when `rows` is empty.
pub fn write_xlsx(rows: &[ExportRow], path: &Path) -> Result<(), ExportError> {
  if rows.is_empty() {
    return Err(ExportError::Empty);
  }

  let mut workbook = Workbook::new();
  {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let header = Format::new().set_bold();
    for (col, name) in COLUMNS.iter().enumerate() {
      sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (idx, row) in rows.iter().enumerate() {
      let r = idx as u32 + 1;
      for (col, cell) in row.cells().into_iter().enumerate() {
        match cell {
          Cell::Text(text) => sheet.write_string(r, col as u16, text)?,
          Cell::Number(n) => sheet.write_number(r, col as u16, n as f64)?,
        };
      }
    }
  }
  workbook.save(path)?;

  info!(path = %path.display(), rows = rows.len(), "export: spreadsheet written");
  Ok(())
}

/// Export `videos` to `path`, returning the number of data rows written.
pub fn export_results<'a>(
  videos: impl IntoIterator<Item = &'a VideoSearchResult>,
  path: &Path,
) -> Result<usize, ExportError> {
  let rows = export_rows(videos)?;
  write_xlsx(&rows, path)?;
  Ok(rows.len())
}
