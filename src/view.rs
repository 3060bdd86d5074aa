//! Client-side filtering and sorting of a fetched result list.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::model::VideoSearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum SortField {
  Title,
  Views,
  Likes,
  #[value(name = "subscribers")]
  ChannelSubscribers,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

/// What the user narrowed the current results down to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultView {
  /// Minimum views-per-subscriber; `0.0` keeps everything.
  pub ratio_threshold: f64,
  pub sort: Option<(SortField, SortOrder)>,
}

impl ResultView {
  pub fn apply<'a>(&self, videos: &'a [VideoSearchResult]) -> Vec<&'a VideoSearchResult> {
    let mut shown: Vec<&VideoSearchResult> = videos.iter().filter(|v| self.keeps(v)).collect();
    if let Some((field, order)) = self.sort {
      shown.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        match order {
          SortOrder::Asc => ordering,
          SortOrder::Desc => ordering.reverse(),
        }
      });
    }
    shown
  }

  /// A threshold that is not positive (NaN included) keeps everything.
  fn keeps(&self, video: &VideoSearchResult) -> bool {
    self.ratio_threshold.is_nan() || self.ratio_threshold <= 0.0 || video.engagement_ratio() >= self.ratio_threshold
  }
}

fn compare(a: &VideoSearchResult, b: &VideoSearchResult, field: SortField) -> Ordering {
  match field {
    SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    SortField::Views => a.views.cmp(&b.views),
    SortField::Likes => a.likes.cmp(&b.likes),
    SortField::ChannelSubscribers => a.channel_subscribers.cmp(&b.channel_subscribers),
  }
}
