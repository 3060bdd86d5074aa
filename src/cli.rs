use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use yt_scout::model::{DurationFilter, RegionCode};
use yt_scout::view::{SortField, SortOrder};

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Args {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Search videos and show them with channel statistics
  Search(SearchArgs),
  /// Show a channel's profile, most-viewed videos and contact email
  Channel {
    channel_id: String,
    #[command(flatten)]
    key: KeyArg,
  },
  /// Manage the stored API key
  Key {
    #[command(subcommand)]
    action: KeyAction,
  },
  /// Print shell completions
  Completions {
    #[arg(value_enum)]
    shell: Shell,
  },
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
  /// Store an API key for later runs
  Set { key: String },
  /// Remove the stored API key
  Clear,
  /// Show where the key is stored and whether one is set
  Show,
}

#[derive(clap::Args, Debug)]
pub struct KeyArg {
  /// YouTube Data API key (overrides the stored key)
  #[arg(long, env = "YT_SCOUT_API_KEY", hide_env_values = true)]
  pub api_key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
  pub query: String,

  /// Duration filter; 'short' keeps likely vertical Shorts
  #[arg(short, long, value_enum, default_value = "any")]
  pub duration: DurationFilter,

  /// Number of results to fetch (1-100)
  #[arg(short = 'n', long, default_value_t = 20, allow_negative_numbers = true)]
  pub max_results: i64,

  /// Only videos published in this year (UTC)
  #[arg(short, long)]
  pub year: Option<i32>,

  /// Restrict results to a region
  #[arg(short, long, value_enum)]
  pub region: Option<RegionCode>,

  /// Minimum views-per-subscriber ratio (0 keeps everything)
  #[arg(long, default_value_t = 0.0, value_parser = parse_ratio)]
  pub min_ratio: f64,

  #[arg(long, value_enum)]
  pub sort: Option<SortField>,

  #[arg(long, value_enum, default_value = "desc")]
  pub order: SortOrder,

  /// Export the shown results to an .xlsx file (default: youtube-search-results-<date>.xlsx)
  #[arg(long, value_name = "PATH", num_args = 0..=1)]
  pub export: Option<Option<PathBuf>>,

  /// Print results as JSON instead of a table
  #[arg(long)]
  pub json: bool,

  #[command(flatten)]
  pub key: KeyArg,
}

fn parse_ratio(raw: &str) -> Result<f64, String> {
  let ratio: f64 = raw.parse().map_err(|e| format!("{e}"))?;
  if !ratio.is_finite() || ratio < 0.0 {
    return Err("ratio must be a finite number of 0 or more".to_string());
  }
  Ok(ratio)
}
