mod cli;
mod logging;
mod output;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tracing::{info, warn};

use cli::{Args, Command, KeyAction, KeyArg, SearchArgs};
use yt_scout::config::{Config, config_path};
use yt_scout::export::{ExportError, default_file_name, export_results};
use yt_scout::model::clamp_year;
use yt_scout::view::ResultView;
use yt_scout::{ApiError, SearchParams, YouTubeClient};

// --- Helpers ---

/// Key from `--api-key` / `YT_SCOUT_API_KEY`, else the stored one.
fn resolve_api_key(arg: &KeyArg) -> Result<String> {
  if let Some(key) = arg.api_key.as_deref().map(str::trim)
    && !key.is_empty()
  {
    return Ok(key.to_string());
  }
  let config = Config::load();
  let Some(key) = config.api_key() else {
    bail!("No API key configured. Run `yt-scout key set <KEY>` or pass --api-key.");
  };
  Ok(key.to_string())
}

/// Attach a key hint to credential failures.
fn report(error: ApiError) -> anyhow::Error {
  warn!(kind = error.kind(), "main: request failed");
  if error.requires_credential() {
    let hint = "Update the stored key with `yt-scout key set <KEY>`.";
    return match error.provider_message() {
      Some(detail) => anyhow::anyhow!("{error}\n  provider: {detail}\n  {hint}"),
      None => anyhow::anyhow!("{error}\n  {hint}"),
    };
  }
  anyhow::Error::new(error)
}

// --- Commands ---

async fn run_search(args: SearchArgs) -> Result<()> {
  let api_key = resolve_api_key(&args.key)?;
  let client = YouTubeClient::http().context("Failed to build HTTP client")?;

  let mut params = SearchParams::new(args.query, api_key);
  params.duration = args.duration;
  params.max_results = args.max_results;
  params.year = args.year.map(|y| clamp_year(y, Local::now().year()));
  params.region = args.region;

  let videos = client.search_videos(&params).await.map_err(report)?;
  let view = ResultView { ratio_threshold: args.min_ratio, sort: args.sort.map(|field| (field, args.order)) };
  let shown = view.apply(&videos);
  info!(fetched = videos.len(), shown = shown.len(), "main: search finished");

  if args.json {
    println!("{}", serde_json::to_string_pretty(&shown).context("Failed to serialize results")?);
  } else {
    output::print_results(&shown);
  }

  if let Some(target) = args.export {
    let path = target.unwrap_or_else(|| PathBuf::from(default_file_name(Local::now().date_naive())));
    match export_results(shown.iter().copied(), &path) {
      Ok(rows) => eprintln!("Exported {} row(s) to {}", rows, path.display()),
      Err(ExportError::Empty) => eprintln!("{}", ExportError::Empty),
      Err(e) => return Err(e).context("Export failed"),
    }
  }
  Ok(())
}

async fn run_channel(channel_id: String, key: KeyArg) -> Result<()> {
  let api_key = resolve_api_key(&key)?;
  let client = YouTubeClient::http().context("Failed to build HTTP client")?;
  let overview = client.open_channel(&channel_id, &api_key).await.map_err(report)?;
  output::print_channel(&overview);
  Ok(())
}

fn run_key(action: KeyAction) -> Result<()> {
  let mut config = Config::load();
  match action {
    KeyAction::Set { key } => {
      config.set_api_key(&key);
      if config.api_key().is_none() {
        bail!("API key is blank; use `yt-scout key clear` to remove the stored key.");
      }
      let path = config.save()?;
      println!("API key saved to {}", path.display());
    }
    KeyAction::Clear => {
      config.clear_api_key();
      let path = config.save()?;
      println!("API key removed from {}", path.display());
    }
    KeyAction::Show => {
      let location = config_path().map(|p| p.display().to_string()).unwrap_or_else(|| "(unavailable)".to_string());
      match config.api_key() {
        Some(key) => {
          let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
          println!("API key: …{} ({})", tail, location);
        }
        None => println!("No API key stored ({})", location),
      }
    }
  }
  Ok(())
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _guard = logging::init();

  match args.command {
    Command::Search(search) => run_search(search).await,
    Command::Channel { channel_id, key } => run_channel(channel_id, key).await,
    Command::Key { action } => run_key(action),
    Command::Completions { shell } => {
      clap_complete::generate(shell, &mut Args::command(), "yt-scout", &mut std::io::stdout());
      Ok(())
    }
  }
}
