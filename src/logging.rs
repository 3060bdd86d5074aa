use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use yt_scout::config::project_dirs;

const LOG_ENV: &str = "YT_SCOUT_LOG";
const LOG_FILE: &str = "yt-scout.log";
const DEFAULT_FILTER: &str = "yt_scout=info";

/// Log to `<data dir>/yt-scout.log` so stdout stays clean for tables and JSON.
/// Returns the writer guard, which must live until exit; `None` when no data dir exists.
pub fn init() -> Option<WorkerGuard> {
  let dirs = project_dirs()?;
  let dir = dirs.data_local_dir();
  std::fs::create_dir_all(dir).ok()?;

  let appender = tracing_appender::rolling::never(dir, LOG_FILE);
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).try_init().ok()?;
  Some(guard)
}
