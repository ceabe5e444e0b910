mod app;
mod cache;
mod commands;
mod config;
mod dashboard;
mod error;
mod event;
mod google;
mod logging;
mod metrics;
mod query;
mod records;
mod tenure;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

use crate::cache::FetchMode;
use crate::tenure::Locale;

#[derive(Parser, Debug)]
#[command(name = "cvdash")]
#[command(about = "A terminal résumé dashboard backed by Google Sheets and Drive")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./cvdash.yaml, then $XDG_CONFIG_HOME/cvdash/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory for cached sheets and images
  #[arg(long)]
  cache_dir: Option<PathBuf>,

  /// Ignore today's cache and fetch everything again
  #[arg(long)]
  refresh: bool,

  /// Language of labels and tenure strings
  #[arg(long, value_enum)]
  locale: Option<Locale>,

  /// Log at debug level
  #[arg(long)]
  debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over the file
  if let Some(dir) = args.cache_dir {
    config.cache.dir = Some(dir);
  }
  if let Some(locale) = args.locale {
    config.locale = locale;
  }

  let _log_guard = logging::init_tracing(args.debug)?;
  tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting cvdash");

  let mode = if args.refresh {
    FetchMode::Force
  } else {
    FetchMode::IfStale
  };

  // Initialize and run the app
  let mut app = app::App::new(config, mode)?;
  app.run().await?;

  Ok(())
}
