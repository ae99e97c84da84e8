mod app;
mod cache;
mod config;
mod event;
mod gecko;
mod logging;
mod market;
mod query;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "coin9s")]
#[command(about = "A terminal dashboard for CoinGecko market data, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./coin9s.yaml or $XDG_CONFIG_HOME/coin9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Quote currency for prices, e.g. usd, eur, btc
  #[arg(long)]
  currency: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Flushes buffered log lines when dropped at the end of main
  let _log_guard = logging::init()?;

  let config = config::Config::load(args.config.as_deref())?;

  let config = if let Some(currency) = args.currency {
    config::Config {
      vs_currency: currency.to_lowercase(),
      ..config
    }
  } else {
    config
  };

  tracing::info!(
    api = %config.api.url,
    currency = %config.vs_currency,
    api_key = config.api.api_key.is_some(),
    "starting coin9s"
  );

  app::App::new(config)?.run().await
}
