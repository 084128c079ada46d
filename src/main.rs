use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use nba_digest::config::Config;
use nba_digest::http_client::HttpPageSource;
use nba_digest::pipeline;
use nba_digest::telegram::{Publisher, StdoutPublisher, TelegramPublisher};

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            init_tracing(false);
            error!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.debug);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(config: &Config) -> Result<()> {
    info!(date = %config.report_date, dry_run = config.dry_run, "starting nba digest");
    let source = HttpPageSource::new()?;
    let publisher: Box<dyn Publisher> = match (&config.telegram, config.dry_run) {
        (Some(target), false) => Box::new(
            TelegramPublisher::new(&target.token, &target.chat_id)
                .context("telegram publisher")?,
        ),
        (target, _) => Box::new(StdoutPublisher::new(
            target.as_ref().map(|t| t.chat_id.as_str()),
        )),
    };
    let digest = pipeline::run(config, &source, publisher.as_ref())?;
    info!(
        games = digest.games.len(),
        degraded = digest.degraded,
        "done"
    );
    Ok(())
}
