mod app;
mod cli;
mod config;
mod effects;
mod input;
mod render;

use anyhow::Context;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config = config::AppConfig::load(cli.config.as_deref())?;

    engine_logging::initialize(cli.log.into(), config.level_filter()?, None);

    let env_base_url = std::env::var(config::BASE_URL_ENV).ok();
    let settings = config
        .service_settings(cli.base_url.as_deref(), env_base_url.as_deref())
        .context("invalid service configuration")?;

    app::run(settings, cli.file)
}
