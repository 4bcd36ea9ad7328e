//! PageSnap - capture an ebook page by page from the screen

// The capture path is only wired up on Windows
#[cfg_attr(not(windows), allow(dead_code))]
mod cli;
#[cfg_attr(not(windows), allow(dead_code))]
mod config;
#[cfg(windows)]
mod desktop;
#[cfg_attr(not(windows), allow(dead_code))]
mod workflow;

use crate::cli::Cli;
use crate::config::Config;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    run(&cli, &config)
}

#[cfg(windows)]
fn run(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    desktop::run(cli, config)
}

#[cfg(not(windows))]
fn run(_cli: &Cli, _config: &Config) -> anyhow::Result<()> {
    log::error!("Screen capture and page turning use the Win32 API.");
    anyhow::bail!("PageSnap requires Windows")
}
