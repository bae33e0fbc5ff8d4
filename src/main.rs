use anyhow::{Context, Result};
use capture_plots::batch;
use capture_plots::config::Config;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cwd = std::env::current_dir().context("resolving working directory")?;
    let config = Config::discover(&cwd)?;

    batch::run(&config)?;
    Ok(())
}
