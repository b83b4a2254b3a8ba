#![deny(clippy::all, clippy::pedantic)]

use color_eyre::eyre::Result;
use log::info;
use staff_alias::{config::Config, plugin::Routes, StaffAlias};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    env_logger::Builder::from_default_env()
        .filter(None, log::LevelFilter::Info)
        .init();

    let config = Config::from_file(
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_owned()),
    )
    .await?;

    let mut routes = Routes::default();
    StaffAlias::register(&mut routes);

    let plugin = StaffAlias::boot(&config).await?;
    plugin.check().await?;

    info!(
        "Ready with {} mount(s); alias {}",
        routes.mounts().len(),
        if plugin.enabled() { "enabled" } else { "disabled" }
    );
    Ok(())
}
