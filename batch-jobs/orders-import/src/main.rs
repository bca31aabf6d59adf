use anyhow::Context;
use aws_config::{BehaviorVersion, Region};
use clap::Parser;
use orders_import::{run_import, ImportConfig, RedshiftWarehouse, SecretsManagerStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = ImportConfig::parse();
    config.validate()?;

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await;
    let secrets = SecretsManagerStore::new(&sdk_config);

    run_import(&config, &secrets, &RedshiftWarehouse)
        .await
        .context("orders import failed")?;

    Ok(())
}
