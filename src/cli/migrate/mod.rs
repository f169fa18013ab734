//! Migrate command - applies the PostgreSQL schema

use clap::Args;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::infrastructure::storage::{connect_pool, Migrator, PostgresMigrator};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(config: &AppConfig, args: MigrateArgs) -> anyhow::Result<()> {
    if config.storage.backend != StorageBackend::Postgres {
        anyhow::bail!("migrations require storage.backend = postgres");
    }

    let pool = connect_pool(&config.storage).await?;
    let migrator = PostgresMigrator::new(pool);

    if args.revert {
        migrator.revert().await?;
    } else {
        migrator.run().await?;
    }

    info!(version = ?migrator.version().await?, "Schema is at version");
    Ok(())
}
