use clap::Parser;
use utopia_auth::cli::{self, Cli, Command};
use utopia_auth::infrastructure::logging::init_logging;
use utopia_auth::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_logging(&config.logging);

    match cli.command() {
        Command::Serve => cli::serve::run(&config).await,
        Command::Migrate(args) => cli::migrate::run(&config, args).await,
    }
}
