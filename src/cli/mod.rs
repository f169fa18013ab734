//! CLI module for Utopia Auth
//!
//! - `serve`: run the HTTP service (default)
//! - `migrate`: apply or revert PostgreSQL schema migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Utopia Auth - account lifecycle and JWT authentication service
#[derive(Parser)]
#[command(name = "utopia-auth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve,

    /// Apply pending database migrations
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::parse_from(["utopia-auth"]);
        assert_eq!(cli.command(), Command::Serve);
    }

    #[test]
    fn test_migrate_revert_flag() {
        let cli = Cli::parse_from(["utopia-auth", "migrate", "--revert"]);
        assert_eq!(
            cli.command(),
            Command::Migrate(migrate::MigrateArgs { revert: true })
        );
    }
}
