//! Storage infrastructure

pub mod migrations;
mod postgres;

pub use migrations::{run_migrations, Migration, Migrator, PostgresMigrator};
pub use postgres::connect_pool;
