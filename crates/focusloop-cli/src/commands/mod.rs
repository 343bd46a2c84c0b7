pub mod config;
pub mod run;
pub mod settings;
pub mod stats;
pub mod task;

use focusloop_core::{Config, SqliteStore};
use serde::Serialize;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the document database named by the loaded config.
pub fn open_store() -> Result<SqliteStore, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    open_store_with(&config)
}

pub fn open_store_with(config: &Config) -> Result<SqliteStore, Box<dyn std::error::Error>> {
    let path = config.database_path()?;
    Ok(SqliteStore::open(&path)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
