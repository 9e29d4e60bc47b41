mod config;
mod types;

pub use config::connect_data_store;
pub use types::{DataStore, PostgresDataStore, SqliteDataStore};
