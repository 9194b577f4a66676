pub mod database;
pub mod docstore;

pub use database::{init_database, DatabaseConfig};
