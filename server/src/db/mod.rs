pub mod error;
pub mod gate;
pub mod migrations;
pub mod models;
pub mod store;

pub use error::StoreError;
pub use gate::{Gate, GateGuard, GateState};
pub use store::{Cursor, DocumentStore, Filter, InsertOneResult, SqliteStore};

use std::path::Path;

/// Type alias for the shared, gated document store.
/// rusqlite is synchronous — handlers acquire the gate inside
/// tokio::task::spawn_blocking.
pub type DbPool = Gate<SqliteStore>;

/// Initialize the document database: create data directory if needed,
/// open (or create) the database file, and run migrations.
pub fn init_db(
    data_dir: &str,
    database_file: &str,
    cursor_batch_size: usize,
) -> Result<DbPool, StoreError> {
    std::fs::create_dir_all(data_dir)?;

    let db_path = Path::new(data_dir).join(database_file);
    let store = SqliteStore::open(&db_path, cursor_batch_size)?;

    tracing::info!("Database initialized at {}", db_path.display());

    Ok(Gate::new(store))
}
