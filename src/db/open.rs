use std::path::Path;

use log::info;
use rusqlite::Connection;

static SCHEMA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/db/schema.sql"));

pub fn open_db(path: &Path) -> rusqlite::Result<Connection> {
    if !path.exists() {
        info!("Creating new database {}", path.display());
    }
    let conn = Connection::open(path)?;
    apply_schema(&conn)?;
    Ok(conn)
}

/// A throwaway registration store, mostly useful for tests
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    apply_schema(&conn)?;
    Ok(conn)
}

fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
