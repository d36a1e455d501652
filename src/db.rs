//! All job registration state is stored in a SQLite database

/// Connect to a SQLite database
pub mod open;
/// Job records: loading candidates and recording launches
pub mod record;
