// Storage module: SQLite-backed persistence for listings.

pub mod sqlite;

pub use sqlite::SqliteStorage;
