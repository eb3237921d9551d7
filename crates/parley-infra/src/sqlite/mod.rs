//! SQLite storage layer for the Directory.

pub mod directory;
pub mod pool;

pub use directory::SqliteDirectory;
pub use pool::DatabasePool;
