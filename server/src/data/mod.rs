//! Data storage layer
//!
//! - `sqlite` - Embedded SQLite database (schema, migrations, repositories)
//! - `types` - Row types shared between repositories and the API layer

pub mod sqlite;
pub mod types;

pub use sqlite::SqliteService;
pub use sqlite::error::SqliteError;
