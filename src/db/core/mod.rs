pub mod client;
pub mod errors;
pub mod macros;
pub mod table;
mod value;

// Re-export for convenience
pub use client::DbClient;
pub use errors::{DbError, handle_db_error};
pub use table::{DbTable, Table};
