//! Partial patch query building.
//!
//! Client payloads are resolved against a fixed, code-defined [`FieldSchema`]
//! into an ordered [`FieldSet`], which is then assembled into an
//! [`AssembledStatement`]: statement text with positional placeholders plus
//! the argument list to bind. Column and table names only ever come from
//! `&'static str` identifiers; payload values only ever become bound arguments.

pub mod assemble;
pub mod error;
pub mod filter;
pub mod request;
pub mod resolve;
pub mod schema;
pub mod value;

pub use assemble::{AssembledStatement, Placeholder, assemble_insert, assemble_update};
pub use error::PatchError;
pub use filter::{by_status, search};
pub use request::PatchRequest;
pub use resolve::{FieldSet, resolve, resolve_create};
pub use schema::{Case, Choices, DefaultValue, FieldKind, FieldSchema, FieldSpec};
pub use value::SqlValue;

/// JSON object body as received from a client.
pub type Payload = serde_json::Map<String, serde_json::Value>;
