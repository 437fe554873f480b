//! # Bedrock Core
//!
//! Entity base for the Bedrock backend. Every persisted entity gets a table
//! name derived from its type name and two audit timestamp columns owned by
//! the database. Tables are described with [`TableDef`] and collected in a
//! [`Schema`] that renders PostgreSQL DDL using the configured constraint
//! naming convention.

pub mod domain;
pub mod errors;
pub mod schema;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::{SchemaError, SchemaResult};
pub use schema::{ColumnDef, Schema, TableDef};
