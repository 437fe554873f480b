//! Schema definition errors.

use thiserror::Error;

/// Errors raised while registering entities or rendering their DDL
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Table already registered: {table}")]
    DuplicateTable { table: String },

    #[error("Table {table} has no columns")]
    NoColumns { table: String },

    #[error("Column {column} is declared twice on table {table}")]
    DuplicateColumn { table: String, column: String },

    #[error("Column {column} is managed by the storage engine and cannot be declared on table {table}")]
    ReservedColumn { table: String, column: String },

    #[error("Column {column} referenced by a constraint does not exist on table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Identifier {name} exceeds {max} bytes")]
    IdentifierTooLong { name: String, max: usize },
}

pub type SchemaResult<T> = Result<T, SchemaError>;
