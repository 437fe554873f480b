//! Domain layer: the entity base and the naming rules it relies on.

pub mod entities;
pub mod naming;

// Re-export commonly used domain types
pub use entities::*;
pub use naming::{camel_case_to_snake_case, quote_ident, table_name_for, ConstraintKind};
