//! Persisted entity base.

pub mod base;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use base::{Entity, Timestamps, CREATED_AT_COLUMN, UPDATED_AT_COLUMN};
