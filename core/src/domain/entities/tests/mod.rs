//! Tests for entity base types

#[cfg(test)]
mod base_tests;
