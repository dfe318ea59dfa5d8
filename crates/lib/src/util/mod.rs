//! Shared utilities.
//!
//! Path naming helpers for vendored artifacts and test fixtures.

pub mod paths;

#[cfg(test)]
pub mod testutil;
