//! Common definitions shared across the cache model.
//!
//! This module provides:
//! 1. **Constants:** The tuned 16-way promotion table and insertion rank.
//! 2. **Error Handling:** The configuration error taxonomy.

/// Promotion table, insertion rank and related constants.
pub mod constants;

/// Configuration error type.
pub mod error;

pub use constants::{IPV_ASSOCIATIVITY, IPV_INSERTION_RANK, IPV_PROMOTION_TABLE};
pub use error::ConfigError;
