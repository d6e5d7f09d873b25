//! Modelled hardware units.
//!
//! This module contains the cache system with its replacement policies and
//! the branch prediction unit.

/// Branch prediction unit (global history predictors).
pub mod bru;

/// Set-associative cache model with replacement policies.
pub mod cache;
