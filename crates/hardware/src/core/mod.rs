//! Core hardware models.
//!
//! Holds the functional units driven by a host simulator: the set-associative
//! cache with its replacement policies and the branch predictor.

/// Hardware units (cache, branch predictor).
pub mod units;

pub use self::units::cache::CacheSim;
