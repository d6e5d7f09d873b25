//! Set-associative cache model with an insertion/promotion-vector LRU policy.
//!
//! This crate implements the following:
//! 1. **Replacement:** An LRU variant steered by a fixed per-slot promotion
//!    table (IPV), plus a classic LRU baseline, behind one entry-based trait.
//! 2. **Cache:** A set-associative host cache that drives the policy on
//!    hits, fills and invalidations.
//! 3. **Branch prediction:** A self-contained global-history predictor.
//! 4. **Configuration and statistics:** JSON configuration and cache counters.
//!
//! All models are single-threaded; a host running them on several threads
//! must serialize access to each cache set itself.

/// Common constants and error types.
pub mod common;
/// Model configuration (defaults, enums, config structures).
pub mod config;
/// Hardware units (cache, replacement policies, branch predictor).
pub mod core;
/// Cache statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Set-associative cache model; construct with `CacheSim::new`.
pub use crate::core::CacheSim;
