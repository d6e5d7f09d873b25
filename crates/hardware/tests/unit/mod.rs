//! # Unit Components
//!
//! Groups the unit tests by crate module.
