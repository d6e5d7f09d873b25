//! Tests for the individual hardware units.

/// Global history branch predictor tests.
pub mod bru;
