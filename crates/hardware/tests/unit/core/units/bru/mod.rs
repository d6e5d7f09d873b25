//! Branch predictor tests.

/// Global history predictor with NAND and XOR index hashes.
pub mod gshare;
