//! Branch prediction unit (BRU) implementations.
//!
//! A self-contained peer of the cache model: it shares no state with the
//! replacement policies. Contains the predictor interface and a
//! global-history predictor with selectable index hash.

pub use self::branch_predictor::{BranchHistory, BranchPredictor};
pub use self::gshare::{GSharePredictor, SatCounter};

/// Branch predictor trait and history snapshot.
pub mod branch_predictor;

/// Global history branch predictor (gshare and NAND-indexed variants).
pub mod gshare;
