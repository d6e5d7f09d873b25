//! Configuration error definitions.
//!
//! Every fallible constructor in the crate reports through [`ConfigError`].
//! Errors are detected once, at construction time; there is no recoverable
//! error class in the policies themselves. Broken invariants at run time
//! (an entry naming an unknown set, touching a slot that was never filled,
//! an empty candidate list) are programming errors and panic instead.

use thiserror::Error;

/// Errors raised while validating a cache, policy or predictor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Associativity must be at least one way.
    #[error("associativity must be positive")]
    ZeroAssociativity,

    /// The promotion table must hold exactly one entry per way.
    #[error("promotion table has {actual} entries but the set has {expected} ways")]
    PromotionTableLength {
        /// Ways per set.
        expected: usize,
        /// Entries supplied.
        actual: usize,
    },

    /// A promotion target lies outside `[0, associativity)`.
    #[error("promotion rank {rank} for slot {slot} is outside [0, {associativity})")]
    PromotionRankOutOfRange {
        /// Physical slot the rank belongs to.
        slot: usize,
        /// Offending rank.
        rank: usize,
        /// Ways per set.
        associativity: usize,
    },

    /// The insertion rank lies outside `[0, associativity)`.
    #[error("insertion rank {rank} is outside [0, {associativity})")]
    InsertionRankOutOfRange {
        /// Offending rank.
        rank: usize,
        /// Ways per set.
        associativity: usize,
    },

    /// No promotion table was supplied and the built-in one does not fit.
    #[error("no built-in promotion table for {associativity}-way sets; supply one explicitly")]
    MissingPromotionTable {
        /// Ways per set.
        associativity: usize,
    },

    /// Cache size, line size and associativity do not describe whole sets.
    #[error(
        "cache geometry {size_bytes} B / {line_bytes} B lines / {ways} ways does not form whole sets"
    )]
    InvalidGeometry {
        /// Total cache size in bytes.
        size_bytes: usize,
        /// Line size in bytes.
        line_bytes: usize,
        /// Ways per set.
        ways: usize,
    },

    /// The pattern history table must have a power-of-two number of entries.
    #[error("predictor size {0} is not a power of two")]
    PredictorSizeNotPowerOfTwo(usize),

    /// Saturating counters must be between 1 and 8 bits wide.
    #[error("counter width {0} is outside 1..=8 bits")]
    CounterBitsOutOfRange(u32),

    /// The global history register must be between 1 and 64 bits wide.
    #[error("global history width {0} is outside 1..=64 bits")]
    HistoryBitsOutOfRange(u32),

    /// At least one hardware thread is required.
    #[error("branch predictor needs at least one thread")]
    ZeroThreads,

    /// The JSON document could not be parsed into a configuration.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}
