//! Configuration system for the cache model.
//!
//! This module defines the configuration structures and enums used to
//! parameterize the simulator. It provides:
//! 1. **Defaults:** Baseline cache geometry, IPV parameters and predictor sizing.
//! 2. **Structures:** Cache, IPV policy and branch predictor configuration.
//! 3. **Enums:** Replacement policy and branch index hash selection.
//!
//! Configuration is supplied as JSON (see [`Config::from_json`]) or built
//! from `Config::default()`.

use serde::Deserialize;

use crate::common::ConfigError;

/// Default configuration constants.
///
/// These values define the baseline configuration when a field is omitted
/// from the JSON document.
mod defaults {
    /// Default cache size in bytes (32 KiB).
    pub const CACHE_SIZE: usize = 32 * 1024;

    /// Default cache line size in bytes (64 bytes).
    pub const CACHE_LINE: usize = 64;

    /// Default cache associativity (16 ways, the size the IPV table is tuned for).
    pub const CACHE_WAYS: usize = 16;

    /// Default cache access latency in cycles.
    pub const CACHE_LATENCY: u64 = 1;

    /// Default rank for newly inserted lines.
    pub const INSERTION_RANK: usize = crate::common::IPV_INSERTION_RANK;

    /// Default number of hardware threads sharing the predictor.
    pub const BP_THREADS: usize = 1;

    /// Default global history register width in bits.
    pub const BP_HISTORY_BITS: u32 = 12;

    /// Default pattern history table size (4096 counters).
    pub const BP_PREDICTOR_SIZE: usize = 4096;

    /// Default saturating counter width in bits.
    pub const BP_COUNTER_BITS: u32 = 2;

    /// Default shift applied to the PC before indexing (4-byte instructions).
    pub const BP_INST_SHIFT: u32 = 2;
}

/// Cache replacement policy algorithms.
///
/// Specifies the algorithm used to select which cache line to evict
/// when a new line must be installed in a full cache set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ReplacementPolicy {
    /// LRU ordering steered by a per-slot insertion/promotion vector.
    ///
    /// Touched lines move to their slot's promotion rank and new lines
    /// start at a fixed intermediate rank.
    #[default]
    #[serde(alias = "LRU_IPV", alias = "LruIPV")]
    LruIpv,
    /// Classic Least Recently Used replacement.
    ///
    /// Every touch and fill promotes to MRU; the LRU line is evicted.
    #[serde(alias = "LRU")]
    Lru,
}

/// Hash used to combine branch address and global history into a table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum IndexHash {
    /// `!(pc_bits & history_bits)`, masked to the table size.
    #[default]
    Nand,
    /// `pc_bits ^ history_bits` (classic gshare).
    Xor,
}

/// Root configuration structure.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use ipvsim_core::config::{Config, ReplacementPolicy};
///
/// let config = Config::default();
/// assert_eq!(config.cache.ways, 16);
/// assert_eq!(config.cache.policy, ReplacementPolicy::LruIpv);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use ipvsim_core::config::{Config, IndexHash, ReplacementPolicy};
///
/// let json = r#"{
///     "cache": {
///         "enabled": true,
///         "size_bytes": 4096,
///         "line_bytes": 64,
///         "ways": 4,
///         "policy": "LruIpv",
///         "lru_ipv": { "promotion_table": [0, 0, 1, 2], "insertion_rank": 2 }
///     },
///     "branch_predictor": {
///         "hash": "Xor",
///         "predictor_size": 1024
///     }
/// }"#;
///
/// let config = Config::from_json(json)?;
/// assert_eq!(config.cache.ways, 4);
/// assert_eq!(config.cache.policy, ReplacementPolicy::LruIpv);
/// assert_eq!(config.cache.lru_ipv.insertion_rank, 2);
/// assert_eq!(config.branch_predictor.hash, IndexHash::Xor);
/// # Ok::<(), ipvsim_core::common::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cache geometry and replacement policy
    #[serde(default)]
    pub cache: CacheConfig,
    /// Branch predictor sizing
    #[serde(default)]
    pub branch_predictor: BranchPredictorConfig,
}

impl Config {
    /// Parses a configuration from a JSON document.
    ///
    /// Omitted fields take their defaults. Semantic validation (geometry,
    /// table ranges) happens when the cache or predictor is constructed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is not valid JSON or
    /// does not match the configuration schema.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Enable the cache
    #[serde(default = "CacheConfig::default_enabled")]
    pub enabled: bool,

    /// Total cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Replacement policy
    #[serde(default)]
    pub policy: ReplacementPolicy,

    /// Access latency in cycles
    #[serde(default = "CacheConfig::default_latency")]
    pub latency: u64,

    /// Parameters of the IPV policy (ignored by other policies)
    #[serde(default)]
    pub lru_ipv: LruIpvConfig,
}

impl CacheConfig {
    /// Returns whether the cache is enabled when not specified.
    fn default_enabled() -> bool {
        true
    }

    /// Returns the default cache size in bytes.
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default cache line size in bytes.
    fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Returns the default cache associativity (number of ways).
    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Returns the default cache access latency in cycles.
    fn default_latency() -> u64 {
        defaults::CACHE_LATENCY
    }
}

impl Default for CacheConfig {
    /// Creates a default cache configuration.
    ///
    /// 32 KiB, 64-byte lines, 16 ways, IPV replacement with the built-in table.
    fn default() -> Self {
        Self {
            enabled: true,
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
            policy: ReplacementPolicy::default(),
            latency: defaults::CACHE_LATENCY,
            lru_ipv: LruIpvConfig::default(),
        }
    }
}

/// Parameters of the insertion/promotion-vector LRU policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LruIpvConfig {
    /// Promotion rank per physical slot. `None` selects the built-in
    /// 16-way table.
    #[serde(default)]
    pub promotion_table: Option<Vec<usize>>,

    /// Rank assigned to newly inserted lines
    #[serde(default = "LruIpvConfig::default_insertion_rank")]
    pub insertion_rank: usize,
}

impl LruIpvConfig {
    /// Returns the default insertion rank.
    fn default_insertion_rank() -> usize {
        defaults::INSERTION_RANK
    }
}

impl Default for LruIpvConfig {
    fn default() -> Self {
        Self {
            promotion_table: None,
            insertion_rank: defaults::INSERTION_RANK,
        }
    }
}

/// Global-history branch predictor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchPredictorConfig {
    /// Index hash combining PC and global history
    #[serde(default)]
    pub hash: IndexHash,

    /// Hardware threads, each with its own global history register
    #[serde(default = "BranchPredictorConfig::default_threads")]
    pub num_threads: usize,

    /// Width of the global history register in bits
    #[serde(default = "BranchPredictorConfig::default_history_bits")]
    pub global_history_bits: u32,

    /// Number of pattern history table counters (power of two)
    #[serde(default = "BranchPredictorConfig::default_predictor_size")]
    pub predictor_size: usize,

    /// Width of each saturating counter in bits
    #[serde(default = "BranchPredictorConfig::default_counter_bits")]
    pub counter_bits: u32,

    /// Right shift applied to the branch address before indexing
    #[serde(default = "BranchPredictorConfig::default_inst_shift")]
    pub inst_shift_amt: u32,
}

impl BranchPredictorConfig {
    /// Returns the default number of hardware threads.
    fn default_threads() -> usize {
        defaults::BP_THREADS
    }

    /// Returns the default global history width.
    fn default_history_bits() -> u32 {
        defaults::BP_HISTORY_BITS
    }

    /// Returns the default pattern history table size.
    fn default_predictor_size() -> usize {
        defaults::BP_PREDICTOR_SIZE
    }

    /// Returns the default counter width.
    fn default_counter_bits() -> u32 {
        defaults::BP_COUNTER_BITS
    }

    /// Returns the default instruction shift.
    fn default_inst_shift() -> u32 {
        defaults::BP_INST_SHIFT
    }
}

impl Default for BranchPredictorConfig {
    fn default() -> Self {
        Self {
            hash: IndexHash::default(),
            num_threads: defaults::BP_THREADS,
            global_history_bits: defaults::BP_HISTORY_BITS,
            predictor_size: defaults::BP_PREDICTOR_SIZE,
            counter_bits: defaults::BP_COUNTER_BITS,
            inst_shift_amt: defaults::BP_INST_SHIFT,
        }
    }
}
