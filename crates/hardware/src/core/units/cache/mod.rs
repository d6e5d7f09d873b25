//! Set-Associative Cache Simulator.
//!
//! This module implements a configurable set-associative cache that hosts a
//! replacement policy. It models hits, misses and write-back penalties, and
//! drives the policy through its entry interface:
//! 1. **Construction:** One replacement entry per physical line, in slot order.
//! 2. **Hit:** `touch` the line's entry.
//! 3. **Miss:** `select_victim` over the set's entries, install, then `reset`.
//! 4. **Invalidation:** `invalidate` the line's entry.

/// Cache replacement policy implementations (LRU-IPV, LRU).
pub mod policies;

use tracing::debug;

use self::policies::{LruIpvPolicy, LruPolicy, ReplacementEntry, ReplacementPolicy};
use crate::common::ConfigError;
use crate::config::{CacheConfig, ReplacementPolicy as PolicyType};
use crate::stats::CacheStats;

/// Cache line entry containing tag, validity, and dirty bits.
#[derive(Debug, Clone, Default)]
struct CacheLine {
    tag: u64,
    valid: bool,
    dirty: bool,
}

/// Cache simulator implementing a set-associative cache with a configurable policy.
#[derive(Debug)]
pub struct CacheSim {
    /// Access latency in cycles (added on hit; miss adds next-level latency).
    pub latency: u64,
    /// When false, accesses bypass this cache and use next-level latency only.
    pub enabled: bool,
    lines: Vec<CacheLine>,
    /// Replacement entry of each line, same indexing as `lines`.
    entries: Vec<ReplacementEntry>,
    num_sets: usize,
    ways: usize,
    line_bytes: usize,
    policy: Box<dyn ReplacementPolicy>,
    stats: CacheStats,
}

impl CacheSim {
    /// Creates a new cache simulator with the specified configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Cache configuration specifying size, associativity,
    ///   line size and replacement policy
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroAssociativity`] for zero ways,
    /// [`ConfigError::InvalidGeometry`] when the size does not split into a
    /// whole, non-zero number of sets, and any policy construction error.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        if config.ways == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        let geometry_error = || ConfigError::InvalidGeometry {
            size_bytes: config.size_bytes,
            line_bytes: config.line_bytes,
            ways: config.ways,
        };
        if config.line_bytes == 0 || config.size_bytes % config.line_bytes != 0 {
            return Err(geometry_error());
        }
        let num_lines = config.size_bytes / config.line_bytes;
        if num_lines == 0 || num_lines % config.ways != 0 {
            return Err(geometry_error());
        }
        let num_sets = num_lines / config.ways;

        let mut policy: Box<dyn ReplacementPolicy> = match config.policy {
            PolicyType::LruIpv => Box::new(LruIpvPolicy::from_config(config.ways, &config.lru_ipv)?),
            PolicyType::Lru => Box::new(LruPolicy::new(config.ways)?),
        };
        let entries: Vec<ReplacementEntry> =
            (0..num_lines).map(|_| policy.instantiate_entry()).collect();

        debug!(
            num_sets,
            ways = config.ways,
            line_bytes = config.line_bytes,
            policy = ?config.policy,
            "built cache"
        );

        Ok(Self {
            latency: config.latency,
            enabled: config.enabled,
            lines: vec![CacheLine::default(); num_lines],
            entries,
            num_sets,
            ways: config.ways,
            line_bytes: config.line_bytes,
            policy,
            stats: CacheStats::default(),
        })
    }

    /// Number of sets.
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Ways per set.
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Hit, miss and eviction counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Replacement entries of `set`, in slot order.
    ///
    /// # Panics
    ///
    /// Panics if `set` is not below [`CacheSim::num_sets`].
    pub fn set_entries(&self, set: usize) -> &[ReplacementEntry] {
        let base = set * self.ways;
        &self.entries[base..base + self.ways]
    }

    /// Splits an address into its set index and tag.
    fn locate(&self, addr: u64) -> (usize, u64) {
        let set_index = ((addr / self.line_bytes as u64) % self.num_sets as u64) as usize;
        let tag = addr / (self.line_bytes * self.num_sets) as u64;
        (set_index, tag)
    }

    /// Index into `lines` of the valid line holding `addr`, if any.
    fn find(&self, addr: u64) -> Option<usize> {
        let (set_index, tag) = self.locate(addr);
        let base_idx = set_index * self.ways;
        (base_idx..base_idx + self.ways)
            .find(|&idx| self.lines[idx].valid && self.lines[idx].tag == tag)
    }

    /// Checks if the cache contains the specified address.
    ///
    /// Does not update replacement state or statistics.
    pub fn contains(&self, addr: u64) -> bool {
        self.enabled && self.find(addr).is_some()
    }

    /// Installs a cache line for the specified address.
    ///
    /// Asks the policy for a victim among the set's entries and installs the
    /// new line in its way. Returns the write-back penalty if the victim was
    /// dirty.
    fn install_line(&mut self, addr: u64, is_write: bool, next_level_latency: u64) -> u64 {
        let (set_index, tag) = self.locate(addr);
        let base_idx = set_index * self.ways;

        let victim = *self
            .policy
            .select_victim(&self.entries[base_idx..base_idx + self.ways]);
        let victim_idx = base_idx + victim.slot();
        let mut penalty = 0;

        if self.lines[victim_idx].valid {
            self.stats.evictions += 1;
            if self.lines[victim_idx].dirty {
                self.stats.writebacks += 1;
                penalty += next_level_latency;
            }
        }

        self.lines[victim_idx] = CacheLine {
            tag,
            valid: true,
            dirty: is_write,
        };
        self.policy.reset(&victim);

        penalty
    }

    /// Accesses the cache for the specified address.
    ///
    /// On a hit the line's entry is touched. A resident line whose rank has
    /// aged out to the invalid sentinel is re-inserted with `reset` instead,
    /// since the policy only accepts touches on ranked lines. On a miss a
    /// victim is selected and replaced.
    ///
    /// # Returns
    ///
    /// A tuple `(hit, penalty)` where `penalty` is 0 on a hit and the
    /// write-back cost of a dirty victim on a miss.
    pub fn access(&mut self, addr: u64, is_write: bool, next_level_latency: u64) -> (bool, u64) {
        if !self.enabled {
            return (false, 0);
        }

        if let Some(idx) = self.find(addr) {
            let entry = self.entries[idx];
            if self.policy.is_resident(&entry) {
                self.policy.touch(&entry);
            } else {
                self.policy.reset(&entry);
            }
            if is_write {
                self.lines[idx].dirty = true;
            }
            self.stats.hits += 1;
            return (true, 0);
        }

        self.stats.misses += 1;
        let penalty = self.install_line(addr, is_write, next_level_latency);
        (false, penalty)
    }

    /// Invalidates the line holding `addr`.
    ///
    /// Returns `true` if a line was present. The line's data is dropped
    /// without write-back.
    pub fn invalidate(&mut self, addr: u64) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(idx) = self.find(addr) else {
            return false;
        };
        self.drop_line(idx);
        true
    }

    /// Flushes all dirty cache lines, invalidating them.
    ///
    /// Clean lines stay resident.
    pub fn flush(&mut self) {
        if !self.enabled {
            return;
        }
        for idx in 0..self.lines.len() {
            if self.lines[idx].valid && self.lines[idx].dirty {
                self.drop_line(idx);
            }
        }
    }

    fn drop_line(&mut self, idx: usize) {
        self.lines[idx] = CacheLine::default();
        let entry = self.entries[idx];
        self.policy.invalidate(&entry);
        self.stats.invalidations += 1;
    }
}
