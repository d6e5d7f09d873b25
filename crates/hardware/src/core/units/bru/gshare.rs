//! Global History Branch Predictor.
//!
//! Correlates per-thread global branch history with the branch address to
//! index a Pattern History Table of saturating counters. Two index hashes
//! are supported:
//! - `Xor`: classic gshare, `pc_bits ^ history_bits`.
//! - `Nand`: `!(pc_bits & history_bits)`, masked to the table size.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `lookup()`: O(1)
//!   - `update()`: O(1)
//! - **Space Complexity:** O(N) counters where N is the configured table size
//! - **Hardware Cost:** Moderate - single PHT lookup, hash, and counter update
//! - **Best Case:** Correlated branches where outcome depends on recent history
//! - **Worst Case:** Uncorrelated branches or history length too short/long for pattern

use tracing::{debug, trace};

use super::{BranchHistory, BranchPredictor};
use crate::common::ConfigError;
use crate::config::{BranchPredictorConfig, IndexHash};

/// Saturating up/down counter of 1 to 8 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatCounter {
    value: u8,
    max: u8,
}

impl SatCounter {
    /// A counter of `bits` width starting at zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CounterBitsOutOfRange`] unless `1 <= bits <= 8`.
    pub fn new(bits: u32) -> Result<Self, ConfigError> {
        if !(1..=8).contains(&bits) {
            return Err(ConfigError::CounterBitsOutOfRange(bits));
        }
        Ok(Self {
            value: 0,
            max: ((1u16 << bits) - 1) as u8,
        })
    }

    /// Current count.
    #[inline]
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// Largest representable count.
    #[inline]
    pub const fn max(&self) -> u8 {
        self.max
    }

    /// Increments, saturating at the maximum.
    #[inline]
    pub const fn increment(&mut self) {
        if self.value < self.max {
            self.value += 1;
        }
    }

    /// Decrements, saturating at zero.
    #[inline]
    pub const fn decrement(&mut self) {
        self.value = self.value.saturating_sub(1);
    }
}

/// Global history predictor state.
#[derive(Debug, Clone)]
pub struct GSharePredictor {
    hash: IndexHash,
    /// Global History Register per hardware thread.
    ghr: Vec<u64>,
    history_mask: u64,
    /// Mask selecting a PHT index; the table size minus one.
    index_mask: u64,
    inst_shift_amt: u32,
    /// Pattern History Table.
    pht: Vec<SatCounter>,
    /// Counters above this value predict taken.
    taken_threshold: u8,
}

impl GSharePredictor {
    /// Creates a predictor from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroThreads`],
    /// [`ConfigError::PredictorSizeNotPowerOfTwo`],
    /// [`ConfigError::CounterBitsOutOfRange`] or
    /// [`ConfigError::HistoryBitsOutOfRange`] for invalid sizing.
    pub fn new(config: &BranchPredictorConfig) -> Result<Self, ConfigError> {
        if config.num_threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if !config.predictor_size.is_power_of_two() {
            return Err(ConfigError::PredictorSizeNotPowerOfTwo(config.predictor_size));
        }
        if !(1..=64).contains(&config.global_history_bits) {
            return Err(ConfigError::HistoryBitsOutOfRange(config.global_history_bits));
        }
        let counter = SatCounter::new(config.counter_bits)?;

        let history_mask = if config.global_history_bits == 64 {
            u64::MAX
        } else {
            (1u64 << config.global_history_bits) - 1
        };

        debug!(
            hash = ?config.hash,
            threads = config.num_threads,
            history_bits = config.global_history_bits,
            size = config.predictor_size,
            counter_bits = config.counter_bits,
            "created global history predictor"
        );

        Ok(Self {
            hash: config.hash,
            ghr: vec![0; config.num_threads],
            history_mask,
            index_mask: config.predictor_size as u64 - 1,
            inst_shift_amt: config.inst_shift_amt,
            pht: vec![counter; config.predictor_size],
            taken_threshold: (1u8 << (config.counter_bits - 1)) - 1,
        })
    }

    /// Current global history register of `tid`.
    pub fn global_history(&self, tid: usize) -> u64 {
        self.ghr[tid]
    }

    /// PHT index for a branch at `pc` under `global_history`.
    pub fn index(&self, pc: u64, global_history: u64) -> usize {
        let pc_part = pc.checked_shr(self.inst_shift_amt).unwrap_or(0) & self.index_mask;
        let ghr_part = global_history & self.index_mask;
        let idx = match self.hash {
            IndexHash::Nand => !(pc_part & ghr_part) & self.index_mask,
            IndexHash::Xor => pc_part ^ ghr_part,
        };
        idx as usize
    }

    /// Counter at PHT `index`.
    pub fn counter(&self, index: usize) -> SatCounter {
        self.pht[index]
    }

    fn shift_history(&mut self, tid: usize, taken: bool) {
        self.ghr[tid] = ((self.ghr[tid] << 1) | u64::from(taken)) & self.history_mask;
    }
}

impl BranchPredictor for GSharePredictor {
    fn lookup(&mut self, tid: usize, pc: u64) -> (bool, BranchHistory) {
        let history = self.ghr[tid];
        let idx = self.index(pc, history);
        let taken = self.pht[idx].value() > self.taken_threshold;

        self.shift_history(tid, taken);
        trace!(tid, pc, idx, taken, "branch lookup");

        (
            taken,
            BranchHistory {
                global_history: history,
                predicted_taken: taken,
            },
        )
    }

    fn uncond_branch(&mut self, tid: usize, _pc: u64) -> BranchHistory {
        let history = BranchHistory {
            global_history: self.ghr[tid],
            predicted_taken: true,
        };
        self.shift_history(tid, true);
        history
    }

    /// Clears the speculative bit shifted in by `lookup`.
    fn btb_update(&mut self, tid: usize, _pc: u64, _history: &mut BranchHistory) {
        self.ghr[tid] &= self.history_mask & !1;
    }

    /// Moves the counter toward the resolved direction, indexed with the
    /// snapshot history. The history register itself was already updated
    /// speculatively at lookup.
    fn update(&mut self, tid: usize, pc: u64, taken: bool, history: BranchHistory, squashed: bool) {
        if squashed {
            self.ghr[tid] = ((history.global_history << 1) | u64::from(taken)) & self.history_mask;
            return;
        }

        let idx = self.index(pc, history.global_history);
        if taken {
            self.pht[idx].increment();
        } else {
            self.pht[idx].decrement();
        }
        trace!(
            tid,
            pc,
            idx,
            taken,
            predicted = history.predicted_taken,
            "branch update"
        );
    }

    fn squash(&mut self, tid: usize, history: BranchHistory) {
        self.ghr[tid] = history.global_history;
    }
}
