//! Branch Predictor Interface.
//!
//! This module defines the `BranchPredictor` trait for direction predictors
//! that speculate on global history. Every prediction hands back a
//! [`BranchHistory`] snapshot; the caller returns it when the branch
//! resolves (`update`) or is squashed (`squash`), so speculative history can
//! be repaired.

/// Global history snapshot taken when a branch is predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchHistory {
    /// Global history register before the prediction was shifted in.
    pub global_history: u64,
    /// Direction that was predicted.
    pub predicted_taken: bool,
}

/// Trait for global-history direction predictors.
///
/// `tid` selects the hardware thread whose history register is used.
/// All methods panic if `tid` is not below the configured thread count.
pub trait BranchPredictor {
    /// Predicts the direction of a conditional branch at `pc`.
    ///
    /// The prediction is shifted into the thread's history speculatively.
    ///
    /// # Returns
    ///
    /// The predicted direction and the snapshot to hand back on resolution.
    fn lookup(&mut self, tid: usize, pc: u64) -> (bool, BranchHistory);

    /// Records an unconditional branch, which is always taken.
    fn uncond_branch(&mut self, tid: usize, pc: u64) -> BranchHistory;

    /// Called when the target buffer missed for `pc`: the branch is treated
    /// as not taken and the speculative history bit is cleared.
    fn btb_update(&mut self, tid: usize, pc: u64, history: &mut BranchHistory);

    /// Trains the predictor with the resolved outcome.
    ///
    /// When `squashed` is set the counters are left alone and only the
    /// history register is repaired from the snapshot.
    fn update(&mut self, tid: usize, pc: u64, taken: bool, history: BranchHistory, squashed: bool);

    /// Restores the history register from a squashed prediction's snapshot.
    fn squash(&mut self, tid: usize, history: BranchHistory);
}
