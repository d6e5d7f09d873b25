//! LRU Replacement with an Insertion/Promotion Vector (IPV).
//!
//! A variant of LRU in which a touched line is not always promoted to MRU.
//! Each physical slot has its own promotion target, read from a fixed
//! [`PromotionTable`], and newly filled lines start at a fixed insertion rank
//! in the middle of the ordering. Together these approximate a tuned
//! re-reference prediction curve.
//!
//! Every set owns one [`RecencyVector`] holding the rank of each of its
//! slots. Lower ranks are fresher; the sentinel rank `associativity` marks a
//! slot with no line and is strictly above every valid rank, so victim
//! selection is a plain "pick the maximum" scan.
//!
//! Recency vectors live in an arena indexed by [`SetId`]; entries refer to
//! their set by id rather than holding a reference.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`, `reset()`: O(W) where W is the number of ways
//!   - `invalidate()`: O(1)
//!   - `select_victim()`: O(C) where C is the number of candidates
//! - **Space Complexity:** O(S × W) ranks where S is the number of sets
//! - **Hardware Cost:** High - every access may shift every rank in the set
//!
//! # Ordering rules
//!
//! - `touch`: ranks in `[target, old)` shift stale-ward by one and the
//!   touched slot takes `target`.
//! - `reset`: every valid rank `>= insertion_rank` shifts by one and the
//!   filled slot takes `insertion_rank`. Invalid slots are never shifted.
//!
//! The two rules use different bounds, so valid ranks are not guaranteed to
//! stay a strict permutation: duplicates can appear, and a valid rank at
//! `associativity - 1` shifted by `reset` lands on the sentinel.

use tracing::{debug, trace};

use super::{EntryAllocator, ReplacementEntry, ReplacementPolicy, SetId};
use crate::common::{ConfigError, IPV_ASSOCIATIVITY, IPV_INSERTION_RANK, IPV_PROMOTION_TABLE};
use crate::config::LruIpvConfig;

/// Fixed per-slot promotion targets.
///
/// Entry `i` is the rank physical slot `i` is promoted to when touched.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionTable {
    targets: Box<[usize]>,
}

impl PromotionTable {
    /// Builds a table for `associativity`-way sets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroAssociativity`] for zero ways,
    /// [`ConfigError::PromotionTableLength`] when `targets` does not hold one
    /// entry per way, and [`ConfigError::PromotionRankOutOfRange`] when a
    /// target is not a valid rank.
    pub fn new(targets: Vec<usize>, associativity: usize) -> Result<Self, ConfigError> {
        if associativity == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        if targets.len() != associativity {
            return Err(ConfigError::PromotionTableLength {
                expected: associativity,
                actual: targets.len(),
            });
        }
        if let Some((slot, &rank)) = targets
            .iter()
            .enumerate()
            .find(|&(_, &rank)| rank >= associativity)
        {
            return Err(ConfigError::PromotionRankOutOfRange {
                slot,
                rank,
                associativity,
            });
        }
        Ok(Self {
            targets: targets.into_boxed_slice(),
        })
    }

    /// Returns the built-in table, which only exists for 16-way sets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroAssociativity`] for zero ways and
    /// [`ConfigError::MissingPromotionTable`] for any size other than 16.
    pub fn builtin(associativity: usize) -> Result<Self, ConfigError> {
        match associativity {
            0 => Err(ConfigError::ZeroAssociativity),
            IPV_ASSOCIATIVITY => Ok(Self::default()),
            _ => Err(ConfigError::MissingPromotionTable { associativity }),
        }
    }

    /// Promotion target of `slot`.
    #[inline]
    pub fn target(&self, slot: usize) -> usize {
        self.targets[slot]
    }

    /// Number of ways the table covers.
    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Always false for a validated table; present for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// The targets in slot order.
    pub fn as_slice(&self) -> &[usize] {
        &self.targets
    }
}

impl Default for PromotionTable {
    /// The built-in 16-way table.
    fn default() -> Self {
        Self {
            targets: Box::new(IPV_PROMOTION_TABLE),
        }
    }
}

/// Ranks of every slot in one set.
///
/// A rank is either valid, in `[0, associativity)`, or the invalid sentinel
/// equal to `associativity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecencyVector {
    ranks: Box<[usize]>,
}

impl RecencyVector {
    /// A vector for `associativity` slots, all invalid.
    fn new(associativity: usize) -> Self {
        Self {
            ranks: vec![associativity; associativity].into_boxed_slice(),
        }
    }

    /// The sentinel rank of an empty slot.
    #[inline]
    pub fn invalid_rank(&self) -> usize {
        self.ranks.len()
    }

    /// Current rank of `slot`.
    #[inline]
    pub fn rank(&self, slot: usize) -> usize {
        self.ranks[slot]
    }

    /// Whether `slot` holds the invalid sentinel.
    #[inline]
    pub fn is_invalid(&self, slot: usize) -> bool {
        self.rank(slot) == self.invalid_rank()
    }

    /// All ranks in slot order.
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    fn invalidate(&mut self, slot: usize) {
        self.ranks[slot] = self.invalid_rank();
    }

    fn promote(&mut self, slot: usize, target: usize) {
        let old = self.ranks[slot];
        let max_valid = self.invalid_rank() - 1;
        for rank in self.ranks.iter_mut().filter(|rank| (target..old).contains(&**rank)) {
            *rank += 1;
            debug_assert!(
                *rank <= max_valid,
                "promotion shifted a rank to {rank}, past the stalest valid rank {max_valid}"
            );
        }
        self.ranks[slot] = target;
    }

    fn insert(&mut self, slot: usize, insertion_rank: usize) {
        let invalid = self.invalid_rank();
        for rank in self
            .ranks
            .iter_mut()
            .filter(|rank| **rank >= insertion_rank && **rank != invalid)
        {
            *rank += 1;
        }
        self.ranks[slot] = insertion_rank;
    }
}

/// IPV-steered LRU policy state.
#[derive(Debug, Clone)]
pub struct LruIpvPolicy {
    promotion: PromotionTable,
    insertion_rank: usize,
    /// One recency vector per set, indexed by `SetId`.
    sets: Vec<RecencyVector>,
    allocator: EntryAllocator,
}

impl LruIpvPolicy {
    /// Creates a policy whose associativity is the length of `promotion`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InsertionRankOutOfRange`] when `insertion_rank`
    /// is not a valid rank for the table's associativity.
    pub fn new(promotion: PromotionTable, insertion_rank: usize) -> Result<Self, ConfigError> {
        let associativity = promotion.len();
        if insertion_rank >= associativity {
            return Err(ConfigError::InsertionRankOutOfRange {
                rank: insertion_rank,
                associativity,
            });
        }
        debug!(
            associativity,
            insertion_rank,
            table = ?promotion.as_slice(),
            "created LRU-IPV policy"
        );
        Ok(Self {
            promotion,
            insertion_rank,
            sets: Vec::new(),
            allocator: EntryAllocator::new(associativity),
        })
    }

    /// Creates a policy for `ways`-way sets from configuration.
    ///
    /// Uses the configured promotion table, or the built-in one when none is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns any error from [`PromotionTable::new`],
    /// [`PromotionTable::builtin`] or [`LruIpvPolicy::new`].
    pub fn from_config(ways: usize, config: &LruIpvConfig) -> Result<Self, ConfigError> {
        let promotion = match &config.promotion_table {
            Some(targets) => PromotionTable::new(targets.clone(), ways)?,
            None => PromotionTable::builtin(ways)?,
        };
        Self::new(promotion, config.insertion_rank)
    }

    /// Ways per set.
    #[inline]
    pub fn associativity(&self) -> usize {
        self.promotion.len()
    }

    /// Sentinel rank of an empty slot (equal to the associativity).
    #[inline]
    pub fn invalid_rank(&self) -> usize {
        self.associativity()
    }

    /// Rank given to newly filled lines.
    #[inline]
    pub fn insertion_rank(&self) -> usize {
        self.insertion_rank
    }

    /// The per-slot promotion targets.
    pub fn promotion_table(&self) -> &PromotionTable {
        &self.promotion
    }

    /// Number of sets instantiated so far.
    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    /// Recency vector of `set`, if that set has been instantiated.
    pub fn recency(&self, set: SetId) -> Option<&RecencyVector> {
        self.sets.get(set)
    }

    /// Current rank of `entry`'s slot.
    ///
    /// # Panics
    ///
    /// Panics if `entry` names a set this policy never instantiated.
    pub fn rank(&self, entry: &ReplacementEntry) -> usize {
        self.vector(entry).rank(entry.slot())
    }

    fn vector(&self, entry: &ReplacementEntry) -> &RecencyVector {
        match self.sets.get(entry.set()) {
            Some(vector) => vector,
            None => panic!(
                "replacement entry names set {} but only {} sets exist",
                entry.set(),
                self.sets.len()
            ),
        }
    }

    fn vector_mut(&mut self, entry: &ReplacementEntry) -> &mut RecencyVector {
        let num_sets = self.sets.len();
        match self.sets.get_mut(entry.set()) {
            Some(vector) => vector,
            None => panic!(
                "replacement entry names set {} but only {num_sets} sets exist",
                entry.set()
            ),
        }
    }
}

impl Default for LruIpvPolicy {
    /// A 16-way policy with the built-in table and insertion rank.
    fn default() -> Self {
        Self {
            promotion: PromotionTable::default(),
            insertion_rank: IPV_INSERTION_RANK,
            sets: Vec::new(),
            allocator: EntryAllocator::new(IPV_ASSOCIATIVITY),
        }
    }
}

impl ReplacementPolicy for LruIpvPolicy {
    /// Creates the entry for the next physical slot.
    ///
    /// Every `associativity` calls a fresh all-invalid recency vector is
    /// allocated; the entries in between share it.
    fn instantiate_entry(&mut self) -> ReplacementEntry {
        let (entry, opens_set) = self.allocator.next();
        if opens_set {
            self.sets.push(RecencyVector::new(self.associativity()));
            debug!(set = entry.set(), "allocated recency vector");
        }
        entry
    }

    /// Sets the slot's rank to the invalid sentinel. Other slots keep their ranks.
    fn invalidate(&mut self, entry: &ReplacementEntry) {
        self.vector_mut(entry).invalidate(entry.slot());
        trace!(set = entry.set(), slot = entry.slot(), "invalidate");
    }

    /// Promotes the slot to its promotion target.
    ///
    /// # Panics
    ///
    /// Panics if the slot holds the invalid sentinel: only resident lines
    /// may be touched.
    fn touch(&mut self, entry: &ReplacementEntry) {
        let target = self.promotion.target(entry.slot());
        let vector = self.vector_mut(entry);
        let old = vector.rank(entry.slot());
        assert!(
            old != vector.invalid_rank(),
            "touch on slot {} of set {} which holds no resident line",
            entry.slot(),
            entry.set()
        );
        vector.promote(entry.slot(), target);
        trace!(set = entry.set(), slot = entry.slot(), old, target, "touch");
    }

    /// Places a freshly filled slot at the insertion rank.
    fn reset(&mut self, entry: &ReplacementEntry) {
        let insertion_rank = self.insertion_rank;
        self.vector_mut(entry).insert(entry.slot(), insertion_rank);
        trace!(
            set = entry.set(),
            slot = entry.slot(),
            rank = insertion_rank,
            "reset"
        );
    }

    fn is_resident(&self, entry: &ReplacementEntry) -> bool {
        !self.vector(entry).is_invalid(entry.slot())
    }

    /// Picks the candidate with the highest rank.
    ///
    /// Ties go to the first candidate in `candidates` order, so among several
    /// invalid slots the earliest listed one is chosen.
    fn select_victim<'a>(&self, candidates: &'a [ReplacementEntry]) -> &'a ReplacementEntry {
        let Some((first, rest)) = candidates.split_first() else {
            panic!("victim selection needs at least one candidate");
        };
        let vector = self.vector(first);

        let mut victim = first;
        let mut max_rank = vector.rank(first.slot());
        for candidate in rest {
            debug_assert_eq!(
                candidate.set(),
                first.set(),
                "victim candidates must come from one set"
            );
            let rank = vector.rank(candidate.slot());
            if rank > max_rank {
                max_rank = rank;
                victim = candidate;
            }
        }

        trace!(
            set = victim.set(),
            slot = victim.slot(),
            rank = max_rank,
            "select victim"
        );
        victim
    }
}
