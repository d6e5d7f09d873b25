//! Cache Replacement Policies.
//!
//! Implements algorithms for selecting victim lines in set-associative caches.
//! Policies keep their ordering state per set; the host cache holds one
//! [`ReplacementEntry`] per physical line and passes it back on every event.
//!
//! # Policies
//!
//! - `LruIpv`: LRU ordering steered by a per-slot insertion/promotion vector.
//! - `Lru`: Classic Least Recently Used.

/// Least Recently Used replacement policy.
pub mod lru;

/// LRU with insertion/promotion vector.
pub mod lru_ipv;

pub use lru::LruPolicy;
pub use lru_ipv::{LruIpvPolicy, PromotionTable, RecencyVector};

/// Identifies the shared ordering state of one cache set.
pub type SetId = usize;

/// Per-line replacement handle.
///
/// Names the set whose ordering state the line shares and the line's
/// physical slot within that set. Created once per line by
/// [`ReplacementPolicy::instantiate_entry`] and never moved to another set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplacementEntry {
    set: SetId,
    slot: usize,
}

impl ReplacementEntry {
    /// Set whose ordering state this entry indexes into.
    #[inline]
    pub const fn set(&self) -> SetId {
        self.set
    }

    /// Physical slot (way) of this entry within its set.
    #[inline]
    pub const fn slot(&self) -> usize {
        self.slot
    }
}

/// Hands out entries in slot order, opening a new set every `ways` entries.
#[derive(Debug, Clone)]
pub(crate) struct EntryAllocator {
    ways: usize,
    created: usize,
}

impl EntryAllocator {
    pub(crate) const fn new(ways: usize) -> Self {
        Self { ways, created: 0 }
    }

    /// Returns the next entry and whether it opens a new set.
    pub(crate) const fn next(&mut self) -> (ReplacementEntry, bool) {
        let opens_set = self.created % self.ways == 0;
        let entry = ReplacementEntry {
            set: self.created / self.ways,
            slot: self.created % self.ways,
        };
        self.created += 1;
        (entry, opens_set)
    }
}

/// Trait for cache replacement policies.
///
/// The host cache calls `instantiate_entry` once per physical line in slot
/// order, `reset` when a line is filled, `touch` on every hit, `invalidate`
/// when a line is dropped, and `select_victim` when a set is full.
/// Calls against one set must be serialized by the host.
pub trait ReplacementPolicy: Send + Sync + std::fmt::Debug {
    /// Creates the replacement handle for the next physical line.
    fn instantiate_entry(&mut self) -> ReplacementEntry;

    /// Marks the entry's line as the preferred victim of its set.
    fn invalidate(&mut self, entry: &ReplacementEntry);

    /// Updates ordering state for a hit on a resident line.
    fn touch(&mut self, entry: &ReplacementEntry);

    /// Updates ordering state for a line that was just filled.
    fn reset(&mut self, entry: &ReplacementEntry);

    /// Returns whether the policy currently orders the entry as a resident line.
    ///
    /// The host uses this to decide between `touch` and `reset` on a hit.
    fn is_resident(&self, entry: &ReplacementEntry) -> bool;

    /// Selects the victim among `candidates`, all drawn from one set.
    ///
    /// # Panics
    ///
    /// Panics if `candidates` is empty.
    fn select_victim<'a>(&self, candidates: &'a [ReplacementEntry]) -> &'a ReplacementEntry;
}
