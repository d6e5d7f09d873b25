//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the cache line that has not been accessed for the longest time.
//! It maintains a usage stack for each set. When a line is touched or filled, it is
//! moved to the top (Most Recently Used position). Invalidated lines drop to the
//! bottom, which represents the Least Recently Used line.
//!
//! Serves as the baseline the IPV policy is measured against.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`, `reset()`, `invalidate()`: O(W) where W is the number of ways
//!   - `select_victim()`: O(C × W) where C is the number of candidates
//! - **Space Complexity:** O(S × W) where S is the number of sets
//! - **Hardware Cost:** High - requires priority encoding and shifting
//! - **Best Case:** Sequential/streaming accesses with good temporal locality
//! - **Worst Case:** Scanning patterns larger than cache capacity (thrashing)

use tracing::{debug, trace};

use super::{EntryAllocator, ReplacementEntry, ReplacementPolicy};
use crate::common::ConfigError;

/// Usage stack of one set. Index 0 is MRU, last index is LRU.
#[derive(Debug, Clone)]
struct UsageStack {
    order: Vec<usize>,
    resident: Vec<bool>,
}

impl UsageStack {
    fn new(ways: usize) -> Self {
        Self {
            order: (0..ways).collect(),
            resident: vec![false; ways],
        }
    }

    fn position(&self, slot: usize) -> usize {
        self.order
            .iter()
            .position(|&x| x == slot)
            .unwrap_or(self.order.len())
    }

    fn move_to_front(&mut self, slot: usize) {
        let pos = self.position(slot);
        if pos < self.order.len() {
            let _ = self.order.remove(pos);
        }
        self.order.insert(0, slot);
    }

    fn move_to_back(&mut self, slot: usize) {
        let pos = self.position(slot);
        if pos < self.order.len() {
            let _ = self.order.remove(pos);
        }
        self.order.push(slot);
    }
}

/// LRU Policy state.
#[derive(Debug, Clone)]
pub struct LruPolicy {
    ways: usize,
    /// A usage stack per set.
    usage: Vec<UsageStack>,
    allocator: EntryAllocator,
}

impl LruPolicy {
    /// Creates a new LRU policy instance for `ways`-way sets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroAssociativity`] when `ways` is zero.
    pub fn new(ways: usize) -> Result<Self, ConfigError> {
        if ways == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        debug!(ways, "created LRU policy");
        Ok(Self {
            ways,
            usage: Vec::new(),
            allocator: EntryAllocator::new(ways),
        })
    }

    /// Ways per set.
    pub fn associativity(&self) -> usize {
        self.ways
    }

    /// Recency position of `entry` within its set: 0 is MRU, `ways - 1` is LRU.
    ///
    /// # Panics
    ///
    /// Panics if `entry` names a set this policy never instantiated.
    pub fn position(&self, entry: &ReplacementEntry) -> usize {
        self.stack(entry).position(entry.slot())
    }

    fn stack(&self, entry: &ReplacementEntry) -> &UsageStack {
        match self.usage.get(entry.set()) {
            Some(stack) => stack,
            None => panic!("replacement entry names unknown set {}", entry.set()),
        }
    }

    fn stack_mut(&mut self, entry: &ReplacementEntry) -> &mut UsageStack {
        match self.usage.get_mut(entry.set()) {
            Some(stack) => stack,
            None => panic!("replacement entry names unknown set {}", entry.set()),
        }
    }
}

impl ReplacementPolicy for LruPolicy {
    fn instantiate_entry(&mut self) -> ReplacementEntry {
        let (entry, opens_set) = self.allocator.next();
        if opens_set {
            self.usage.push(UsageStack::new(self.ways));
        }
        entry
    }

    /// Moves the slot to the LRU end so it is evicted first.
    fn invalidate(&mut self, entry: &ReplacementEntry) {
        let stack = self.stack_mut(entry);
        stack.move_to_back(entry.slot());
        stack.resident[entry.slot()] = false;
        trace!(set = entry.set(), slot = entry.slot(), "invalidate");
    }

    /// Moves the accessed slot to the front of the usage stack (MRU position).
    fn touch(&mut self, entry: &ReplacementEntry) {
        self.stack_mut(entry).move_to_front(entry.slot());
        trace!(set = entry.set(), slot = entry.slot(), "touch");
    }

    /// A filled line also starts at MRU.
    fn reset(&mut self, entry: &ReplacementEntry) {
        let stack = self.stack_mut(entry);
        stack.move_to_front(entry.slot());
        stack.resident[entry.slot()] = true;
        trace!(set = entry.set(), slot = entry.slot(), "reset");
    }

    fn is_resident(&self, entry: &ReplacementEntry) -> bool {
        self.stack(entry).resident[entry.slot()]
    }

    /// Returns the candidate deepest in the usage stack.
    fn select_victim<'a>(&self, candidates: &'a [ReplacementEntry]) -> &'a ReplacementEntry {
        let Some((first, rest)) = candidates.split_first() else {
            panic!("victim selection needs at least one candidate");
        };
        let stack = self.stack(first);

        let mut victim = first;
        let mut deepest = stack.position(first.slot());
        for candidate in rest {
            let pos = stack.position(candidate.slot());
            if pos > deepest {
                deepest = pos;
                victim = candidate;
            }
        }
        victim
    }
}
