//! Constants shared by the replacement policies and the cache model.
//!
//! The promotion table and insertion rank below are the tuned values for a
//! 16-way set. They are part of the externally observable behavior of the
//! IPV policy: changing any entry changes every eviction decision.

/// Associativity the built-in promotion table was tuned for.
pub const IPV_ASSOCIATIVITY: usize = 16;

/// Built-in promotion table for 16-way sets.
///
/// Index is the physical slot number within the set; the value is the rank
/// that slot is promoted to when it is touched.
pub const IPV_PROMOTION_TABLE: [usize; IPV_ASSOCIATIVITY] =
    [0, 0, 1, 0, 3, 0, 3, 2, 1, 0, 5, 1, 0, 0, 4, 11];

/// Rank given to a newly inserted line.
///
/// The same for every slot; sits between the promotion targets and the
/// stale end of the ordering.
pub const IPV_INSERTION_RANK: usize = 8;
