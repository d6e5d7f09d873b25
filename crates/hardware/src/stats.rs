//! Cache statistics collection and reporting.
//!
//! This module tracks the outcome of every access the cache model serves:
//! hits, misses, evictions of valid lines, dirty write-backs and explicit
//! invalidations, plus derived hit/miss rates.

use std::fmt;

/// Counters for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Accesses that found their line resident.
    pub hits: u64,
    /// Accesses that had to install a line.
    pub misses: u64,
    /// Misses that replaced a valid line.
    pub evictions: u64,
    /// Evictions of dirty lines (each costs a next-level write).
    pub writebacks: u64,
    /// Lines dropped by `invalidate` or `flush`.
    pub invalidations: u64,
}

impl CacheStats {
    /// Total number of accesses served.
    pub const fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of accesses that hit, or 0.0 before any access.
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Fraction of accesses that missed, or 0.0 before any access.
    pub fn miss_rate(&self) -> f64 {
        if self.accesses() == 0 {
            0.0
        } else {
            1.0 - self.hit_rate()
        }
    }

    /// Prints the report to stdout.
    pub fn print(&self) {
        println!("{self}");
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "CACHE STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(f, "  accesses               {}", self.accesses())?;
        writeln!(f, "  hits                   {}", self.hits)?;
        writeln!(f, "  misses                 {}", self.misses)?;
        writeln!(f, "  miss_rate              {:.2}%", self.miss_rate() * 100.0)?;
        writeln!(f, "  evictions              {}", self.evictions)?;
        writeln!(f, "  writebacks             {}", self.writebacks)?;
        writeln!(f, "  invalidations          {}", self.invalidations)?;
        write!(f, "==========================================================")
    }
}
