//! Cache access statistics.
//!
//! Every bounded cache owns a [`CacheStats`] and updates it inside the
//! operations themselves; `stats()` hands out a `Copy` snapshot. Counters:
//!
//! | Counter          | Incremented when                                      |
//! |------------------|-------------------------------------------------------|
//! | `hit_count`      | `get` finds the key resident                          |
//! | `miss_count`     | `get` (or `get_or_insert_with`) finds nothing         |
//! | `soft_miss_count`| a miss was repaired in place by `get_or_insert_with`  |
//! | `eviction_count` | capacity pressure pushed an entry out                 |
//!
//! A soft miss always rides along with a miss, so `soft_miss_count <=
//! miss_count`. Explicit removals (`remove`, `pop_oldest`, `pop_lru`,
//! `clear`) touch no counter.

/// Hit/miss/eviction counters for a single cache instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found the key resident.
    pub hit_count: u64,
    /// Lookups that found nothing.
    pub miss_count: u64,
    /// Misses that were repaired in place by computing and inserting a value.
    pub soft_miss_count: u64,
    /// Entries pushed out by capacity pressure.
    pub eviction_count: u64,
}

impl CacheStats {
    /// Fresh zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total lookups observed.
    pub fn lookups(&self) -> u64 {
        self.hit_count + self.miss_count
    }

    /// Fraction of lookups that hit, in `[0.0, 1.0]`. Zero lookups is 0.0.
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }

    #[inline]
    pub(crate) fn record_hit(&mut self) {
        self.hit_count += 1;
    }

    #[inline]
    pub(crate) fn record_miss(&mut self) {
        self.miss_count += 1;
    }

    #[inline]
    pub(crate) fn record_soft_miss(&mut self) {
        self.soft_miss_count += 1;
    }

    #[inline]
    pub(crate) fn record_eviction(&mut self) {
        self.eviction_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.lookups(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_reflects_counters() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.lookups(), 4);
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn soft_miss_rides_with_miss() {
        let mut stats = CacheStats::new();
        stats.record_miss();
        stats.record_soft_miss();
        assert!(stats.soft_miss_count <= stats.miss_count);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut stats = CacheStats::new();
        let snap = stats;
        stats.record_eviction();
        assert_eq!(snap.eviction_count, 0);
        assert_eq!(stats.eviction_count, 1);
    }
}
