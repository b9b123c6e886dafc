// ==============================================
// CACHE POLICY INVARIANT TESTS (integration)
// ==============================================
//
// Exercises both eviction policies through the public trait surface and
// validates structural invariants after randomized churn.

use mapkit::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ==============================================
// Capacity and construction
// ==============================================

mod construction {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected_everywhere() {
        assert!(LriCache::<u64, u64>::try_new(0).is_err());
        assert!(LruCache::<u64, u64>::try_new(0).is_err());
        #[cfg(feature = "concurrency")]
        assert!(ConcurrentLruCache::<u64, u64>::try_new(0).is_err());
        assert!(CacheBuilder::new(0)
            .try_build::<u64, u64>(EvictionPolicy::InsertionOrder)
            .is_err());
    }

    #[test]
    fn capacity_one_still_works() {
        let mut cache = LruCache::new(1);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&"b"));
        cache.check_invariants().unwrap();
    }
}

// ==============================================
// Insertion-order policy
// ==============================================

mod insertion_order {
    use super::*;

    #[test]
    fn eviction_follows_insertion_order_regardless_of_reads() {
        let mut cache = LriCache::new(3);
        cache.insert(1u64, "one");
        cache.insert(2, "two");
        cache.insert(3, "three");

        // Heavy reads must not protect anything.
        for _ in 0..10 {
            cache.get(&1);
            cache.get(&2);
        }

        cache.insert(4, "four"); // evicts 1
        cache.insert(5, "five"); // evicts 2

        assert!(!cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
        assert!(cache.contains(&4));
        assert!(cache.contains(&5));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn trait_object_usage() {
        fn fill<C: InsertionOrderCache<u64, u64>>(cache: &mut C) {
            for i in 0..20 {
                cache.insert(i, i * 10);
            }
        }

        let mut cache = LriCache::new(5);
        fill(&mut cache);
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.peek_oldest(), Some((&15, &150)));
        assert_eq!(cache.pop_oldest(), Some((15, 150)));
    }
}

// ==============================================
// Recency policy
// ==============================================

mod recency {
    use super::*;

    #[test]
    fn hot_keys_survive_a_scan() {
        let mut cache = LruCache::new(4);
        cache.insert(0u64, 0u64);
        cache.insert(1, 1);

        // Keep 0 and 1 hot while scanning through cold keys.
        for i in 2..100 {
            cache.get(&0);
            cache.get(&1);
            cache.insert(i, i);
        }

        assert!(cache.contains(&0));
        assert!(cache.contains(&1));
        assert_eq!(cache.len(), 4);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn trait_object_usage() {
        fn warm<C: RecencyCache<u64, u64>>(cache: &mut C) {
            cache.insert(1, 1);
            cache.insert(2, 2);
            cache.touch(&1);
        }

        let mut cache = LruCache::new(2);
        warm(&mut cache);
        assert_eq!(cache.peek_lru(), Some((&2, &2)));
    }
}

// ==============================================
// Randomized churn
// ==============================================
//
// Drives a mixed workload and validates the structural invariants after
// every batch. Seeded so failures reproduce.

mod churn {
    use super::*;

    #[test]
    fn randomized_workload_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let mut lri = LriCache::new(32);
        let mut lru = LruCache::new(32);

        for batch in 0..100 {
            for _ in 0..50 {
                let key: u64 = rng.gen_range(0..128);
                match rng.gen_range(0..5) {
                    0 | 1 => {
                        lri.insert(key, batch);
                        lru.insert(key, batch);
                    }
                    2 => {
                        lri.get(&key);
                        lru.get(&key);
                    }
                    3 => {
                        lri.remove(&key);
                        lru.remove(&key);
                    }
                    _ => {
                        lri.get_or_insert_with(key, || batch);
                        lru.get_or_insert_with(key, || batch);
                    }
                }
            }

            assert!(lri.len() <= lri.capacity());
            assert!(lru.len() <= lru.capacity());
            lri.check_invariants().unwrap();
            lru.check_invariants().unwrap();
        }

        // Counters stay coherent under mixed traffic.
        for stats in [lri.stats(), lru.stats()] {
            assert!(stats.soft_miss_count <= stats.miss_count);
            assert!(stats.hit_rate() >= 0.0 && stats.hit_rate() <= 1.0);
        }
    }
}
