use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn make_cache(
    block_bits: u32,
    set_bits: u32,
    lines_per_set: usize,
    policy: ReplacementPolicy,
) -> Cache {
    Cache::new(CacheConfig {
        name: format!("b{block_bits}s{set_bits}e{lines_per_set}-{policy}"),
        block_bits,
        set_bits,
        lines_per_set,
        policy,
    })
    .expect("valid geometry")
}

fn check_invariants(cache: &Cache) {
    let geom = cache.geometry();
    for (set_idx, set) in cache.sets().iter().enumerate() {
        let mut seen = HashSet::new();
        for line in set.lines().iter().filter(|line| line.valid) {
            assert!(
                seen.insert(line.block_addr),
                "duplicate block {:#x} in set {set_idx}",
                line.block_addr
            );
            assert_eq!(geom.set_index(line.block_addr), set_idx);
            assert_eq!(geom.tag(line.block_addr), line.tag);
            assert_eq!(geom.block_address(line.block_addr), line.block_addr);
            assert!(line.last_touch <= set.clock());
            assert!(line.access_count >= 1);
        }
    }
    let stats = cache.stats();
    assert!(stats.evictions() <= stats.misses());
}

#[test]
fn scenario_two_sets_direct_mapped() {
    // 0 and 4 share set 0, 2 lives alone in set 1
    let mut cache = make_cache(1, 1, 1, ReplacementPolicy::Lru);
    let outcomes: Vec<_> = [0u64, 2, 0, 2, 4]
        .iter()
        .map(|&addr| cache.access(addr))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            AccessOutcome::Miss { inserted_block: 0 },
            AccessOutcome::Miss { inserted_block: 2 },
            AccessOutcome::Hit,
            AccessOutcome::Hit,
            AccessOutcome::Eviction {
                victim_block: 0,
                inserted_block: 4
            },
        ]
    );
    let summary = cache.teardown();
    assert_eq!((summary.hits, summary.misses, summary.evictions), (2, 3, 1));
}

#[test]
fn scenario_byte_blocks_route_by_low_bit() {
    let mut cache = make_cache(0, 1, 1, ReplacementPolicy::Lru);
    assert_eq!(cache.access(0), AccessOutcome::Miss { inserted_block: 0 });
    assert_eq!(cache.access(1), AccessOutcome::Miss { inserted_block: 1 });
    assert_eq!(cache.access(0), AccessOutcome::Hit);
    assert_eq!(cache.access(1), AccessOutcome::Hit);
    assert_eq!(
        cache.access(2),
        AccessOutcome::Eviction {
            victim_block: 0,
            inserted_block: 2
        }
    );
}

#[test]
fn lru_round_robin_evicts_oldest() {
    for k in 1..=6usize {
        let mut cache = make_cache(0, 0, k, ReplacementPolicy::Lru);
        let blocks = (k + 1) as u64;
        for i in 0..(blocks * 5) {
            let outcome = cache.access(i % blocks);
            if i < k as u64 {
                assert_eq!(outcome, AccessOutcome::Miss { inserted_block: i });
            } else {
                assert_eq!(
                    outcome,
                    AccessOutcome::Eviction {
                        victim_block: (i - k as u64) % blocks,
                        inserted_block: i % blocks,
                    },
                    "k={k} i={i}"
                );
            }
        }
        assert_eq!(cache.stats().hits(), 0);
    }
}

#[test]
fn lfu_keeps_frequently_hit_block() {
    let (a, b, c) = (0x100u64, 0x200u64, 0x300u64);
    let mut cache = make_cache(4, 0, 2, ReplacementPolicy::Lfu);
    cache.access(a);
    cache.access(b);
    for _ in 0..3 {
        assert_eq!(cache.access(a), AccessOutcome::Hit);
    }
    assert_eq!(
        cache.access(c),
        AccessOutcome::Eviction {
            victim_block: b,
            inserted_block: c
        }
    );
    assert_eq!(cache.access(a), AccessOutcome::Hit);
}

#[test]
fn lru_and_lfu_diverge_on_same_stream() {
    // A is hot but stale; B is cold but recent
    let stream = [0u64, 1, 0, 0, 1, 2];
    let mut lru = make_cache(0, 0, 2, ReplacementPolicy::Lru);
    let mut lfu = make_cache(0, 0, 2, ReplacementPolicy::Lfu);
    let mut last = (AccessOutcome::Hit, AccessOutcome::Hit);
    for &addr in &stream {
        last = (lru.access(addr), lfu.access(addr));
    }
    assert_eq!(
        last.0,
        AccessOutcome::Eviction {
            victim_block: 0,
            inserted_block: 2
        }
    );
    assert_eq!(
        last.1,
        AccessOutcome::Eviction {
            victim_block: 1,
            inserted_block: 2
        }
    );
}

#[test]
fn random_streams_hold_invariants() {
    let mut rng = StdRng::seed_from_u64(0xcac4e);
    for round in 0..40 {
        let block_bits = rng.gen_range(0..=4);
        let set_bits = rng.gen_range(0..=3);
        let ways = rng.gen_range(1..=4);
        let policy = if round % 2 == 0 {
            ReplacementPolicy::Lru
        } else {
            ReplacementPolicy::Lfu
        };
        let mut cache = make_cache(block_bits, set_bits, ways, policy);
        let span = 1u64 << (block_bits + set_bits + 3);

        // blocks currently resident, tracked independently of the cache
        let mut resident = HashSet::new();
        let mut prev = *cache.stats();
        for n in 1..=500u64 {
            let addr = rng.gen_range(0..span);
            let block = cache.geometry().block_address(addr);
            let expect_hit = resident.contains(&block);
            match cache.access(addr) {
                AccessOutcome::Hit => assert!(expect_hit, "hit on non-resident {block:#x}"),
                AccessOutcome::Miss { inserted_block } => {
                    assert!(!expect_hit);
                    assert_eq!(inserted_block, block);
                    resident.insert(block);
                }
                AccessOutcome::Eviction {
                    victim_block,
                    inserted_block,
                } => {
                    assert!(!expect_hit);
                    assert_eq!(inserted_block, block);
                    assert!(
                        resident.remove(&victim_block),
                        "victim {victim_block:#x} not resident"
                    );
                    assert_eq!(
                        cache.geometry().set_index(victim_block),
                        cache.geometry().set_index(block)
                    );
                    resident.insert(block);
                }
            }

            let stats = *cache.stats();
            assert!(stats.hits() >= prev.hits());
            assert!(stats.misses() >= prev.misses());
            assert!(stats.evictions() >= prev.evictions());
            assert_eq!(stats.accesses(), n);
            prev = stats;
            check_invariants(&cache);
        }
    }
}
