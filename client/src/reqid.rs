//! Process-wide `request-id` allocator.
//!
//! A single atomic counter, seeded once from `rand` at first use, shared by
//! every `Snmp` session in the process. Simpler than a per-session counter
//! and sufficient: uniqueness only needs to hold across the handful of
//! requests in flight at any moment, far short of a 31-bit wraparound.

use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// Allocate the next request id: non-negative, fits in 31 bits, never zero.
pub(crate) fn next_request_id() -> i32 {
    let counter = COUNTER.get_or_init(|| {
        let seed: u32 = rand::thread_rng().gen_range(1..=0x7fff_ffffu32);
        AtomicU32::new(seed)
    });
    loop {
        let id = counter.fetch_add(1, Ordering::Relaxed) & 0x7fff_ffff;
        if id != 0 {
            return id as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_nonnegative_and_monotonic_within_a_window() {
        let ids: Vec<i32> = (0..1000).map(|_| next_request_id()).collect();
        for &id in &ids {
            assert!(id > 0);
            assert!(id <= 0x7fff_ffff);
        }
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len(), "request ids must be unique across a short window");
    }
}
