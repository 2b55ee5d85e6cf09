//! Block-production admission gate
//!
//! Producing a block requires an "incrementor": a random 64-bit value that is
//! a non-zero multiple of a fixed divisor. The search is a pure rate-limiting
//! lottery — a candidate's validity is independent of block content, unlike a
//! hash-difficulty target — and the found value is folded into the produced
//! block's hash input.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Fixed consensus divisor; the expected number of draws per block.
pub const INCREMENTOR_DIVISOR: u64 = 128_457_181;

/// Draws between cancellation checks. Large enough that the yield is free,
/// small enough that cancellation lands promptly.
const DRAWS_PER_YIELD: u32 = 4096;

pub fn is_valid_incrementor(n: u64) -> bool {
    n != 0 && n % INCREMENTOR_DIVISOR == 0
}

/// Searches for a valid incrementor, yielding to the runtime between batches
/// of draws. Returns `None` without a result once `cancel` fires.
pub async fn find_incrementor(cancel: CancellationToken) -> Option<u64> {
    debug!("finding next incrementor");
    let mut rng = StdRng::from_entropy();
    loop {
        if cancel.is_cancelled() {
            return None;
        }
        for _ in 0..DRAWS_PER_YIELD {
            let candidate: u64 = rng.gen();
            if is_valid_incrementor(candidate) {
                return Some(candidate);
            }
        }
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incrementor_validity() {
        assert!(is_valid_incrementor(INCREMENTOR_DIVISOR));
        assert!(is_valid_incrementor(INCREMENTOR_DIVISOR * 3));
        assert!(!is_valid_incrementor(0));
        assert!(!is_valid_incrementor(1));
        assert!(!is_valid_incrementor(INCREMENTOR_DIVISOR + 1));
    }

    #[tokio::test]
    async fn test_search_stops_on_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(find_incrementor(cancel).await, None);
    }
}
