// =============================================================================
// Request Budget — keeps Alpha Vantage calls under the per-minute quota
// =============================================================================
//
// Alpha Vantage's free tier allows 5 calls per minute; exceeding it yields an
// in-band "Note" instead of data. The budget counts calls per wall-clock
// minute. The minute and the count share one `AtomicU64` (minute in the high
// half, count in the low half), so a window roll and a reservation are a
// single compare-exchange and no reservation is ever lost to a reset.
// A spent budget makes the client fail fast, which the resolver treats like
// any other tier failure.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::{debug, warn};

const COUNT_MASK: u64 = 0xFFFF_FFFF;

/// Per-minute call counter. A limit of 0 disables the budget.
pub struct RequestBudget {
    limit_per_minute: u32,
    /// `(minute << 32) | used`.
    state: AtomicU64,
}

/// Serialisable view of the budget for the health endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSnapshot {
    pub limit_per_minute: u32,
    pub used_this_minute: u32,
}

fn pack(minute: u64, used: u32) -> u64 {
    ((minute & COUNT_MASK) << 32) | u64::from(used)
}

fn unpack(state: u64) -> (u64, u32) {
    (state >> 32, (state & COUNT_MASK) as u32)
}

impl RequestBudget {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            limit_per_minute,
            state: AtomicU64::new(pack(current_minute(), 0)),
        }
    }

    /// Reserve one call. Returns `false` when this minute's budget is spent.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(current_minute())
    }

    fn try_acquire_at(&self, minute: u64) -> bool {
        let minute = minute & COUNT_MASK;
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let (window, used) = unpack(current);
            let used = if window == minute { used } else { 0 };

            if self.limit_per_minute > 0 && used >= self.limit_per_minute {
                warn!(
                    used,
                    limit = self.limit_per_minute,
                    "call blocked — per-minute budget spent"
                );
                return false;
            }

            let next = pack(minute, used.saturating_add(1));
            match self.state.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    debug!(used = used + 1, limit = self.limit_per_minute, "budget reserved");
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    fn used_at(&self, minute: u64) -> u32 {
        let (window, used) = unpack(self.state.load(Ordering::Acquire));
        if window == minute & COUNT_MASK {
            used
        } else {
            0
        }
    }

    pub fn snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            limit_per_minute: self.limit_per_minute,
            used_this_minute: self.used_at(current_minute()),
        }
    }
}

impl std::fmt::Debug for RequestBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBudget")
            .field("limit_per_minute", &self.limit_per_minute)
            .field("used", &self.used_at(current_minute()))
            .finish()
    }
}

fn current_minute() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        / 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_limit_within_a_minute() {
        let budget = RequestBudget::new(2);
        assert!(budget.try_acquire_at(100));
        assert!(budget.try_acquire_at(100));
        assert!(!budget.try_acquire_at(100));
        assert!(!budget.try_acquire_at(100));
    }

    #[test]
    fn new_minute_resets_counter() {
        let budget = RequestBudget::new(1);
        assert!(budget.try_acquire_at(100));
        assert!(!budget.try_acquire_at(100));
        assert!(budget.try_acquire_at(101));
    }

    #[test]
    fn zero_limit_is_unlimited() {
        let budget = RequestBudget::new(0);
        for _ in 0..100 {
            assert!(budget.try_acquire_at(7));
        }
    }

    #[test]
    fn concurrent_acquires_never_exceed_limit() {
        use std::sync::Arc;
        use std::thread;

        let budget = Arc::new(RequestBudget::new(5));
        let minute = current_minute();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let b = budget.clone();
                thread::spawn(move || (0..50).filter(|_| b.try_acquire_at(minute)).count())
            })
            .collect();
        let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(granted, 5);
        assert_eq!(budget.used_at(minute), 5);
    }

    #[test]
    fn stale_window_reads_as_unused() {
        let budget = RequestBudget::new(3);
        assert!(budget.try_acquire_at(40));
        assert!(budget.try_acquire_at(40));
        assert_eq!(budget.used_at(40), 2);
        assert_eq!(budget.used_at(41), 0);
    }

    #[test]
    fn snapshot_reports_limit() {
        let budget = RequestBudget::new(5);
        assert!(budget.try_acquire());
        let snap = budget.snapshot();
        assert_eq!(snap.limit_per_minute, 5);
        assert!(snap.used_this_minute <= 1);
    }
}
