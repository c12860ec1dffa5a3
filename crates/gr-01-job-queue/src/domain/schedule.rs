//! Ordering keys for queued jobs.

use crate::domain::job::JobId;
use shared_types::Timestamp;
use std::cmp::Reverse;

/// Key for a job waiting on its `not_before` time.
///
/// Ordered by due time, then submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerKey {
    pub not_before: Timestamp,
    pub id: JobId,
}

/// Key for a job whose `not_before` has elapsed.
///
/// The smallest key runs next: highest priority, then earliest
/// `not_before`, then earliest submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReadyKey {
    pub priority: Reverse<i32>,
    pub not_before: Timestamp,
    pub id: JobId,
}

impl ReadyKey {
    pub fn new(priority: i32, not_before: Timestamp, id: JobId) -> Self {
        Self {
            priority: Reverse(priority),
            not_before,
            id,
        }
    }
}

/// Where a queued job currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Timed(TimerKey),
    Ready(ReadyKey),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_priority_wins_over_time() {
        let urgent = ReadyKey::new(10, 500, JobId(2));
        let early = ReadyKey::new(0, 100, JobId(1));
        assert!(urgent < early);
    }

    #[test]
    fn test_equal_priority_earliest_not_before_first() {
        let a = ReadyKey::new(5, 100, JobId(9));
        let b = ReadyKey::new(5, 200, JobId(1));
        assert!(a < b);
    }

    #[test]
    fn test_fifo_tiebreak() {
        let mut set = BTreeSet::new();
        set.insert(ReadyKey::new(1, 100, JobId(3)));
        set.insert(ReadyKey::new(1, 100, JobId(1)));
        set.insert(ReadyKey::new(1, 100, JobId(2)));
        let order: Vec<u64> = set.iter().map(|k| k.id.0).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_timer_key_order() {
        let a = TimerKey { not_before: 50, id: JobId(7) };
        let b = TimerKey { not_before: 60, id: JobId(1) };
        assert!(a < b);
    }
}
