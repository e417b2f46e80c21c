//! Todo id sources.
//!
//! # Invariants
//! - Every generator yields strictly increasing ids within one instance.

use crate::model::todo::TodoId;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of fresh todo ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> TodoId;
}

/// Wall-clock based ids (epoch milliseconds), bumped when the clock stalls.
#[derive(Debug, Clone)]
pub struct ClockIdGenerator {
    clock: fn() -> i64,
    last: Option<TodoId>,
}

impl Default for ClockIdGenerator {
    fn default() -> Self {
        Self::with_clock(epoch_millis)
    }
}

impl ClockIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom millisecond clock.
    pub fn with_clock(clock: fn() -> i64) -> Self {
        Self { clock, last: None }
    }
}

impl IdGenerator for ClockIdGenerator {
    fn next_id(&mut self) -> TodoId {
        let now = (self.clock)();
        let id = match self.last {
            Some(last) if now <= last => last.saturating_add(1),
            _ => now,
        };
        self.last = Some(id);
        id
    }
}

/// Deterministic counter, mainly for tests and replay.
#[derive(Debug, Clone)]
pub struct SequenceIdGenerator {
    next: TodoId,
}

impl SequenceIdGenerator {
    pub fn starting_at(first: TodoId) -> Self {
        Self { next: first }
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn next_id(&mut self) -> TodoId {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::{ClockIdGenerator, IdGenerator, SequenceIdGenerator};

    #[test]
    fn clock_ids_increase_even_when_clock_stalls() {
        let mut ids = ClockIdGenerator::with_clock(|| 1_700_000_000_000);
        let first = ids.next_id();
        let second = ids.next_id();
        let third = ids.next_id();
        assert_eq!(first, 1_700_000_000_000);
        assert_eq!(second, first + 1);
        assert_eq!(third, first + 2);
    }

    #[test]
    fn clock_ids_increase_when_clock_goes_backwards() {
        use std::sync::atomic::{AtomicI64, Ordering};
        static NOW: AtomicI64 = AtomicI64::new(500);
        let mut ids = ClockIdGenerator::with_clock(|| NOW.fetch_sub(100, Ordering::SeqCst));
        let first = ids.next_id();
        let second = ids.next_id();
        assert_eq!(first, 500);
        assert_eq!(second, 501);
    }

    #[test]
    fn real_clock_ids_are_strictly_monotonic() {
        let mut ids = ClockIdGenerator::new();
        let generated: Vec<_> = (0..50).map(|_| ids.next_id()).collect();
        assert!(generated.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn sequence_counts_up() {
        let mut ids = SequenceIdGenerator::starting_at(10);
        assert_eq!((ids.next_id(), ids.next_id()), (10, 11));
    }
}
