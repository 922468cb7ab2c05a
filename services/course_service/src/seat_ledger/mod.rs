//! Authoritative remaining-seat counters.
//!
//! The ledger is the only writer of a course's `seats_remaining`. Every change goes through
//! [`SeatLedger::adjust_seats`], which applies a delta atomically in the backing store; callers never compute
//! a new count themselves and write it back.

pub mod ddb_ledger;

use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use ddb_ledger::DdbSeatLedger;

#[derive(Debug, Error)]
pub enum SeatLedgerError {
    #[error("Course not found.")]
    NotFound,

    #[error("Cannot adjust seats by {delta}: only {remaining} remaining.")]
    Capacity { remaining: u32, delta: i32 },

    #[error(transparent)]
    Datastore(#[from] Box<dyn Error + Send + Sync>),
}

#[async_trait]
pub trait SeatLedger: Send + Sync {
    /// Current number of remaining seats, read with strong consistency.
    async fn seats(&self, course_id: &Uuid) -> Result<u32, SeatLedgerError>;

    /// Atomically applies `seats_remaining += delta` and returns the new count.
    ///
    /// Fails with [`SeatLedgerError::Capacity`] without changing anything if the count would become negative.
    async fn adjust_seats(&self, course_id: &Uuid, delta: i32) -> Result<u32, SeatLedgerError>;
}

/// Applies `delta` to `remaining`, refusing to go below zero or past `u32::MAX`.
pub(crate) fn apply_delta(remaining: u32, delta: i32) -> Option<u32> {
    if delta < 0 {
        remaining.checked_sub(delta.unsigned_abs())
    } else {
        remaining.checked_add(delta.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::apply_delta;

    #[rstest]
    #[case(10, -1, Some(9))]
    #[case(1, -1, Some(0))]
    #[case(0, -1, None)]
    #[case(0, 1, Some(1))]
    #[case(3, -5, None)]
    #[case(u32::MAX, 1, None)]
    fn seat_arithmetic_never_goes_negative(#[case] remaining: u32, #[case] delta: i32, #[case] expected: Option<u32>) {
        assert_eq!(apply_delta(remaining, delta), expected);
    }
}
