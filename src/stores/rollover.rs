//! Defines the rollover marker store trait.

use crate::{Error, models::UserId};

/// Records which salary cycles have already been rolled over.
///
/// The invariant is at most one marker per `(owner, cycle_key)` pair.
/// [try_claim](RolloverStore::try_claim) is the serialization point of the
/// rollover rule: implementations backed by a store with conditional writes
/// (e.g. a SQLite unique constraint) make the claim atomic, and
/// [run_rollover](crate::ledger::run_rollover) then executes at most once
/// per cycle. An implementation that emulates the claim with a separate
/// check and insert re-exposes the duplicate-rollover race described on
/// [plan_rollover](crate::ledger::plan_rollover).
pub trait RolloverStore {
    /// Atomically record that `owner`'s cycle `cycle_key` has been rolled
    /// over.
    ///
    /// Returns `true` if this call created the marker, `false` if the cycle
    /// was already claimed.
    fn try_claim(&mut self, owner: &UserId, cycle_key: &str) -> Result<bool, Error>;

    /// Whether a marker exists for `owner`'s cycle `cycle_key`.
    fn is_claimed(&self, owner: &UserId, cycle_key: &str) -> Result<bool, Error>;
}
