//! Freeze-queue arithmetic.
//!
//! Every function here takes the reference time `now` explicitly; the
//! contract reads the ledger clock once per call and passes it down. A record
//! is frozen while `unlock_time > now`. Expired records are never removed
//! implicitly; [`clear_expired`] is the only compaction.

use common::{FreezingRecord, LedgerError};
use soroban_sdk::{Env, Vec};

/// Sum of the amounts still locked at `now`.
pub fn frozen_amount(queue: &Vec<FreezingRecord>, now: u64) -> i128 {
    let mut frozen: i128 = 0;
    for record in queue.iter() {
        if record.unlock_time > now {
            frozen = frozen.saturating_add(record.amount);
        }
    }
    frozen
}

/// `balance` minus everything still locked at `now`, floored at zero.
pub fn valid_balance(balance: i128, queue: &Vec<FreezingRecord>, now: u64) -> i128 {
    balance.saturating_sub(frozen_amount(queue, now)).max(0)
}

/// Returns a copy of `queue` without the records that unlocked at or before
/// `now`. Relative order of the survivors is kept.
pub fn clear_expired(env: &Env, queue: &Vec<FreezingRecord>, now: u64) -> Vec<FreezingRecord> {
    let mut remaining = Vec::new(env);
    for record in queue.iter() {
        if record.unlock_time > now {
            remaining.push_back(record);
        }
    }
    remaining
}

/// Classifies a spend of `amount` against the total and the unfrozen balance.
pub fn check_spendable(balance: i128, valid: i128, amount: i128) -> Result<(), LedgerError> {
    if valid >= amount {
        Ok(())
    } else if balance >= amount {
        Err(LedgerError::BalanceFrozen)
    } else {
        Err(LedgerError::InsufficientBalance)
    }
}
