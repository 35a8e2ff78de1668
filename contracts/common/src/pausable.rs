//! Stop switch for the Lemo ledger.
//!
//! While the switch is on, every balance-moving entry point (`transfer`,
//! `approve`, `transfer_from`, `set_freezing`, `transfer_and_freezing`)
//! fails with `Paused`. Reads, `clear_expired_freezing` and the owner's
//! administrative calls keep working, so the owner can always `start` again.
//!
//! The flag is a single instance-storage entry; an absent entry means running.

use soroban_sdk::{symbol_short, Env, Symbol};

use crate::CommonError;

const STOPPED: Symbol = symbol_short!("STOPPED");

pub fn is_stopped(env: &Env) -> bool {
    env.storage().instance().get(&STOPPED).unwrap_or(false)
}

/// Flip the switch. Returns `false` when it was already in that position,
/// in which case nothing is written.
///
/// No auth check here; the caller has already checked ownership.
pub fn set_stopped(env: &Env, stopped: bool) -> bool {
    if is_stopped(env) == stopped {
        return false;
    }
    if stopped {
        env.storage().instance().set(&STOPPED, &true);
    } else {
        env.storage().instance().remove(&STOPPED);
    }
    true
}

/// Guard for balance-moving entry points.
pub fn require_running(env: &Env) -> Result<(), CommonError> {
    if is_stopped(env) {
        return Err(CommonError::Paused);
    }
    Ok(())
}
