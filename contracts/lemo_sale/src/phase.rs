//! Sale lifecycle as a pure function of the stored state and the clock.
//!
//! ```text
//!   NotStarted ──start──▶ Open ──hard cap──▶ SoldOut
//!                          │                   │
//!                          └──────end──────────┴──▶ Closed ──finalize──▶ Finalized
//!                                                     │                     │
//!                                                     └─ lock elapsed, ─────┴──destroy──▶ Destroyed
//!                                                        all refunded
//! ```

use soroban_sdk::contracttype;

use crate::{SaleTerms, SaleWindow};

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// No window configured yet, or `now < start_time`.
    NotStarted,
    Open,
    /// Hard cap hit before the window ended.
    SoldOut,
    /// Window over, not finalized. Finalize or refund depending on the soft cap.
    Closed,
    Finalized,
    Destroyed,
}

/// Everything the phase depends on, as stored by the contract.
pub struct Snapshot<'a> {
    pub terms: &'a SaleTerms,
    pub window: Option<&'a SaleWindow>,
    pub sold: i128,
    pub finalized: bool,
    pub destroyed: bool,
}

pub fn current(s: &Snapshot, now: u64) -> Phase {
    if s.destroyed {
        return Phase::Destroyed;
    }
    if s.finalized {
        return Phase::Finalized;
    }
    let window = match s.window {
        Some(w) => w,
        None => return Phase::NotStarted,
    };
    if now >= window.end_time {
        Phase::Closed
    } else if s.sold >= s.terms.hard_cap {
        Phase::SoldOut
    } else if now < window.start_time {
        Phase::NotStarted
    } else {
        Phase::Open
    }
}

/// Whether `now` is past the end of the window.
pub fn has_ended(window: &SaleWindow, now: u64) -> bool {
    now >= window.end_time
}

/// Whether the post-sale lock has elapsed at `now`.
pub fn lock_elapsed(terms: &SaleTerms, window: &SaleWindow, now: u64) -> bool {
    now >= window.end_time.saturating_add(terms.lock_duration)
}

pub fn soft_cap_reached(terms: &SaleTerms, sold: i128) -> bool {
    sold >= terms.soft_cap
}
