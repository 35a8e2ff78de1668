//! Shared utilities and error types for the Lemo contract suite.
//!
//! This crate provides:
//! - [`CommonError`]: error codes shared by the ledger and the sale.
//! - [`access`]: owner + role based access-control policy.
//! - [`pausable`]: the administrative stop/start switch.
//! - [`token_api`]: the ledger's cross-contract interface, used by the sale.
//! - [`ttl`]: storage TTL bump helpers.
//!
//! Contract-specific errors start at code **100** (ledger) and **200**
//! (sale), ensuring no collisions with the common set.

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::arithmetic_side_effects)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use soroban_sdk::contracterror;

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod access;
pub mod pausable;
pub mod token_api;
pub mod ttl;

pub use access::Role;
pub use token_api::{FreezingRecord, LedgerClient, LedgerError};

// ── Shared error enum ────────────────────────────────────────────────────────

/// Error codes returned by the shared helpers in this crate.
///
/// # Code ranges
/// | Range   | Purpose                        |
/// |---------|--------------------------------|
/// | 1 – 9   | Lifecycle / initialisation     |
/// | 10 – 19 | Authentication & authorisation |
/// | 30 – 39 | Validation / input             |
/// | 40 – 49 | Contract state                 |
/// | 100+    | Reserved for contract-specific |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum CommonError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    AccessDenied = 10,
    InvalidInput = 30,
    // ── Contract state (40–49) ───────────────────────────────
    /// The contract is stopped and cannot process state-changing requests.
    Paused = 40,
}
