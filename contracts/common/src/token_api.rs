//! Cross-contract surface of the Lemo ledger.
//!
//! The ledger contract implements these entry points; the sale only ever
//! talks to it through the generated [`LedgerClient`], so the sale's WASM
//! does not link the ledger's code.

use soroban_sdk::{contractclient, contracterror, contracttype, Address, Env};

use crate::CommonError;

/// One time-locked reservation in an account's freeze queue.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FreezingRecord {
    /// Ledger timestamp (seconds) from which the amount is spendable again.
    pub unlock_time: u64,
    pub amount: i128,
    /// Caller-defined tag, e.g. vesting schedule id.
    pub category: u32,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum LedgerError {
    NotInitialized = 100,
    AlreadyInitialized = 101,
    PermissionDenied = 102,
    InvalidAmount = 103,
    InvalidAddress = 104,
    InvalidUnlockTime = 105,
    InsufficientBalance = 106,
    InsufficientAllowance = 107,
    /// Total balance covers the amount, the unfrozen part does not.
    BalanceFrozen = 108,
    IndexOutOfRange = 109,
    Paused = 110,
    Overflow = 111,
}

impl From<CommonError> for LedgerError {
    fn from(e: CommonError) -> Self {
        match e {
            CommonError::NotInitialized => LedgerError::NotInitialized,
            CommonError::AlreadyInitialized => LedgerError::AlreadyInitialized,
            CommonError::AccessDenied => LedgerError::PermissionDenied,
            CommonError::InvalidInput => LedgerError::InvalidAmount,
            CommonError::Paused => LedgerError::Paused,
        }
    }
}

#[contractclient(name = "LedgerClient")]
pub trait LedgerInterface {
    fn balance_of(env: Env, account: Address) -> i128;

    fn valid_balance_of(env: Env, account: Address) -> i128;

    fn allowance(env: Env, owner: Address, spender: Address) -> i128;

    fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), LedgerError>;
}
