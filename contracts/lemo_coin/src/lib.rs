//! # Lemo Coin
//!
//! A fixed-supply token ledger whose balances can carry time locks.
//!
//! ## Balances
//! Every account has a total balance and an ordered *freeze queue* of
//! `(unlock_time, amount, category)` records. Only the **valid balance**
//! (total minus the amounts whose `unlock_time` is still in the future) can
//! be spent:
//! ```text
//! valid_balance(a, now) = balance(a) - Σ { r.amount | r ∈ queue(a), r.unlock_time > now }
//! ```
//! Records are not dropped when they expire; `clear_expired_freezing`
//! compacts the queue and keeps the order of the remaining records.
//!
//! ## Roles
//! | Role    | Can                                                    |
//! |---------|--------------------------------------------------------|
//! | Owner   | rename, stop/start, manage freezers, hand over owner   |
//! | Freezer | `set_freezing`, `transfer_and_freezing`                |
//!
//! The owner implicitly holds the freezer role.
//!
//! ## Allowances
//! `approve` overwrites the previous allowance. Changing a non-zero
//! allowance to another non-zero value lets a spender front-run the change
//! and spend both; holders should reset to zero first.
#![no_std]
#![allow(clippy::too_many_arguments)]

pub mod balances;
pub mod events;
pub mod freezing;

pub use common::{FreezingRecord, LedgerError};

use common::{access, pausable, Role};
use soroban_sdk::{contract, contractimpl, symbol_short, Address, Env, String, Symbol};

// ── Storage keys ──────────────────────────────────────────────────────────────

const NAME: Symbol = symbol_short!("NAME");
const SYMBOL: Symbol = symbol_short!("SYMBOL");
const DECIMALS: Symbol = symbol_short!("DECIMALS");
const SUPPLY: Symbol = symbol_short!("SUPPLY");

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct LemoCoin;

#[contractimpl]
impl LemoCoin {
    // ── Initialisation ────────────────────────────────────────────────────────

    /// Create the ledger and assign the whole `total_supply` to `owner`.
    pub fn initialize(
        env: Env,
        owner: Address,
        name: String,
        symbol: String,
        decimals: u32,
        total_supply: i128,
    ) -> Result<(), LedgerError> {
        if access::has_owner(&env) {
            return Err(LedgerError::AlreadyInitialized);
        }

        owner.require_auth();

        if total_supply < 0 {
            return Err(LedgerError::InvalidAmount);
        }

        access::set_owner(&env, &owner);
        env.storage().instance().set(&NAME, &name);
        env.storage().instance().set(&SYMBOL, &symbol);
        env.storage().instance().set(&DECIMALS, &decimals);
        env.storage().instance().set(&SUPPLY, &total_supply);

        balances::set_balance(&env, &owner, total_supply);
        events::publish_minted(&env, owner, total_supply);

        Ok(())
    }

    fn require_initialized(env: &Env) -> Result<(), LedgerError> {
        if !access::has_owner(env) {
            return Err(LedgerError::NotInitialized);
        }
        Ok(())
    }

    /// Guard shared by every balance-moving entry point.
    fn require_ready(env: &Env) -> Result<(), LedgerError> {
        Self::require_initialized(env)?;
        pausable::require_running(env)?;
        Ok(())
    }

    // ── Metadata ──────────────────────────────────────────────────────────────

    pub fn name(env: Env) -> Result<String, LedgerError> {
        env.storage()
            .instance()
            .get(&NAME)
            .ok_or(LedgerError::NotInitialized)
    }

    pub fn symbol(env: Env) -> Result<String, LedgerError> {
        env.storage()
            .instance()
            .get(&SYMBOL)
            .ok_or(LedgerError::NotInitialized)
    }

    pub fn decimals(env: Env) -> Result<u32, LedgerError> {
        env.storage()
            .instance()
            .get(&DECIMALS)
            .ok_or(LedgerError::NotInitialized)
    }

    pub fn total_supply(env: Env) -> i128 {
        env.storage().instance().get(&SUPPLY).unwrap_or(0)
    }

    pub fn owner(env: Env) -> Result<Address, LedgerError> {
        access::owner(&env).ok_or(LedgerError::NotInitialized)
    }

    /// Whether the administrative stop switch is on.
    pub fn stopped(env: Env) -> bool {
        pausable::is_stopped(&env)
    }

    // ── Administration ────────────────────────────────────────────────────────

    pub fn set_name(env: Env, caller: Address, name: String) -> Result<(), LedgerError> {
        caller.require_auth();
        access::require_owner(&env, &caller)?;
        env.storage().instance().set(&NAME, &name);
        events::publish_name_changed(&env, name);
        Ok(())
    }

    pub fn set_owner(env: Env, caller: Address, new_owner: Address) -> Result<(), LedgerError> {
        caller.require_auth();
        access::require_owner(&env, &caller)?;
        access::set_owner(&env, &new_owner);
        events::publish_owner_changed(&env, caller, new_owner);
        Ok(())
    }

    /// Block transfers, approvals and freezing until `start` is called.
    /// Stopping an already stopped ledger succeeds without an event.
    pub fn stop(env: Env, caller: Address) -> Result<(), LedgerError> {
        caller.require_auth();
        access::require_owner(&env, &caller)?;
        if pausable::set_stopped(&env, true) {
            events::publish_stop_changed(&env, caller, true);
        }
        Ok(())
    }

    pub fn start(env: Env, caller: Address) -> Result<(), LedgerError> {
        caller.require_auth();
        access::require_owner(&env, &caller)?;
        if pausable::set_stopped(&env, false) {
            events::publish_stop_changed(&env, caller, false);
        }
        Ok(())
    }

    /// Grant the freezer role. Granting it twice is a no-op.
    pub fn add_freezer(env: Env, caller: Address, freezer: Address) -> Result<(), LedgerError> {
        caller.require_auth();
        access::require_owner(&env, &caller)?;
        if access::grant_role(&env, Role::Freezer, &freezer) {
            events::publish_freezer_changed(&env, freezer, true);
        }
        Ok(())
    }

    /// Revoke the freezer role. Revoking from a non-member is a no-op.
    pub fn remove_freezer(env: Env, caller: Address, freezer: Address) -> Result<(), LedgerError> {
        caller.require_auth();
        access::require_owner(&env, &caller)?;
        if access::revoke_role(&env, Role::Freezer, &freezer) {
            events::publish_freezer_changed(&env, freezer, false);
        }
        Ok(())
    }

    pub fn is_freezer(env: Env, account: Address) -> bool {
        access::has_role(&env, Role::Freezer, &account)
    }

    // ── Balance queries ───────────────────────────────────────────────────────

    pub fn balance_of(env: Env, account: Address) -> i128 {
        balances::balance_of(&env, &account)
    }

    /// Spendable part of the balance at the current ledger time.
    pub fn valid_balance_of(env: Env, account: Address) -> i128 {
        Self::valid_balance_at(&env, &account, env.ledger().timestamp())
    }

    /// Length of the freeze queue, expired records included.
    pub fn freezing_balance_number_of(env: Env, account: Address) -> u32 {
        balances::freezing_queue(&env, &account).len()
    }

    pub fn freezing_balance_info_of(
        env: Env,
        account: Address,
        index: u32,
    ) -> Result<FreezingRecord, LedgerError> {
        balances::freezing_queue(&env, &account)
            .get(index)
            .ok_or(LedgerError::IndexOutOfRange)
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        balances::allowance(&env, &owner, &spender)
    }

    fn valid_balance_at(env: &Env, account: &Address, now: u64) -> i128 {
        let balance = balances::balance_of(env, account);
        let queue = balances::freezing_queue(env, account);
        freezing::valid_balance(balance, &queue, now)
    }

    // ── Transfers ─────────────────────────────────────────────────────────────

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), LedgerError> {
        from.require_auth();
        Self::require_ready(&env)?;

        let now = env.ledger().timestamp();
        Self::check_transfer(&env, &from, &to, amount, now)?;
        Self::move_balance(&env, &from, &to, amount)?;

        events::publish_transfer(&env, from, to, amount);
        Ok(())
    }

    /// Set the allowance of `spender` over `owner`'s tokens to exactly `amount`.
    pub fn approve(
        env: Env,
        owner: Address,
        spender: Address,
        amount: i128,
    ) -> Result<(), LedgerError> {
        owner.require_auth();
        Self::require_ready(&env)?;

        if amount < 0 {
            return Err(LedgerError::InvalidAmount);
        }

        balances::set_allowance(&env, &owner, &spender, amount);
        events::publish_approval(&env, owner, spender, amount);
        Ok(())
    }

    /// Move `amount` from `from` to `to` on the strength of `spender`'s allowance.
    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), LedgerError> {
        spender.require_auth();
        Self::require_ready(&env)?;

        if amount < 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let allowance = balances::allowance(&env, &from, &spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance);
        }

        let now = env.ledger().timestamp();
        Self::check_transfer(&env, &from, &to, amount, now)?;

        balances::set_allowance(&env, &from, &spender, allowance - amount);
        Self::move_balance(&env, &from, &to, amount)?;

        events::publish_transfer(&env, from, to, amount);
        Ok(())
    }

    // ── Freezing ──────────────────────────────────────────────────────────────

    /// Lock `amount` of `account`'s currently spendable balance until
    /// `unlock_time`. Owner or freezer only.
    pub fn set_freezing(
        env: Env,
        caller: Address,
        account: Address,
        unlock_time: u64,
        amount: i128,
        category: u32,
    ) -> Result<(), LedgerError> {
        caller.require_auth();
        Self::require_ready(&env)?;
        access::require_owner_or_role(&env, &caller, Role::Freezer)?;

        let now = env.ledger().timestamp();
        Self::check_freeze_terms(&env, &account, unlock_time, amount, now)?;

        let balance = balances::balance_of(&env, &account);
        let valid = Self::valid_balance_at(&env, &account, now);
        freezing::check_spendable(balance, valid, amount)?;

        balances::push_freezing(
            &env,
            &account,
            FreezingRecord {
                unlock_time,
                amount,
                category,
            },
        );
        events::publish_set_freezing(&env, account, unlock_time, amount, category);
        Ok(())
    }

    /// Transfer `amount` to `to` and lock `freeze_amount` of it until
    /// `unlock_time`, atomically. `from` must be the owner or a freezer.
    ///
    /// A zero `freeze_amount` degrades to a plain transfer.
    pub fn transfer_and_freezing(
        env: Env,
        from: Address,
        to: Address,
        amount: i128,
        freeze_amount: i128,
        unlock_time: u64,
        category: u32,
    ) -> Result<(), LedgerError> {
        from.require_auth();
        Self::require_ready(&env)?;
        access::require_owner_or_role(&env, &from, Role::Freezer)?;

        let now = env.ledger().timestamp();
        Self::check_transfer(&env, &from, &to, amount, now)?;

        if freeze_amount < 0 || freeze_amount > amount {
            return Err(LedgerError::InvalidAmount);
        }

        if freeze_amount > 0 {
            Self::check_freeze_terms(&env, &to, unlock_time, freeze_amount, now)?;

            // Spendable balance of `to` once the transfer has landed.
            let valid_after = if from == to {
                Self::valid_balance_at(&env, &to, now)
            } else {
                Self::valid_balance_at(&env, &to, now)
                    .checked_add(amount)
                    .ok_or(LedgerError::Overflow)?
            };
            if valid_after < freeze_amount {
                return Err(LedgerError::BalanceFrozen);
            }
        }

        Self::move_balance(&env, &from, &to, amount)?;
        events::publish_transfer(&env, from, to.clone(), amount);

        if freeze_amount > 0 {
            balances::push_freezing(
                &env,
                &to,
                FreezingRecord {
                    unlock_time,
                    amount: freeze_amount,
                    category,
                },
            );
            events::publish_set_freezing(&env, to, unlock_time, freeze_amount, category);
        }

        Ok(())
    }

    /// Drop every record of `account`'s queue that has already unlocked.
    /// Anyone may call this; it never changes the valid balance.
    /// Returns the number of records removed.
    pub fn clear_expired_freezing(env: Env, account: Address) -> u32 {
        let now = env.ledger().timestamp();
        let queue = balances::freezing_queue(&env, &account);
        let remaining = freezing::clear_expired(&env, &queue, now);

        let removed = queue.len() - remaining.len();
        if removed > 0 {
            balances::set_freezing_queue(&env, &account, &remaining);
            events::publish_freezing_cleared(&env, account, removed, remaining.len());
        }
        removed
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// The ledger's own address stands in for the null account.
    fn is_valid_account(env: &Env, account: &Address) -> bool {
        *account != env.current_contract_address()
    }

    fn check_transfer(
        env: &Env,
        from: &Address,
        to: &Address,
        amount: i128,
        now: u64,
    ) -> Result<(), LedgerError> {
        if amount < 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if !Self::is_valid_account(env, to) {
            return Err(LedgerError::InvalidAddress);
        }
        let balance = balances::balance_of(env, from);
        let valid = Self::valid_balance_at(env, from, now);
        freezing::check_spendable(balance, valid, amount)
    }

    fn check_freeze_terms(
        env: &Env,
        account: &Address,
        unlock_time: u64,
        amount: i128,
        now: u64,
    ) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if unlock_time <= now {
            return Err(LedgerError::InvalidUnlockTime);
        }
        if !Self::is_valid_account(env, account) {
            return Err(LedgerError::InvalidAddress);
        }
        Ok(())
    }

    /// Caller must have run `check_transfer`.
    fn move_balance(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), LedgerError> {
        if from == to || amount == 0 {
            return Ok(());
        }
        let from_balance = balances::balance_of(env, from)
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        let to_balance = balances::balance_of(env, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        balances::set_balance(env, from, from_balance);
        balances::set_balance(env, to, to_balance);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
