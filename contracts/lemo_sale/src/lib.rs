//! # Lemo Sale
//!
//! Capped token sale. Contributors pay in a SEP-41 currency and receive
//! ledger tokens at a fixed `rate`, drawn from the beneficiary through an
//! allowance the beneficiary granted to this contract on the ledger.
//!
//! ## Outcome
//! * `sold_amount ≥ soft_cap` at the end of the window: the owner calls
//!   `finalize` and the proceeds go to the beneficiary.
//! * otherwise every contributor can `refund`, handing the tokens back to the
//!   beneficiary and getting `tokens / rate` currency back. The owner can
//!   `withdraw` whatever is left once the lock period has passed.
//!
//! A contribution that would overshoot the hard cap is trimmed to exactly
//! the tokens left; the contributor is only charged `left / rate`.
//!
//! After `destroy` the contract keeps a tombstone and every entry point
//! returns `AlreadyDestroyed`.
#![no_std]

pub mod events;
pub mod phase;
pub mod pricing;

use common::{access, ttl, CommonError, LedgerClient, LedgerError};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env,
    Symbol,
};

pub use phase::Phase;

/// Tokens stay recoverable for three months after the window closes.
pub const DEFAULT_LOCK_DURATION: u64 = 3600 * 24 * 30 * 3;

// ── Storage keys ──────────────────────────────────────────────────────────────

const BENEFICIARY: Symbol = symbol_short!("BENEF");
const PAYMENT: Symbol = symbol_short!("PAY_TOK");
const LEDGER: Symbol = symbol_short!("LEDGER");
const TERMS: Symbol = symbol_short!("TERMS");
const WINDOW: Symbol = symbol_short!("WINDOW");
const SOLD: Symbol = symbol_short!("SOLD");
const COUNT: Symbol = symbol_short!("COUNT");
const FINALIZED: Symbol = symbol_short!("FINAL");
const DESTROYED: Symbol = symbol_short!("GONE");
const CONTRIBUTION: Symbol = symbol_short!("CONTRIB");

fn contribution_key(contributor: &Address) -> (Symbol, Address) {
    (CONTRIBUTION, contributor.clone())
}

// ── Types ─────────────────────────────────────────────────────────────────────

/// Fixed economics of the sale.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleTerms {
    /// Tokens per currency unit.
    pub rate: i128,
    pub soft_cap: i128,
    pub hard_cap: i128,
    /// Seconds after `end_time` before `withdraw`/`destroy` are allowed.
    pub lock_duration: u64,
}

impl SaleTerms {
    pub fn new(rate: i128, soft_cap: i128, hard_cap: i128) -> Self {
        Self {
            rate,
            soft_cap,
            hard_cap,
            lock_duration: DEFAULT_LOCK_DURATION,
        }
    }
}

/// Contribution window; replaced wholesale by every `initialize` call.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleWindow {
    pub start_time: u64,
    pub end_time: u64,
    /// Smallest accepted payment, in currency units.
    pub min_payment: i128,
}

/// Running totals for one contributor, net of refunds.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Contribution {
    pub paid: i128,
    pub tokens: i128,
}

/// Result of a successful `contribute`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Purchase {
    pub tokens: i128,
    /// Currency actually charged; below the offered amount when the cap was hit.
    pub paid: i128,
}

/// Result of a successful `refund`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Refund {
    pub tokens: i128,
    pub returned: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleState {
    pub owner: Address,
    pub beneficiary: Address,
    pub payment_token: Address,
    pub token: Option<Address>,
    pub terms: SaleTerms,
    pub window: Option<SaleWindow>,
    pub sold_amount: i128,
    pub contribution_count: u32,
    pub funding: bool,
    pub phase: Phase,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum SaleError {
    NotInitialized = 200,
    AlreadyInitialized = 201,
    PermissionDenied = 202,
    InvalidAmount = 203,
    InvalidWindow = 204,
    TokenNotSet = 205,
    NotOpen = 206,
    NotClosed = 207,
    AlreadyFinalized = 208,
    NotFinalized = 209,
    CapReached = 210,
    BelowMinimum = 211,
    SoftCapNotReached = 212,
    SoftCapReached = 213,
    NothingToRefund = 214,
    InsufficientAllowance = 215,
    TokenTransferFailed = 216,
    Locked = 217,
    AlreadyDestroyed = 218,
    Overflow = 219,
    RefundsOutstanding = 220,
}

impl From<CommonError> for SaleError {
    fn from(e: CommonError) -> Self {
        match e {
            CommonError::NotInitialized => SaleError::NotInitialized,
            CommonError::AlreadyInitialized => SaleError::AlreadyInitialized,
            CommonError::AccessDenied => SaleError::PermissionDenied,
            CommonError::InvalidInput => SaleError::InvalidAmount,
            CommonError::Paused => SaleError::NotInitialized,
        }
    }
}

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct LemoSale;

#[contractimpl]
impl LemoSale {
    // ── Initialisation ────────────────────────────────────────────────────────

    pub fn init(
        env: Env,
        owner: Address,
        beneficiary: Address,
        payment_token: Address,
        terms: SaleTerms,
    ) -> Result<(), SaleError> {
        if Self::is_destroyed(&env) {
            return Err(SaleError::AlreadyDestroyed);
        }
        if access::has_owner(&env) {
            return Err(SaleError::AlreadyInitialized);
        }

        owner.require_auth();

        if terms.rate <= 0 || terms.soft_cap <= 0 || terms.soft_cap > terms.hard_cap {
            return Err(SaleError::InvalidAmount);
        }

        access::set_owner(&env, &owner);
        let store = env.storage().instance();
        store.set(&BENEFICIARY, &beneficiary);
        store.set(&PAYMENT, &payment_token);
        store.set(&TERMS, &terms);
        store.set(&SOLD, &0i128);
        store.set(&COUNT, &0u32);
        store.set(&FINALIZED, &false);
        Ok(())
    }

    /// Point the sale at the ledger whose tokens it sells.
    pub fn set_token_contract(env: Env, caller: Address, ledger: Address) -> Result<(), SaleError> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;
        env.storage().instance().set(&LEDGER, &ledger);
        ttl::extend_instance(&env);
        events::publish_token_set(&env, ledger);
        Ok(())
    }

    /// (Re)configure the contribution window. May be called any number of
    /// times; each call replaces the previous window.
    pub fn initialize(
        env: Env,
        caller: Address,
        start_time: u64,
        end_time: u64,
        min_payment: i128,
    ) -> Result<(), SaleError> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        if start_time >= end_time {
            return Err(SaleError::InvalidWindow);
        }
        if min_payment <= 0 {
            return Err(SaleError::InvalidAmount);
        }

        let window = SaleWindow {
            start_time,
            end_time,
            min_payment,
        };
        env.storage().instance().set(&WINDOW, &window);
        ttl::extend_instance(&env);
        events::publish_window_set(&env, start_time, end_time, min_payment);
        Ok(())
    }

    // ── Guards ────────────────────────────────────────────────────────────────

    fn is_destroyed(env: &Env) -> bool {
        env.storage().instance().get(&DESTROYED).unwrap_or(false)
    }

    fn require_live(env: &Env) -> Result<(), SaleError> {
        if Self::is_destroyed(env) {
            return Err(SaleError::AlreadyDestroyed);
        }
        if !access::has_owner(env) {
            return Err(SaleError::NotInitialized);
        }
        Ok(())
    }

    fn require_owner(env: &Env, caller: &Address) -> Result<(), SaleError> {
        Self::require_live(env)?;
        access::require_owner(env, caller)?;
        Ok(())
    }

    fn load_terms(env: &Env) -> Result<SaleTerms, SaleError> {
        Self::require_live(env)?;
        env.storage()
            .instance()
            .get(&TERMS)
            .ok_or(SaleError::NotInitialized)
    }

    fn load_window(env: &Env) -> Option<SaleWindow> {
        env.storage().instance().get(&WINDOW)
    }

    /// The window, provided it has ended at `now`.
    fn ended_window(env: &Env, now: u64) -> Result<SaleWindow, SaleError> {
        match Self::load_window(env) {
            Some(w) if phase::has_ended(&w, now) => Ok(w),
            _ => Err(SaleError::NotClosed),
        }
    }

    fn load_ledger(env: &Env) -> Result<Address, SaleError> {
        env.storage()
            .instance()
            .get(&LEDGER)
            .ok_or(SaleError::TokenNotSet)
    }

    fn load_address(env: &Env, key: &Symbol) -> Result<Address, SaleError> {
        env.storage()
            .instance()
            .get(key)
            .ok_or(SaleError::NotInitialized)
    }

    fn sold(env: &Env) -> i128 {
        env.storage().instance().get(&SOLD).unwrap_or(0)
    }

    fn count(env: &Env) -> u32 {
        env.storage().instance().get(&COUNT).unwrap_or(0)
    }

    fn is_finalized(env: &Env) -> bool {
        env.storage().instance().get(&FINALIZED).unwrap_or(false)
    }

    fn phase_at(env: &Env, terms: &SaleTerms, now: u64) -> Phase {
        let window = Self::load_window(env);
        let snapshot = phase::Snapshot {
            terms,
            window: window.as_ref(),
            sold: Self::sold(env),
            finalized: Self::is_finalized(env),
            destroyed: false,
        };
        phase::current(&snapshot, now)
    }

    /// Moves ledger tokens with this contract as the spender.
    fn pull_tokens(
        env: &Env,
        ledger: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), SaleError> {
        let client = LedgerClient::new(env, ledger);
        match client.try_transfer_from(&env.current_contract_address(), from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            Err(Ok(LedgerError::InsufficientAllowance)) => Err(SaleError::InsufficientAllowance),
            _ => Err(SaleError::TokenTransferFailed),
        }
    }

    /// Sends the whole currency balance held by the sale to `to`.
    fn sweep(env: &Env, to: &Address) -> Result<i128, SaleError> {
        let payment = Self::load_address(env, &PAYMENT)?;
        let currency = token::TokenClient::new(env, &payment);
        let this = env.current_contract_address();
        let amount = currency.balance(&this);
        if amount > 0 {
            currency.transfer(&this, to, &amount);
        }
        Ok(amount)
    }

    // ── Contributions ─────────────────────────────────────────────────────────

    /// Buy tokens for up to `amount` currency.
    pub fn contribute(env: Env, contributor: Address, amount: i128) -> Result<Purchase, SaleError> {
        contributor.require_auth();
        let terms = Self::load_terms(&env)?;
        let ledger = Self::load_ledger(&env)?;

        if amount <= 0 {
            return Err(SaleError::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        match Self::phase_at(&env, &terms, now) {
            Phase::Open => {}
            Phase::SoldOut => return Err(SaleError::CapReached),
            _ => return Err(SaleError::NotOpen),
        }

        let window = Self::load_window(&env).ok_or(SaleError::NotOpen)?;
        if amount < window.min_payment {
            return Err(SaleError::BelowMinimum);
        }

        let sold = Self::sold(&env);
        let Purchase { tokens, paid } = pricing::quote(&terms, sold, amount)?;

        let beneficiary = Self::load_address(&env, &BENEFICIARY)?;
        Self::pull_tokens(&env, &ledger, &beneficiary, &contributor, tokens)?;

        if paid > 0 {
            let payment = Self::load_address(&env, &PAYMENT)?;
            token::TokenClient::new(&env, &payment).transfer(
                &contributor,
                &env.current_contract_address(),
                &paid,
            );
        }

        let key = contribution_key(&contributor);
        let mut record: Contribution = env.storage().persistent().get(&key).unwrap_or_default();
        record.paid = record.paid.checked_add(paid).ok_or(SaleError::Overflow)?;
        record.tokens = record.tokens.checked_add(tokens).ok_or(SaleError::Overflow)?;
        env.storage().persistent().set(&key, &record);
        ttl::extend_persistent(&env, &key);

        let sold = sold + tokens;
        let count = Self::count(&env).checked_add(1).ok_or(SaleError::Overflow)?;
        env.storage().instance().set(&SOLD, &sold);
        env.storage().instance().set(&COUNT, &count);
        ttl::extend_instance(&env);

        events::publish_contribution(&env, contributor, paid, tokens, sold);
        Ok(Purchase { tokens, paid })
    }

    // ── Resolution ────────────────────────────────────────────────────────────

    /// Close a successful sale and pay the proceeds to the beneficiary.
    pub fn finalize(env: Env, caller: Address) -> Result<i128, SaleError> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;
        let terms = Self::load_terms(&env)?;

        let now = env.ledger().timestamp();
        Self::ended_window(&env, now)?;
        if Self::is_finalized(&env) {
            return Err(SaleError::AlreadyFinalized);
        }
        let sold = Self::sold(&env);
        if !phase::soft_cap_reached(&terms, sold) {
            return Err(SaleError::SoftCapNotReached);
        }

        let beneficiary = Self::load_address(&env, &BENEFICIARY)?;
        let proceeds = Self::sweep(&env, &beneficiary)?;
        env.storage().instance().set(&FINALIZED, &true);
        ttl::extend_instance(&env);

        events::publish_finalized(&env, beneficiary, proceeds, sold);
        Ok(proceeds)
    }

    /// Return a failed sale's tokens to the beneficiary and get the currency
    /// back. The contributor must have approved this contract on the ledger.
    pub fn refund(env: Env, contributor: Address) -> Result<Refund, SaleError> {
        contributor.require_auth();
        let terms = Self::load_terms(&env)?;

        let now = env.ledger().timestamp();
        Self::ended_window(&env, now)?;
        let sold = Self::sold(&env);
        if phase::soft_cap_reached(&terms, sold) {
            return Err(SaleError::SoftCapReached);
        }
        let ledger = Self::load_ledger(&env)?;

        let key = contribution_key(&contributor);
        let mut record: Contribution = env.storage().persistent().get(&key).unwrap_or_default();
        let held = LedgerClient::new(&env, &ledger).balance_of(&contributor);
        let tokens = held.min(record.tokens);
        if tokens <= 0 {
            return Err(SaleError::NothingToRefund);
        }
        let returned = (tokens / terms.rate).min(record.paid);

        let beneficiary = Self::load_address(&env, &BENEFICIARY)?;
        Self::pull_tokens(&env, &ledger, &contributor, &beneficiary, tokens)?;

        if returned > 0 {
            let payment = Self::load_address(&env, &PAYMENT)?;
            token::TokenClient::new(&env, &payment).transfer(
                &env.current_contract_address(),
                &contributor,
                &returned,
            );
        }

        record.tokens -= tokens;
        record.paid -= returned;
        if record.tokens == 0 && record.paid == 0 {
            env.storage().persistent().remove(&key);
        } else {
            env.storage().persistent().set(&key, &record);
            ttl::extend_persistent(&env, &key);
        }
        env.storage().instance().set(&SOLD, &(sold - tokens));
        ttl::extend_instance(&env);

        events::publish_refunded(&env, contributor, tokens, returned);
        Ok(Refund { tokens, returned })
    }

    /// Sweep what is left of a failed sale to the owner once the lock period
    /// has passed.
    pub fn withdraw(env: Env, caller: Address) -> Result<i128, SaleError> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;
        let terms = Self::load_terms(&env)?;

        let now = env.ledger().timestamp();
        let window = Self::ended_window(&env, now)?;
        if phase::soft_cap_reached(&terms, Self::sold(&env)) {
            return Err(SaleError::SoftCapReached);
        }
        if !phase::lock_elapsed(&terms, &window, now) {
            return Err(SaleError::Locked);
        }

        let amount = Self::sweep(&env, &caller)?;
        events::publish_withdrawn(&env, caller, amount);
        Ok(amount)
    }

    /// Tear the sale down. Residual currency goes to the owner.
    ///
    /// Only a finalized sale, or a failed one whose contributions have all
    /// been refunded, can be destroyed.
    pub fn destroy(env: Env, caller: Address) -> Result<i128, SaleError> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;
        let terms = Self::load_terms(&env)?;

        let now = env.ledger().timestamp();
        let window = Self::load_window(&env).ok_or(SaleError::Locked)?;
        if !phase::lock_elapsed(&terms, &window, now) {
            return Err(SaleError::Locked);
        }
        if !Self::is_finalized(&env) {
            let sold = Self::sold(&env);
            if phase::soft_cap_reached(&terms, sold) {
                return Err(SaleError::NotFinalized);
            }
            if sold > 0 {
                return Err(SaleError::RefundsOutstanding);
            }
        }

        let amount = Self::sweep(&env, &caller)?;

        let store = env.storage().instance();
        for key in [
            BENEFICIARY,
            PAYMENT,
            LEDGER,
            TERMS,
            WINDOW,
            SOLD,
            COUNT,
            FINALIZED,
        ] {
            store.remove(&key);
        }
        access::clear_owner(&env);
        store.set(&DESTROYED, &true);
        ttl::extend_instance(&env);

        events::publish_destroyed(&env, caller, amount);
        Ok(amount)
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn rate(env: Env) -> Result<i128, SaleError> {
        Ok(Self::load_terms(&env)?.rate)
    }

    pub fn hard_cap(env: Env) -> Result<i128, SaleError> {
        Ok(Self::load_terms(&env)?.hard_cap)
    }

    pub fn soft_cap(env: Env) -> Result<i128, SaleError> {
        Ok(Self::load_terms(&env)?.soft_cap)
    }

    pub fn start_time(env: Env) -> Result<u64, SaleError> {
        Self::require_live(&env)?;
        Self::load_window(&env)
            .map(|w| w.start_time)
            .ok_or(SaleError::NotInitialized)
    }

    pub fn end_time(env: Env) -> Result<u64, SaleError> {
        Self::require_live(&env)?;
        Self::load_window(&env)
            .map(|w| w.end_time)
            .ok_or(SaleError::NotInitialized)
    }

    pub fn min_payment(env: Env) -> Result<i128, SaleError> {
        Self::require_live(&env)?;
        Self::load_window(&env)
            .map(|w| w.min_payment)
            .ok_or(SaleError::NotInitialized)
    }

    pub fn sold_amount(env: Env) -> Result<i128, SaleError> {
        Self::require_live(&env)?;
        Ok(Self::sold(&env))
    }

    pub fn contribution_count(env: Env) -> Result<u32, SaleError> {
        Self::require_live(&env)?;
        Ok(Self::count(&env))
    }

    /// True until the sale is finalized.
    pub fn funding(env: Env) -> Result<bool, SaleError> {
        Self::require_live(&env)?;
        Ok(!Self::is_finalized(&env))
    }

    pub fn token(env: Env) -> Result<Address, SaleError> {
        Self::require_live(&env)?;
        Self::load_ledger(&env)
    }

    pub fn owner(env: Env) -> Result<Address, SaleError> {
        Self::require_live(&env)?;
        access::owner(&env).ok_or(SaleError::NotInitialized)
    }

    pub fn beneficiary(env: Env) -> Result<Address, SaleError> {
        Self::require_live(&env)?;
        Self::load_address(&env, &BENEFICIARY)
    }

    pub fn contribution_of(env: Env, contributor: Address) -> Result<Contribution, SaleError> {
        Self::require_live(&env)?;
        Ok(env
            .storage()
            .persistent()
            .get(&contribution_key(&contributor))
            .unwrap_or_default())
    }

    /// Current lifecycle phase. Still answers after `destroy`.
    pub fn phase(env: Env) -> Result<Phase, SaleError> {
        if Self::is_destroyed(&env) {
            return Ok(Phase::Destroyed);
        }
        let terms = Self::load_terms(&env)?;
        Ok(Self::phase_at(&env, &terms, env.ledger().timestamp()))
    }

    /// Whether `withdraw`/`destroy` are still held back by the lock period.
    pub fn funds_locked(env: Env) -> Result<bool, SaleError> {
        let terms = Self::load_terms(&env)?;
        Ok(match Self::load_window(&env) {
            Some(w) => !phase::lock_elapsed(&terms, &w, env.ledger().timestamp()),
            None => true,
        })
    }

    pub fn get_state(env: Env) -> Result<SaleState, SaleError> {
        let terms = Self::load_terms(&env)?;
        let phase = Self::phase_at(&env, &terms, env.ledger().timestamp());
        Ok(SaleState {
            owner: access::owner(&env).ok_or(SaleError::NotInitialized)?,
            beneficiary: Self::load_address(&env, &BENEFICIARY)?,
            payment_token: Self::load_address(&env, &PAYMENT)?,
            token: env.storage().instance().get(&LEDGER),
            terms,
            window: Self::load_window(&env),
            sold_amount: Self::sold(&env),
            contribution_count: Self::count(&env),
            funding: !Self::is_finalized(&env),
            phase,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
