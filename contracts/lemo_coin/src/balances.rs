//! Persistent storage for balances, allowances and freeze queues.

use common::{ttl, FreezingRecord};
use soroban_sdk::{symbol_short, Address, Env, Symbol, Vec};

// ── Storage keys ──────────────────────────────────────────────────────────────

const BALANCE: Symbol = symbol_short!("BAL");
const ALLOWANCE: Symbol = symbol_short!("ALLOW");
const FREEZING: Symbol = symbol_short!("FRZ_Q");

fn balance_key(account: &Address) -> (Symbol, Address) {
    (BALANCE, account.clone())
}

fn allowance_key(owner: &Address, spender: &Address) -> (Symbol, Address, Address) {
    (ALLOWANCE, owner.clone(), spender.clone())
}

fn freezing_key(account: &Address) -> (Symbol, Address) {
    (FREEZING, account.clone())
}

// ── Balances ──────────────────────────────────────────────────────────────────

/// Total balance of `account` (0 if it never held tokens).
pub fn balance_of(env: &Env, account: &Address) -> i128 {
    let key = balance_key(account);
    let bal: Option<i128> = env.storage().persistent().get(&key);
    if bal.is_some() {
        ttl::extend_persistent(env, &key);
    }
    bal.unwrap_or(0)
}

pub fn set_balance(env: &Env, account: &Address, amount: i128) {
    let key = balance_key(account);
    env.storage().persistent().set(&key, &amount);
    ttl::extend_persistent(env, &key);
}

// ── Allowances ────────────────────────────────────────────────────────────────

pub fn allowance(env: &Env, owner: &Address, spender: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&allowance_key(owner, spender))
        .unwrap_or(0)
}

/// Overwrites the allowance; a zero allowance drops the entry.
pub fn set_allowance(env: &Env, owner: &Address, spender: &Address, amount: i128) {
    let key = allowance_key(owner, spender);
    if amount == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, &amount);
    ttl::extend_persistent(env, &key);
}

// ── Freeze queues ─────────────────────────────────────────────────────────────

pub fn freezing_queue(env: &Env, account: &Address) -> Vec<FreezingRecord> {
    env.storage()
        .persistent()
        .get(&freezing_key(account))
        .unwrap_or(Vec::new(env))
}

pub fn set_freezing_queue(env: &Env, account: &Address, queue: &Vec<FreezingRecord>) {
    let key = freezing_key(account);
    if queue.is_empty() {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, queue);
    ttl::extend_persistent(env, &key);
}

pub fn push_freezing(env: &Env, account: &Address, record: FreezingRecord) {
    let mut queue = freezing_queue(env, account);
    queue.push_back(record);
    set_freezing_queue(env, account, &queue);
}
