//! Events emitted by the Lemo ledger.

use soroban_sdk::{symbol_short, Address, Env, String};

// ── Internal helper ───────────────────────────────────────────────────────────

fn emit<T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>>(env: &Env, topic: &str, data: T) {
    #[allow(deprecated)]
    env.events()
        .publish((symbol_short!("LEMO"), soroban_sdk::Symbol::new(env, topic)), data);
}

// ── Event structs ─────────────────────────────────────────────────────────────

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MintedEvent {
    pub owner: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApprovalEvent {
    pub owner: Address,
    pub spender: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetFreezingEvent {
    pub account: Address,
    pub unlock_time: u64,
    pub amount: i128,
    pub category: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FreezingClearedEvent {
    pub account: Address,
    pub removed: u32,
    pub remaining: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FreezerChangedEvent {
    pub freezer: Address,
    pub enabled: bool,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NameChangedEvent {
    pub name: String,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnerChangedEvent {
    pub previous: Address,
    pub owner: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StopChangedEvent {
    pub caller: Address,
    pub stopped: bool,
    pub timestamp: u64,
}

// ── Publishers ────────────────────────────────────────────────────────────────

pub fn publish_minted(env: &Env, owner: Address, amount: i128) {
    emit(
        env,
        "Minted",
        MintedEvent {
            owner,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_transfer(env: &Env, from: Address, to: Address, amount: i128) {
    emit(
        env,
        "Transfer",
        TransferEvent {
            from,
            to,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_approval(env: &Env, owner: Address, spender: Address, amount: i128) {
    emit(
        env,
        "Approval",
        ApprovalEvent {
            owner,
            spender,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_set_freezing(
    env: &Env,
    account: Address,
    unlock_time: u64,
    amount: i128,
    category: u32,
) {
    emit(
        env,
        "SetFreezing",
        SetFreezingEvent {
            account,
            unlock_time,
            amount,
            category,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_freezing_cleared(env: &Env, account: Address, removed: u32, remaining: u32) {
    emit(
        env,
        "FrzCleared",
        FreezingClearedEvent {
            account,
            removed,
            remaining,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_freezer_changed(env: &Env, freezer: Address, enabled: bool) {
    emit(
        env,
        "Freezer",
        FreezerChangedEvent {
            freezer,
            enabled,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_name_changed(env: &Env, name: String) {
    emit(
        env,
        "NameSet",
        NameChangedEvent {
            name,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_owner_changed(env: &Env, previous: Address, owner: Address) {
    emit(
        env,
        "OwnerSet",
        OwnerChangedEvent {
            previous,
            owner,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_stop_changed(env: &Env, caller: Address, stopped: bool) {
    emit(
        env,
        if stopped { "Stopped" } else { "Started" },
        StopChangedEvent {
            caller,
            stopped,
            timestamp: env.ledger().timestamp(),
        },
    );
}
