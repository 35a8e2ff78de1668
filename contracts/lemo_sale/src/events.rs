//! Events emitted by the Lemo sale.

use soroban_sdk::{symbol_short, Address, Env, Symbol};

fn emit<T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>>(env: &Env, topic: &str, data: T) {
    #[allow(deprecated)]
    env.events()
        .publish((symbol_short!("SALE"), Symbol::new(env, topic)), data);
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionEvent {
    pub contributor: Address,
    pub paid: i128,
    pub tokens: i128,
    pub sold_amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WindowSetEvent {
    pub start_time: u64,
    pub end_time: u64,
    pub min_payment: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenSetEvent {
    pub token: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FinalizedEvent {
    pub beneficiary: Address,
    pub proceeds: i128,
    pub sold_amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundedEvent {
    pub contributor: Address,
    pub tokens: i128,
    pub returned: i128,
    pub timestamp: u64,
}

/// Currency swept to the owner, by `withdraw` or `destroy`.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SweptEvent {
    pub to: Address,
    pub amount: i128,
    pub timestamp: u64,
}

pub fn publish_contribution(
    env: &Env,
    contributor: Address,
    paid: i128,
    tokens: i128,
    sold_amount: i128,
) {
    emit(
        env,
        "Contribution",
        ContributionEvent {
            contributor,
            paid,
            tokens,
            sold_amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_window_set(env: &Env, start_time: u64, end_time: u64, min_payment: i128) {
    emit(
        env,
        "WindowSet",
        WindowSetEvent {
            start_time,
            end_time,
            min_payment,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_token_set(env: &Env, token: Address) {
    emit(
        env,
        "TokenSet",
        TokenSetEvent {
            token,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_finalized(env: &Env, beneficiary: Address, proceeds: i128, sold_amount: i128) {
    emit(
        env,
        "Finalized",
        FinalizedEvent {
            beneficiary,
            proceeds,
            sold_amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_refunded(env: &Env, contributor: Address, tokens: i128, returned: i128) {
    emit(
        env,
        "Refunded",
        RefundedEvent {
            contributor,
            tokens,
            returned,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, to: Address, amount: i128) {
    emit(
        env,
        "Withdrawn",
        SweptEvent {
            to,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_destroyed(env: &Env, to: Address, amount: i128) {
    emit(
        env,
        "Destroyed",
        SweptEvent {
            to,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}
