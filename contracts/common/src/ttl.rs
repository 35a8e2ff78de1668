use soroban_sdk::{Env, IntoVal, Val};

/// 1,036,800 ledgers ~= 60 days (@ ~5s/ledger)
pub const TTL_THRESHOLD: u32 = 1_036_800;
/// 2,073,600 ledgers ~= 120 days (@ ~5s/ledger)
pub const TTL_EXTEND_TO: u32 = 2_073_600;

/// Bumps a persistent entry so it outlives the sale lock period.
pub fn extend_persistent<K: IntoVal<Env, Val>>(env: &Env, key: &K) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}
