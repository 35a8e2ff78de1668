//! Owner + role access-control policy.
//!
//! Both contracts keep a single privileged owner in instance storage and an
//! optional set of role holders in persistent storage. Every mutating entry
//! point that needs a privilege calls one of the `require_*` guards before it
//! touches any other state.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::{ttl, CommonError};

const OWNER: Symbol = symbol_short!("OWNER");
const ROLE: Symbol = symbol_short!("ROLE");

/// Privileges that can be granted to non-owner addresses.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    /// May place time locks on other accounts' balances.
    Freezer,
}

fn role_key(role: Role, address: &Address) -> (Symbol, Role, Address) {
    (ROLE, role, address.clone())
}

pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&OWNER, owner);
    ttl::extend_instance(env);
}

pub fn owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&OWNER)
}

pub fn clear_owner(env: &Env) {
    env.storage().instance().remove(&OWNER);
}

pub fn has_owner(env: &Env) -> bool {
    env.storage().instance().has(&OWNER)
}

/// Returns `AccessDenied` unless `caller` is the stored owner.
pub fn require_owner(env: &Env, caller: &Address) -> Result<(), CommonError> {
    let owner = owner(env).ok_or(CommonError::NotInitialized)?;
    if *caller != owner {
        return Err(CommonError::AccessDenied);
    }
    Ok(())
}

/// Grants `role` to `address`. Returns `false` if it was already held.
pub fn grant_role(env: &Env, role: Role, address: &Address) -> bool {
    let key = role_key(role, address);
    if env.storage().persistent().has(&key) {
        ttl::extend_persistent(env, &key);
        return false;
    }
    env.storage().persistent().set(&key, &true);
    ttl::extend_persistent(env, &key);
    true
}

/// Revokes `role` from `address`. Returns `false` if it was not held.
pub fn revoke_role(env: &Env, role: Role, address: &Address) -> bool {
    let key = role_key(role, address);
    if !env.storage().persistent().has(&key) {
        return false;
    }
    env.storage().persistent().remove(&key);
    true
}

pub fn has_role(env: &Env, role: Role, address: &Address) -> bool {
    let key = role_key(role, address);
    let held = env.storage().persistent().get(&key).unwrap_or(false);
    if held {
        ttl::extend_persistent(env, &key);
    }
    held
}

/// The owner implicitly holds every role.
pub fn require_owner_or_role(env: &Env, caller: &Address, role: Role) -> Result<(), CommonError> {
    match require_owner(env, caller) {
        Ok(()) => Ok(()),
        Err(CommonError::AccessDenied) if has_role(env, role, caller) => Ok(()),
        Err(e) => Err(e),
    }
}
