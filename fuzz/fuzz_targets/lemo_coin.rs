#![no_main]

use arbitrary::Arbitrary;
use lemo_coin::{LemoCoin, LemoCoinClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    Address, Env, String,
};

const SUPPLY: i128 = 1_600_000_000;

/// Ledger entry points plus clock movement. Account indices wrap around
/// the pool; index 0 is the owner.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Transfer { from: u8, to: u8, amount: u32 },
    Approve { owner: u8, spender: u8, amount: u32 },
    TransferFrom { spender: u8, from: u8, to: u8, amount: u32 },
    SetFreezing { account: u8, amount: u32, unlock_in: u16, category: u8 },
    TransferAndFreezing { to: u8, amount: u32, freeze: u32, unlock_in: u16 },
    ClearExpired { account: u8 },
    Stop,
    Start,
    AdvanceTime { delta: u16 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_700_000_000);

    let owner = Address::generate(&env);
    let freezer = Address::generate(&env);

    let contract_id = env.register(LemoCoin, ());
    let client = LemoCoinClient::new(&env, &contract_id);

    if client
        .try_initialize(
            &owner,
            &String::from_str(&env, "Lemo"),
            &String::from_str(&env, "LEMO"),
            &18,
            &SUPPLY,
        )
        .is_err()
    {
        return;
    }
    client.add_freezer(&owner, &freezer);

    let mut users = vec![owner.clone()];
    for _ in 0..4 {
        let u = Address::generate(&env);
        client.transfer(&owner, &u, &10_000_000);
        users.push(u);
    }
    let pick = |i: u8| &users[i as usize % users.len()];

    for action in actions {
        let now = env.ledger().timestamp();
        match action {
            FuzzAction::Transfer { from, to, amount } => {
                let _ = client.try_transfer(pick(from), pick(to), &(amount as i128));
            }
            FuzzAction::Approve { owner: o, spender, amount } => {
                let _ = client.try_approve(pick(o), pick(spender), &(amount as i128));
            }
            FuzzAction::TransferFrom { spender, from, to, amount } => {
                let _ = client.try_transfer_from(pick(spender), pick(from), pick(to), &(amount as i128));
            }
            FuzzAction::SetFreezing { account, amount, unlock_in, category } => {
                let _ = client.try_set_freezing(
                    &freezer,
                    pick(account),
                    &(now + unlock_in as u64),
                    &(amount as i128),
                    &(category as u32),
                );
            }
            FuzzAction::TransferAndFreezing { to, amount, freeze, unlock_in } => {
                let _ = client.try_transfer_and_freezing(
                    &owner,
                    pick(to),
                    &(amount as i128),
                    &(freeze as i128),
                    &(now + unlock_in as u64),
                    &0,
                );
            }
            FuzzAction::ClearExpired { account } => {
                let who = pick(account);
                let before = client.valid_balance_of(who);
                client.clear_expired_freezing(who);
                assert_eq!(
                    client.valid_balance_of(who),
                    before,
                    "INVARIANT VIOLATION: clearing changed the valid balance"
                );
            }
            FuzzAction::Stop => {
                let _ = client.try_stop(&owner);
            }
            FuzzAction::Start => {
                let _ = client.try_start(&owner);
            }
            FuzzAction::AdvanceTime { delta } => {
                env.ledger().set_timestamp(now.saturating_add(delta as u64));
            }
        }

        // ── Post-action invariant checks ──
        let mut sum = 0i128;
        for u in &users {
            let balance = client.balance_of(u);
            let valid = client.valid_balance_of(u);
            assert!(balance >= 0, "INVARIANT VIOLATION: negative balance");
            assert!(
                (0..=balance).contains(&valid),
                "INVARIANT VIOLATION: valid balance {} outside [0, {}]",
                valid,
                balance
            );
            sum += balance;
        }
        assert_eq!(sum, SUPPLY, "INVARIANT VIOLATION: supply not conserved");
    }
});
