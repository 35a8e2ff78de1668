#![no_main]

use arbitrary::Arbitrary;
use lemo_coin::{LemoCoin, LemoCoinClient};
use lemo_sale::{LemoSale, LemoSaleClient, Phase, SaleTerms};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{StellarAssetClient, TokenClient},
    Address, Env, String,
};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Contribute { who: u8, amount: u16 },
    Refund { who: u8 },
    Finalize,
    Withdraw,
    AdvanceTime { delta: u16 },
}

#[derive(Arbitrary, Debug)]
pub struct FuzzInput {
    rate: u8,
    soft_cap: u32,
    hard_cap: u32,
    actions: Vec<FuzzAction>,
}

fuzz_target!(|input: FuzzInput| {
    let env = Env::default();
    env.mock_all_auths();
    let start = 1_700_000_000u64;
    env.ledger().set_timestamp(start);

    let owner = Address::generate(&env);
    let hard_cap = input.hard_cap as i128;
    let terms = SaleTerms {
        rate: input.rate as i128,
        soft_cap: input.soft_cap as i128,
        hard_cap,
        lock_duration: 7_200,
    };

    let coin_id = env.register(LemoCoin, ());
    let coin = LemoCoinClient::new(&env, &coin_id);
    coin.initialize(
        &owner,
        &String::from_str(&env, "Lemo"),
        &String::from_str(&env, "LEMO"),
        &18,
        &(hard_cap * 2),
    );

    let currency = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let sale_id = env.register(LemoSale, ());
    let sale = LemoSaleClient::new(&env, &sale_id);

    // Degenerate terms must be refused up front.
    if sale.try_init(&owner, &owner, &currency, &terms).is_err() {
        assert!(terms.rate <= 0 || terms.soft_cap <= 0 || terms.soft_cap > terms.hard_cap);
        return;
    }
    sale.set_token_contract(&owner, &coin_id);
    sale.initialize(&owner, &start, &(start + 3_600), &1);
    coin.approve(&owner, &sale_id, &(hard_cap * 2));

    let users: Vec<Address> = (0..3).map(|_| Address::generate(&env)).collect();
    let cash = TokenClient::new(&env, &currency);

    for action in input.actions {
        match action {
            FuzzAction::Contribute { who, amount } => {
                let u = &users[who as usize % users.len()];
                if amount > 0 {
                    StellarAssetClient::new(&env, &currency).mint(u, &(amount as i128));
                }
                let _ = sale.try_contribute(u, &(amount as i128));
            }
            FuzzAction::Refund { who } => {
                let u = &users[who as usize % users.len()];
                let held = coin.balance_of(u);
                let _ = coin.try_approve(u, &sale_id, &held);
                let _ = sale.try_refund(u);
            }
            FuzzAction::Finalize => {
                let _ = sale.try_finalize(&owner);
            }
            FuzzAction::Withdraw => {
                let _ = sale.try_withdraw(&owner);
            }
            FuzzAction::AdvanceTime { delta } => {
                let ts = env.ledger().timestamp().saturating_add(delta as u64);
                env.ledger().set_timestamp(ts);
            }
        }

        // ── Post-action invariant checks ──
        let sold = sale.sold_amount();
        assert!(
            (0..=hard_cap).contains(&sold),
            "INVARIANT VIOLATION: sold {} outside [0, {}]",
            sold,
            hard_cap
        );

        let mut recorded = 0i128;
        let mut paid = 0i128;
        for u in &users {
            let c = sale.contribution_of(u);
            assert!(coin.balance_of(u) >= c.tokens, "INVARIANT VIOLATION: tokens not delivered");
            recorded += c.tokens;
            paid += c.paid;
        }
        assert_eq!(sold, recorded, "INVARIANT VIOLATION: sold != recorded tokens");

        if sale.phase() != Phase::Finalized {
            assert!(
                cash.balance(&sale_id) <= paid,
                "INVARIANT VIOLATION: sale holds more currency than was paid in"
            );
        }
    }
});
