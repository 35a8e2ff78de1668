//! # Lemo Testing Framework: Integration Tests
//!
//! Property-based tests over the ledger and the sale, invariant checks,
//! and state exploration with random and historical action sequences.

extern crate std;

use proptest::prelude::*;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::Address;

use lemo_coin::LedgerError;
use lemo_sale::{Phase, Purchase, Refund, SaleError, SaleTerms};

use test_framework::generators::*;
use test_framework::invariants::*;
use test_framework::state_explorer::*;
use test_framework::*;

const TOTAL_SUPPLY: i128 = 1_600_000_000;
const WINDOW: u64 = 3_600;
const MIN_PAYMENT: i128 = 500;

fn sale_terms() -> SaleTerms {
    SaleTerms::new(9, 50_004, 200_007)
}

fn funded_holders(harness: &LedgerHarness, n: usize) -> std::vec::Vec<Address> {
    (0..n).map(|_| harness.create_holder(HOLDER_FUNDING)).collect()
}

/// Lock `(amount, offset)` pairs on `account`, each unlocking `offset`
/// seconds after genesis.
fn lock_all(harness: &LedgerHarness, account: &Address, locks: &[(i128, u64)]) {
    for (amount, offset) in locks {
        harness.client.set_freezing(
            &harness.freezer,
            account,
            &(GENESIS + offset),
            amount,
            &0,
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════════
//  Property-Based Tests
// ═════════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// **Property**: A transfer, accepted or not, never changes the sum of balances.
    #[test]
    fn prop_transfer_conserves_supply(amount in amount_strategy()) {
        let mut env = TestEnv::new();
        let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
        let from = harness.create_holder(HOLDER_FUNDING);
        let to = harness.create_holder(0);

        let result = harness.client.try_transfer(&from, &to, &amount);
        prop_assert_eq!(result.is_ok(), amount <= HOLDER_FUNDING);

        let snapshot = harness.snapshot(&[from, to]);
        prop_assert_eq!(snapshot.sum_balances(), TOTAL_SUPPLY);
    }

    /// **Property**: Negative amounts are rejected by every balance-moving entry point.
    #[test]
    fn prop_invalid_amounts_rejected(amount in invalid_amount_strategy()) {
        let mut env = TestEnv::new();
        let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
        let holder = harness.create_holder(HOLDER_FUNDING);
        let other = harness.create_holder(0);
        let unlock = GENESIS + 60;
        let invalid = || Err(Ok(LedgerError::InvalidAmount));

        prop_assert_eq!(harness.client.try_transfer(&holder, &other, &amount), invalid());
        prop_assert_eq!(harness.client.try_approve(&holder, &other, &amount), invalid());
        prop_assert_eq!(
            harness.client.try_transfer_from(&other, &holder, &other, &amount),
            invalid()
        );
        prop_assert_eq!(
            harness.client.try_set_freezing(&harness.freezer, &holder, &unlock, &amount, &0),
            invalid()
        );
        prop_assert_eq!(
            harness.client.try_transfer_and_freezing(&harness.owner, &other, &amount, &0, &unlock, &0),
            invalid()
        );
        prop_assert_eq!(harness.balance(&holder), HOLDER_FUNDING);
    }

    /// **Property**: The valid balance is the total minus exactly the locks
    /// whose unlock time is still in the future.
    #[test]
    fn prop_valid_balance_excludes_future_locks(
        locks in prop::collection::vec((1i128..=10_000i128, 1u64..=10_000u64), 0..8),
        query in 0u64..=12_000u64,
    ) {
        let mut env = TestEnv::new();
        let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
        let holder = harness.create_holder(HOLDER_FUNDING);
        lock_all(&harness, &holder, &locks);

        harness.env.set_timestamp(GENESIS + query);
        let still_frozen: i128 = locks
            .iter()
            .filter(|(_, offset)| *offset > query)
            .map(|(amount, _)| amount)
            .sum();

        prop_assert_eq!(harness.valid_balance(&holder), HOLDER_FUNDING - still_frozen);
        prop_assert!(harness.valid_balance(&holder) <= harness.balance(&holder));
        prop_assert_eq!(harness.queue_len(&holder), locks.len() as u32);
    }

    /// **Property**: `transfer_and_freezing` credits the full amount but only
    /// `amount - freeze` becomes spendable before the unlock time.
    #[test]
    fn prop_transfer_and_freezing_excludes_frozen_portion(
        amount in positive_amount_strategy(),
        pct in 0u32..=100u32,
        lock_for in unlock_offset_strategy(),
    ) {
        let mut env = TestEnv::new();
        let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
        let holder = harness.create_holder(5_000);
        let freeze = amount * pct as i128 / 100;

        harness.grant_locked(&holder, amount, freeze, lock_for);

        prop_assert_eq!(harness.balance(&holder), 5_000 + amount);
        prop_assert_eq!(harness.valid_balance(&holder), 5_000 + amount - freeze);

        harness.env.advance_time(lock_for);
        prop_assert_eq!(harness.valid_balance(&holder), 5_000 + amount);
    }

    /// **Property**: Clearing expired records never changes the valid balance
    /// and removes exactly the records that have unlocked.
    #[test]
    fn prop_clear_expired_keeps_valid_balance(
        locks in prop::collection::vec((1i128..=10_000i128, 1u64..=10_000u64), 1..8),
        advance in 0u64..=12_000u64,
    ) {
        let mut env = TestEnv::new();
        let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
        let holder = harness.create_holder(HOLDER_FUNDING);
        lock_all(&harness, &holder, &locks);
        harness.env.set_timestamp(GENESIS + advance);

        let before = harness.valid_balance(&holder);
        let removed = harness.client.clear_expired_freezing(&holder);
        let expired = locks.iter().filter(|(_, offset)| *offset <= advance).count() as u32;

        prop_assert_eq!(removed, expired);
        prop_assert_eq!(harness.queue_len(&holder), locks.len() as u32 - expired);
        prop_assert_eq!(harness.valid_balance(&holder), before);
    }

    /// **Property**: `approve` overwrites rather than accumulates.
    #[test]
    fn prop_approve_overwrites(first in amount_strategy(), second in amount_strategy()) {
        let mut env = TestEnv::new();
        let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
        let holder = harness.create_holder(HOLDER_FUNDING);
        let spender = harness.create_holder(0);

        harness.client.approve(&holder, &spender, &first);
        harness.client.approve(&holder, &spender, &second);
        prop_assert_eq!(harness.client.allowance(&holder, &spender), second);
    }

    /// **Property**: `transfer_from` spends the allowance exactly, or fails
    /// without touching it.
    #[test]
    fn prop_transfer_from_consumes_allowance(
        allowance in 0i128..=HOLDER_FUNDING,
        amount in 0i128..=HOLDER_FUNDING,
    ) {
        let mut env = TestEnv::new();
        let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
        let holder = harness.create_holder(HOLDER_FUNDING);
        let spender = harness.create_holder(0);
        harness.client.approve(&holder, &spender, &allowance);

        let result = harness.client.try_transfer_from(&spender, &holder, &spender, &amount);
        if amount <= allowance {
            prop_assert!(result.is_ok());
            prop_assert_eq!(harness.client.allowance(&holder, &spender), allowance - amount);
            prop_assert_eq!(harness.balance(&spender), amount);
        } else {
            prop_assert_eq!(result, Err(Ok(LedgerError::InsufficientAllowance)));
            prop_assert_eq!(harness.client.allowance(&holder, &spender), allowance);
            prop_assert_eq!(harness.balance(&spender), 0);
        }
    }

    /// **Property**: Ledger invariants hold under random action sequences.
    #[test]
    fn prop_invariants_hold_under_random_ledger_actions(
        actions in ledger_action_sequence(4, 40),
    ) {
        let mut env = TestEnv::new();
        let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
        let holders = funded_holders(&harness, 3);

        let mut explorer = StateExplorer::ledger(&harness, holders);
        let result = explorer.explore(&actions);

        prop_assert!(result.passed(),
            "Invariant violations: {:?}", result.summary.invariant_violations);
    }

    /// **Property**: Below the cap a contribution buys `amount * rate` tokens
    /// at full price.
    #[test]
    fn prop_contribution_priced_at_rate(amount in MIN_PAYMENT..=20_000i128) {
        let mut env = TestEnv::new();
        let harness = SaleHarness::new(&mut env, sale_terms(), WINDOW, MIN_PAYMENT);
        let buyer = harness.create_contributor(amount);

        let purchase = harness.contribute(&buyer, amount);

        prop_assert_eq!(purchase, Purchase { tokens: amount * 9, paid: amount });
        prop_assert_eq!(harness.coin.balance_of(&buyer), amount * 9);
        prop_assert_eq!(harness.currency_balance(&buyer), 0);
        prop_assert_eq!(harness.sale.sold_amount(), amount * 9);
    }

    /// **Property**: Sale invariants hold (never oversold, records match the
    /// ledger and the currency held) under random sequences.
    #[test]
    fn prop_sale_invariants_hold_under_random_actions(
        actions in sale_action_sequence(3, 40),
    ) {
        let mut env = TestEnv::new();
        let harness = SaleHarness::new(&mut env, sale_terms(), WINDOW, MIN_PAYMENT);
        let contributors = std::vec![
            harness.create_contributor(0),
            harness.create_contributor(0),
            harness.create_contributor(0),
        ];

        let mut explorer = StateExplorer::sale(&harness, contributors);
        let result = explorer.explore(&actions);

        prop_assert!(result.passed(),
            "Invariant violations: {:?}", result.summary.invariant_violations);
    }
}

// ═════════════════════════════════════════════════════════════════════════════
//  Invariant Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_ledger_invariants_hold_on_fresh_ledger() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);

    let snapshot = harness.snapshot(&[]);
    assert_eq!(snapshot.accounts.len(), 1);
    InvariantSet::ledger_defaults().assert_all(&snapshot);
}

#[test]
fn test_sale_invariants_hold_on_fresh_sale() {
    let mut env = TestEnv::new();
    let harness = SaleHarness::new(&mut env, sale_terms(), WINDOW, MIN_PAYMENT);

    let snapshot = harness.snapshot(&[]);
    assert_eq!(snapshot.phase, Phase::Open);
    InvariantSet::sale_defaults().assert_all(&snapshot);
}

#[test]
fn test_invariants_detect_inconsistent_snapshot() {
    let env = TestEnv::new();
    let holder = Address::generate(&env.env);
    let snapshot = LedgerSnapshot {
        timestamp: GENESIS,
        total_supply: 100,
        stopped: false,
        accounts: std::vec![AccountState {
            address: holder,
            balance: 90,
            valid_balance: 95,
            queue_len: 0,
        }],
    };

    let violations = InvariantSet::ledger_defaults().check_all(&snapshot);
    let names: std::vec::Vec<_> = violations.iter().map(|(n, _)| n.as_str()).collect();
    assert!(names.contains(&"sum(balances) == total_supply"));
    assert!(names.contains(&"0 <= valid_balance <= balance"));
    assert!(names.contains(&"queue_len == 0 => valid_balance == balance"));
    assert!(!names.contains(&"all balances >= 0"));
}

#[test]
fn test_invariants_after_vesting_cycle() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let invariants = InvariantSet::ledger_defaults();
    let holder = harness.create_holder(0);
    let other = harness.create_holder(0);

    harness.grant_locked(&holder, 10_000, 6_000, 3_600);
    invariants.assert_all(&harness.snapshot(&[holder.clone(), other.clone()]));

    harness.client.transfer(&holder, &other, &4_000);
    assert_eq!(
        harness.client.try_transfer(&holder, &other, &1),
        Err(Ok(LedgerError::BalanceFrozen))
    );
    invariants.assert_all(&harness.snapshot(&[holder.clone(), other.clone()]));

    harness.env.advance_time(3_600);
    harness.client.clear_expired_freezing(&holder);
    harness.client.transfer(&holder, &other, &6_000);
    let snapshot = harness.snapshot(&[holder.clone(), other.clone()]);
    invariants.assert_all(&snapshot);

    assert_eq!(snapshot.account(&holder).map(|a| a.balance), Some(0));
    assert_eq!(snapshot.account(&other).map(|a| a.balance), Some(10_000));
}

#[test]
fn test_transition_clear_keeps_valid_balances() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let holder = harness.create_holder(HOLDER_FUNDING);
    lock_all(&harness, &holder, &[(1_000, 100), (2_000, 200), (3_000, 300)]);
    harness.env.set_timestamp(GENESIS + 250);

    let before = harness.snapshot(&[holder.clone()]);
    assert_eq!(harness.client.clear_expired_freezing(&holder), 2);
    let after = harness.snapshot(&[holder.clone()]);

    let mut transitions = TransitionInvariantSet::new();
    transitions.add(Box::new(ValidBalancesUnchanged));
    transitions.add(Box::new(MonotonicTime));
    transitions.assert_all(&before, &after);
    assert_eq!(after.account(&holder).map(|a| a.queue_len), Some(1));
}

#[test]
fn test_transition_balance_moved() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let from = harness.create_holder(HOLDER_FUNDING);
    let to = harness.create_holder(0);

    let before = harness.snapshot(&[from.clone(), to.clone()]);
    harness.client.transfer(&from, &to, &12_345);
    let after = harness.snapshot(&[from.clone(), to.clone()]);

    let mut transitions = TransitionInvariantSet::new();
    transitions.add(Box::new(BalanceMoved {
        from: from.clone(),
        to: to.clone(),
        amount: 12_345,
    }));
    transitions.assert_all(&before, &after);

    let mut wrong = TransitionInvariantSet::new();
    wrong.add(Box::new(BalanceMoved {
        from,
        to,
        amount: 12_000,
    }));
    assert_eq!(wrong.check_all(&before, &after).len(), 1);
}

#[test]
fn test_transition_flags_moved_valid_balance() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let holder = harness.create_holder(HOLDER_FUNDING);

    let before = harness.snapshot(&[holder.clone()]);
    harness.client.set_freezing(&harness.freezer, &holder, &(GENESIS + 10), &1, &0);
    let after = harness.snapshot(&[holder.clone()]);

    let mut transitions = TransitionInvariantSet::new();
    transitions.add(Box::new(ValidBalancesUnchanged));
    let violations = transitions.check_all(&before, &after);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].0, "valid balances unchanged");
}

// ═════════════════════════════════════════════════════════════════════════════
//  State Explorer Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_explorer_simple_sequence() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let holders = funded_holders(&harness, 2);

    let actions = std::vec![
        LedgerAction::Transfer { from: 0, to: 1, amount: 1_000 },
        LedgerAction::SetFreezing { account: 1, amount: 500, unlock_in: 3_600, category: 1 },
        LedgerAction::Transfer { from: 1, to: 2, amount: 600 },
        LedgerAction::AdvanceTime { delta: 3_600 },
        LedgerAction::ClearExpired { account: 1 },
    ];

    let mut explorer = StateExplorer::ledger(&harness, holders);
    let result = explorer.explore(&actions);

    assert!(result.passed(), "{:?}", result.summary.invariant_violations);
    assert_eq!(result.summary.actions_executed, 5);
    assert_eq!(result.summary.rejected_actions, 0);
    assert_eq!(result.summary.invariant_checks, 6);
}

#[test]
fn test_explorer_records_rejections() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let holders = funded_holders(&harness, 2);

    let actions = std::vec![
        LedgerAction::Transfer { from: 1, to: 2, amount: HOLDER_FUNDING + 1 },
        LedgerAction::SetFreezing { account: 1, amount: 1, unlock_in: 0, category: 0 },
        LedgerAction::Stop,
        LedgerAction::Transfer { from: 1, to: 2, amount: 1 },
        LedgerAction::ClearExpired { account: 1 },
    ];

    let mut explorer = StateExplorer::ledger(&harness, holders);
    let result = explorer.explore(&actions);
    let outcomes: std::vec::Vec<_> = result.action_log.iter().map(|(_, o)| o.clone()).collect();

    assert!(result.passed());
    assert_eq!(
        outcomes,
        std::vec![
            ActionOutcome::ExpectedError(LedgerError::InsufficientBalance as u32),
            ActionOutcome::ExpectedError(LedgerError::InvalidUnlockTime as u32),
            ActionOutcome::Ok,
            ActionOutcome::ExpectedError(LedgerError::Paused as u32),
            ActionOutcome::Ok,
        ]
    );
    assert_eq!(result.summary.rejected_actions, 3);
    assert_eq!(result.accepted(), 2);
}

#[test]
fn test_explorer_coverage_tracking() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let holders = funded_holders(&harness, 2);

    let actions = std::vec![
        LedgerAction::Transfer { from: 0, to: 1, amount: 100 },
        LedgerAction::Approve { owner: 1, spender: 2, amount: 100 },
        LedgerAction::TransferFrom { spender: 2, from: 1, to: 2, amount: 50 },
        LedgerAction::SetFreezing { account: 2, amount: 10, unlock_in: 60, category: 0 },
        LedgerAction::TransferAndFreezing { to: 1, amount: 100, freeze_amount: 40, unlock_in: 60 },
        LedgerAction::ClearExpired { account: 2 },
        LedgerAction::AdvanceTime { delta: 61 },
        LedgerAction::Stop,
        LedgerAction::Start,
    ];

    let mut explorer = StateExplorer::ledger(&harness, holders);
    let result = explorer.explore(&actions);

    assert!(result.passed());
    assert!(LEDGER_ENTRY_POINTS
        .iter()
        .all(|ep| result.summary.entry_points_hit.contains(*ep)));
    assert_eq!(result.summary.entry_points_hit.len(), LEDGER_ENTRY_POINTS.len() + 1);
}

#[test]
fn test_explorer_with_historical_patterns() {
    let patterns = [
        LedgerPattern::VestingGrant,
        LedgerPattern::AllowanceDrain,
        LedgerPattern::EmergencyStop,
        LedgerPattern::StaggeredUnlocks,
    ];

    for pattern in &patterns {
        let mut env = TestEnv::new();
        let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
        let holders = funded_holders(&harness, 2);

        let actions = pattern_to_actions(pattern, 3);
        let mut explorer = StateExplorer::ledger(&harness, holders);
        let result = explorer.explore(&actions);

        assert!(
            result.passed(),
            "Pattern {:?} failed: {:?}",
            pattern,
            result.summary.invariant_violations
        );
    }
}

#[test]
fn test_vesting_grant_pattern_outcomes() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let holders = std::vec![harness.create_holder(0), harness.create_holder(0)];
    let grantee = holders[0].clone();

    let actions = pattern_to_actions(&LedgerPattern::VestingGrant, 3);
    let mut explorer = StateExplorer::ledger(&harness, holders);
    let result = explorer.explore(&actions);
    let outcomes: std::vec::Vec<_> = result.action_log.iter().map(|(_, o)| o.clone()).collect();

    assert!(result.passed());
    assert_eq!(
        outcomes,
        std::vec![
            ActionOutcome::Ok,
            ActionOutcome::Ok,
            ActionOutcome::ExpectedError(LedgerError::BalanceFrozen as u32),
            ActionOutcome::Ok,
            ActionOutcome::Ok,
            ActionOutcome::Ok,
        ]
    );
    assert_eq!(harness.balance(&grantee), 0);
    assert_eq!(harness.queue_len(&grantee), 0);
}

#[test]
fn test_allowance_drain_pattern_outcomes() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let holders = std::vec![harness.create_holder(0), harness.create_holder(0)];
    let spender = holders[0].clone();

    let actions = pattern_to_actions(&LedgerPattern::AllowanceDrain, 3);
    let mut explorer = StateExplorer::ledger(&harness, holders);
    let result = explorer.explore(&actions);
    let denied = ActionOutcome::ExpectedError(LedgerError::InsufficientAllowance as u32);
    let outcomes: std::vec::Vec<_> = result.action_log.iter().map(|(_, o)| o.clone()).collect();

    assert_eq!(
        outcomes,
        std::vec![
            ActionOutcome::Ok,
            ActionOutcome::Ok,
            ActionOutcome::Ok,
            denied.clone(),
            ActionOutcome::Ok,
            denied,
        ]
    );
    assert_eq!(harness.client.allowance(&harness.owner, &spender), 0);
}

#[test]
fn test_emergency_stop_pattern_outcomes() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let holders = std::vec![harness.create_holder(0), harness.create_holder(0)];

    let actions = pattern_to_actions(&LedgerPattern::EmergencyStop, 3);
    let mut explorer = StateExplorer::ledger(&harness, holders);
    let result = explorer.explore(&actions);
    let paused = ActionOutcome::ExpectedError(LedgerError::Paused as u32);
    let outcomes: std::vec::Vec<_> = result.action_log.iter().map(|(_, o)| o.clone()).collect();

    assert_eq!(
        outcomes,
        std::vec![
            ActionOutcome::Ok,
            ActionOutcome::Ok,
            paused.clone(),
            paused,
            ActionOutcome::Ok,
            ActionOutcome::Ok,
        ]
    );
    assert!(!harness.client.stopped());
}

#[test]
fn test_sale_explorer_sell_out_and_finalize() {
    let mut env = TestEnv::new();
    let harness = SaleHarness::new(&mut env, sale_terms(), WINDOW, MIN_PAYMENT);
    let contributors = std::vec![
        harness.create_contributor(0),
        harness.create_contributor(0),
        harness.create_contributor(0),
    ];

    let actions = std::vec![
        SaleAction::Contribute { contributor: 0, amount: 510 },
        SaleAction::Contribute { contributor: 1, amount: 30_000 },
        SaleAction::Contribute { contributor: 2, amount: 500 },
        SaleAction::Finalize,
        SaleAction::AdvanceTime { delta: WINDOW },
        SaleAction::Refund { contributor: 0 },
        SaleAction::Finalize,
    ];

    let mut explorer = StateExplorer::sale(&harness, contributors.clone());
    let result = explorer.explore(&actions);
    let outcomes: std::vec::Vec<_> = result.action_log.iter().map(|(_, o)| o.clone()).collect();

    assert!(result.passed(), "{:?}", result.summary.invariant_violations);
    assert_eq!(
        outcomes,
        std::vec![
            ActionOutcome::Ok,
            ActionOutcome::Ok,
            ActionOutcome::ExpectedError(SaleError::CapReached as u32),
            ActionOutcome::ExpectedError(SaleError::NotClosed as u32),
            ActionOutcome::Ok,
            ActionOutcome::ExpectedError(SaleError::SoftCapReached as u32),
            ActionOutcome::Ok,
        ]
    );
    assert!(SALE_ENTRY_POINTS
        .iter()
        .all(|ep| result.summary.entry_points_hit.contains(*ep)));

    // 195_417 tokens were left for the second buyer, charged 195_417 / 9.
    assert_eq!(harness.coin.balance_of(&contributors[1]), 195_417);
    assert_eq!(harness.currency_balance(&contributors[1]), 30_000 - 21_713);
    assert_eq!(harness.sale.sold_amount(), 200_007);
    assert_eq!(harness.sale.phase(), Phase::Finalized);
    assert_eq!(harness.currency_balance(&harness.owner), 510 + 21_713);
}

// ═════════════════════════════════════════════════════════════════════════════
//  Snapshot Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_snapshot_captures_correct_state() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let holder = harness.create_holder(1_000);
    harness.grant_locked(&holder, 500, 500, 60);

    let snapshot = harness.snapshot(&[holder.clone()]);

    assert_eq!(snapshot.timestamp, GENESIS);
    assert_eq!(snapshot.total_supply, TOTAL_SUPPLY);
    assert!(!snapshot.stopped);
    assert_eq!(snapshot.accounts[0].address, harness.owner);
    assert_eq!(snapshot.accounts[0].balance, TOTAL_SUPPLY - 1_500);
    assert_eq!(
        snapshot.account(&holder),
        Some(&AccountState {
            address: holder.clone(),
            balance: 1_500,
            valid_balance: 1_000,
            queue_len: 1,
        })
    );
}

#[test]
fn test_snapshot_does_not_duplicate_owner() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let owner = harness.owner.clone();

    let snapshot = harness.snapshot(&[owner]);
    assert_eq!(snapshot.accounts.len(), 1);
    assert_eq!(snapshot.sum_balances(), TOTAL_SUPPLY);
}

#[test]
fn test_sale_snapshot_tracks_contributions() {
    let mut env = TestEnv::new();
    let harness = SaleHarness::new(&mut env, sale_terms(), WINDOW, MIN_PAYMENT);
    let buyer = harness.create_contributor(2_000);

    harness.contribute(&buyer, 510);
    harness.contribute(&buyer, 600);
    let snapshot = harness.snapshot(&[buyer.clone()]);

    assert_eq!(snapshot.sold_amount, 9 * 1_110);
    assert_eq!(snapshot.contribution_count, 2);
    assert_eq!(snapshot.currency_held, 1_110);
    assert_eq!(snapshot.sum_paid(), 1_110);
    assert_eq!(snapshot.sum_tokens(), 9 * 1_110);
    assert_eq!(snapshot.contributions[0].token_balance, 9 * 1_110);
    InvariantSet::sale_defaults().assert_all(&snapshot);
}

// ═════════════════════════════════════════════════════════════════════════════
//  Edge Cases
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_self_transfer_keeps_balance() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let holder = harness.create_holder(1_000);

    harness.client.transfer(&holder, &holder, &1_000);
    assert_eq!(harness.balance(&holder), 1_000);
    assert_eq!(
        harness.client.try_transfer(&holder, &holder, &1_001),
        Err(Ok(LedgerError::InsufficientBalance))
    );
}

#[test]
fn test_clear_before_any_unlock_removes_nothing() {
    let mut env = TestEnv::new();
    let harness = LedgerHarness::new(&mut env, TOTAL_SUPPLY);
    let holder = harness.create_holder(1_000);
    lock_all(&harness, &holder, &[(100, 10), (200, 20)]);

    assert_eq!(harness.client.clear_expired_freezing(&holder), 0);
    assert_eq!(harness.queue_len(&holder), 2);
    assert_eq!(harness.valid_balance(&holder), 700);
}

#[test]
fn test_failed_sale_refund_through_harness() {
    let mut env = TestEnv::new();
    let harness = SaleHarness::new(&mut env, sale_terms(), WINDOW, MIN_PAYMENT);
    let buyer = harness.create_contributor(510);

    harness.contribute(&buyer, 510);
    harness.close();
    assert_eq!(harness.sale.phase(), Phase::Closed);

    harness.approve_refund(&buyer);
    let refund = harness.sale.refund(&buyer);

    assert_eq!(refund, Refund { tokens: 4_590, returned: 510 });
    assert_eq!(harness.currency_balance(&buyer), 510);
    assert_eq!(harness.coin.balance_of(&buyer), 0);
    assert_eq!(harness.sale.sold_amount(), 0);
    InvariantSet::sale_defaults().assert_all(&harness.snapshot(&[buyer]));
}

#[test]
fn test_failed_sale_unlocks_after_lock_period() {
    let mut env = TestEnv::new();
    let harness = SaleHarness::new(&mut env, sale_terms(), WINDOW, MIN_PAYMENT);
    let buyer = harness.create_contributor(510);
    harness.contribute(&buyer, 510);

    harness.close();
    assert!(harness.sale.funds_locked());
    assert_eq!(
        harness.sale.try_withdraw(&harness.owner),
        Err(Ok(SaleError::Locked))
    );

    harness.unlock();
    assert!(!harness.sale.funds_locked());
    assert_eq!(harness.sale.withdraw(&harness.owner), 510);
    assert_eq!(harness.currency_balance(&harness.owner), 510);
}
