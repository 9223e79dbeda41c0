mod common;

use batch_router::{models::TokenDelta, RouterError};
use common::*;
use num_bigint::{BigInt, BigUint};
use pretty_assertions::assert_eq;
use router_common::{models::BufferState, traits::BufferOperations};
use rstest::rstest;

#[test_log::test]
fn test_redeem_then_swap_costs_a_fraction_of_the_bound() {
    let mut router = router();
    let max_amount_in = balance_of(&router, ALICE, POOL_AD);
    let request = exact_out_request(vec![exact_out_path(
        POOL_AD,
        vec![pool_step(POOL_AD, TOKEN_D), pool_step(POOL_DE, TOKEN_E)],
        e15(1),
        max_amount_in.clone(),
    )]);

    let result = router.swap_exact_out(&request).unwrap();

    let amount_in = &result.path_amounts[0];
    assert!(amount_in > &BigUint::default());
    assert!(amount_in < &(&max_amount_in / 100u32));
    assert_eq!(amount_in, &e15(1));
    assert_eq!(balance_of(&router, ALICE, POOL_AD), e18(100) - e15(1));
    assert_eq!(balance_of(&router, ALICE, TOKEN_E), e15(1));
    assert_eq!(
        result.net_deltas,
        vec![
            TokenDelta { token: addr(TOKEN_E), delta: BigInt::from(e15(1)) },
            TokenDelta { token: addr(POOL_AD), delta: -BigInt::from(e15(1)) },
        ]
    );
}

#[rstest]
#[case::tiny(e15(1))]
#[case::moderate(e18(1))]
#[case::large(e18(40))]
fn test_borrowed_pool_tokens_are_refunded(#[case] exact_amount_out: BigUint) {
    let mut router = router();
    let max_amount_in = e18(100);
    let request = exact_out_request(vec![exact_out_path(
        POOL_AD,
        vec![pool_step(POOL_AD, TOKEN_D), pool_step(POOL_DE, TOKEN_E)],
        exact_amount_out,
        max_amount_in.clone(),
    )]);

    let result = router.swap_exact_out(&request).unwrap();

    let consumed = &result.path_amounts[0];
    assert!(consumed <= &max_amount_in);
    assert_eq!(balance_of(&router, ALICE, POOL_AD), &max_amount_in - consumed);
}

#[rstest]
#[case::above_holdings(e18(200))]
#[case::above_supply(e18(5_000))]
fn test_redeem_bound_above_holdings_borrows_from_ledger(#[case] max_amount_in: BigUint) {
    let mut router = router();
    let supply_before = router
        .vault()
        .pool(&addr(POOL_AD))
        .unwrap()
        .total_supply
        .clone();
    let request = exact_out_request(vec![exact_out_path(
        POOL_AD,
        vec![pool_step(POOL_AD, TOKEN_D), pool_step(POOL_DE, TOKEN_E)],
        e15(1),
        max_amount_in,
    )]);

    let result = router.swap_exact_out(&request).unwrap();

    assert_eq!(result.path_amounts, vec![e15(1)]);
    assert_eq!(balance_of(&router, ALICE, POOL_AD), e18(100) - e15(1));
    assert_eq!(balance_of(&router, ALICE, TOKEN_E), e15(1));
    let pool_token_deltas: Vec<_> = result
        .net_deltas
        .iter()
        .filter(|delta| delta.token == addr(POOL_AD))
        .collect();
    assert_eq!(
        pool_token_deltas,
        vec![&TokenDelta { token: addr(POOL_AD), delta: -BigInt::from(e15(1)) }]
    );
    // only the consumed amount is burned, the rest of the loan went back to the ledger
    let pool = router
        .vault()
        .pool(&addr(POOL_AD))
        .unwrap();
    assert_eq!(pool.total_supply, supply_before - e15(1));
}

#[test]
fn test_redeem_cost_above_holdings_fails_at_settlement() {
    let mut router = router();
    let before = snapshot(&router);
    let request = exact_out_request(vec![exact_out_path(
        POOL_AD,
        vec![pool_step(POOL_AD, TOKEN_D), pool_step(POOL_DE, TOKEN_E)],
        e18(150),
        e18(200),
    )]);

    let res = router.swap_exact_out(&request);

    assert!(matches!(res, Err(RouterError::Vault(_))), "{res:?}");
    assert_eq!(snapshot(&router), before);
}

#[test]
fn test_borrow_bound_exceeded() {
    let mut router = router();
    let before = snapshot(&router);
    let request = exact_out_request(vec![exact_out_path(
        POOL_AD,
        vec![pool_step(POOL_AD, TOKEN_D), pool_step(POOL_DE, TOKEN_E)],
        e18(5),
        e18(4),
    )]);

    let res = router.swap_exact_out(&request);

    assert_eq!(res, Err(RouterError::SwapLimit { path: 0, amount: e18(5), limit: e18(4) }));
    assert_eq!(snapshot(&router), before);
}

#[test]
fn test_single_removal_is_not_borrowed() {
    let mut router = router();
    let request = exact_out_request(vec![exact_out_path(
        POOL_AD,
        vec![pool_step(POOL_AD, TOKEN_D)],
        e18(5),
        e18(10),
    )]);

    let result = router.swap_exact_out(&request).unwrap();

    assert_eq!(result.path_amounts, vec![e18(5)]);
    assert_eq!(result.tokens, vec![addr(POOL_AD)]);
    assert_eq!(balance_of(&router, ALICE, POOL_AD), e18(95));
    assert_eq!(balance_of(&router, ALICE, TOKEN_D), e18(5));
}

#[test]
fn test_single_removal_above_max() {
    let mut router = router();
    let request = exact_out_request(vec![exact_out_path(
        POOL_AD,
        vec![pool_step(POOL_AD, TOKEN_D)],
        e18(5),
        e18(4),
    )]);

    let res = router.swap_exact_out(&request);

    assert_eq!(res, Err(RouterError::SwapLimit { path: 0, amount: e18(5), limit: e18(4) }));
    assert_eq!(balance_of(&router, ALICE, POOL_AD), e18(100));
}

#[test]
fn test_intermediate_removal_borrows_from_ledger() {
    let mut router = router();
    let request = exact_out_request(vec![exact_out_path(
        TOKEN_A,
        vec![
            pool_step(POOL_AD, POOL_AD),
            pool_step(POOL_AD, TOKEN_D),
            pool_step(POOL_DE, TOKEN_E),
        ],
        e18(1),
        e18(10),
    )]);

    let result = router.swap_exact_out(&request).unwrap();

    assert_eq!(result.path_amounts, vec![e18(1)]);
    assert_eq!(balance_of(&router, ALICE, TOKEN_A), e18(999));
    assert_eq!(balance_of(&router, ALICE, TOKEN_E), e18(1));
    assert_eq!(balance_of(&router, ALICE, POOL_AD), e18(100));
    // one pool token burned, one minted
    let pool = router
        .vault()
        .pool(&addr(POOL_AD))
        .unwrap();
    assert_eq!(pool.total_supply, e18(2_000));
}

#[test]
fn test_final_removal_lends_exact_amount_from_ledger() {
    let mut router = router();
    let request = exact_out_request(vec![exact_out_path(
        TOKEN_A,
        vec![pool_step(POOL_AD, POOL_AD), pool_step(POOL_AD, TOKEN_D)],
        e18(1),
        e18(5),
    )]);

    let result = router.swap_exact_out(&request).unwrap();

    assert_eq!(result.path_amounts, vec![e18(1)]);
    assert_eq!(balance_of(&router, ALICE, TOKEN_D), e18(1));
}

#[test]
fn test_paths_reported_in_request_order() {
    let mut router = router();
    let request = exact_out_request(vec![
        exact_out_path(TOKEN_A, vec![pool_step(POOL_AB, TOKEN_B)], e18(1), e18(2)),
        exact_out_path(
            TOKEN_A,
            vec![pool_step(POOL_AD, TOKEN_D), pool_step(POOL_DE, TOKEN_E)],
            e18(2),
            e18(3),
        ),
    ]);

    let result = router.swap_exact_out(&request).unwrap();

    assert_eq!(result.path_amounts, vec![e18(1), e18(2)]);
    assert_eq!(result.tokens, vec![addr(TOKEN_A)]);
    assert_eq!(result.amounts, vec![e18(3)]);
    assert_eq!(balance_of(&router, ALICE, TOKEN_B), e18(101));
    assert_eq!(balance_of(&router, ALICE, TOKEN_E), e18(2));
}

#[test]
fn test_fee_hook_raises_cost() {
    let mut router = router();
    let request = exact_out_request(vec![exact_out_path(
        TOKEN_A,
        vec![pool_step(POOL_FEE_HOOK, TOKEN_B)],
        e18(1),
        e18(2),
    )]);

    let result = router.swap_exact_out(&request).unwrap();

    assert_eq!(result.path_amounts, vec![e15(1_010)]);
    assert_eq!(balance_of(&router, ALICE, TOKEN_A), e18(1_000) - e15(1_010));
    assert_eq!(balance_of(&router, HOOK, TOKEN_A), e18(1_000) + e15(10));
}

#[test]
fn test_fee_hook_cost_checked_against_maximum() {
    let mut router = router();
    let before = snapshot(&router);
    let request = exact_out_request(vec![exact_out_path(
        TOKEN_A,
        vec![pool_step(POOL_FEE_HOOK, TOKEN_B)],
        e18(1),
        e15(1_005),
    )]);

    let res = router.swap_exact_out(&request);

    assert_eq!(
        res,
        Err(RouterError::SwapLimit { path: 0, amount: e15(1_010), limit: e15(1_005) })
    );
    assert_eq!(snapshot(&router), before);
}

#[test]
fn test_discount_hook_lowers_cost() {
    let mut router = router();
    let request = exact_out_request(vec![exact_out_path(
        TOKEN_A,
        vec![pool_step(POOL_DISCOUNT_HOOK, TOKEN_B)],
        e18(1),
        e18(1),
    )]);

    let result = router.swap_exact_out(&request).unwrap();

    assert_eq!(result.path_amounts, vec![e15(990)]);
    assert_eq!(balance_of(&router, ALICE, TOKEN_A), e18(1_000) - e15(990));
    assert_eq!(balance_of(&router, HOOK, TOKEN_A), e18(1_000) - e15(10));
}

#[rstest]
#[case::through_buffer(e18(5), e18(10), BufferState::new(e18(110), e18(45)))]
#[case::direct(e18(60), e18(120), BufferState::new(e18(100), e18(50)))]
fn test_wrap_exact_out(
    #[case] exact_amount_out: BigUint,
    #[case] expected_in: BigUint,
    #[case] expected_buffer: BufferState,
) {
    let mut router = router();
    let request = exact_out_request(vec![exact_out_path(
        TOKEN_A,
        vec![buffer_step(WRAPPED_A, WRAPPED_A)],
        exact_amount_out.clone(),
        e18(500),
    )]);

    let result = router.swap_exact_out(&request).unwrap();

    assert_eq!(result.path_amounts, vec![expected_in]);
    assert_eq!(balance_of(&router, ALICE, WRAPPED_A), exact_amount_out);
    assert_eq!(
        router
            .vault()
            .buffer(&addr(WRAPPED_A))
            .unwrap(),
        expected_buffer
    );
}

#[test]
fn test_unwrap_exact_out_rounds_shares_up() {
    let mut router = router();
    router
        .vault_mut()
        .mint(&addr(ALICE), &addr(WRAPPED_A), &e18(10));
    let amount_out = e18(4) + BigUint::from(1u32);
    let request = exact_out_request(vec![exact_out_path(
        WRAPPED_A,
        vec![buffer_step(WRAPPED_A, TOKEN_A)],
        amount_out,
        e18(10),
    )]);

    let result = router.swap_exact_out(&request).unwrap();

    // half a share per asset, the odd asset costs a whole extra share unit
    assert_eq!(result.path_amounts, vec![e18(2) + BigUint::from(1u32)]);
}
