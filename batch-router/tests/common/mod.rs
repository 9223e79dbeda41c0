//! Shared ledger fixture for the engine tests.
//!
//! Token and pool identities are small integers turned into 20 byte addresses. Every pool is
//! seeded with 1000 tokens per side, so its pool token supply starts at the invariant.
#![allow(dead_code)]

use batch_router::{
    models::{SwapExactInRequest, SwapExactOutRequest},
    BatchRouter,
};
use num_bigint::BigUint;
use router_common::{
    models::{
        native_asset,
        path::{ExactInPath, ExactOutPath, Step},
        Address, BufferState,
    },
    traits::{BufferOperations, Settlement},
    vault::{
        hooks::{HookConfig, HookKind},
        pool::PoolKind,
        wrapped::WrappedToken,
        BalanceConfig, BufferConfig, InMemoryVault, PoolConfig, VaultSeed,
    },
    Bytes,
};

pub const TOKEN_A: u64 = 1;
pub const TOKEN_B: u64 = 2;
pub const TOKEN_D: u64 = 3;
pub const TOKEN_E: u64 = 4;
pub const WRAPPED_A: u64 = 10;
pub const WRAPPED_NATIVE: u64 = 20;

/// Linear, no fee, tokens A and B.
pub const POOL_AB: u64 = 100;
/// Linear, no fee, tokens A and D. Its pool token is the one redeemed in removal paths.
pub const POOL_AD: u64 = 200;
/// Same as `POOL_AD` with a 1% swap fee.
pub const POOL_AD_FEE: u64 = 201;
/// Linear, no fee, tokens D and E.
pub const POOL_DE: u64 = 300;
/// Tokens A and B behind a 1% fee hook.
pub const POOL_FEE_HOOK: u64 = 400;
/// Tokens A and B behind a 1% discount hook funded by `HOOK`.
pub const POOL_DISCOUNT_HOOK: u64 = 401;
/// Tokens A and B behind a 1% discount hook whose account holds nothing.
pub const POOL_BROKE_HOOK: u64 = 402;
/// Linear, no fee, wrapped A and B.
pub const POOL_WRAPPED: u64 = 500;
/// Linear, no fee, wrapped native and B.
pub const POOL_NATIVE: u64 = 600;

pub const ALICE: u64 = 1_000;
pub const HOOK: u64 = 2_000;
pub const BROKE_HOOK: u64 = 2_001;

pub const NOW: u64 = 1_000_000;

pub fn addr(value: u64) -> Address {
    Bytes::from_low_u64(value)
}

pub fn e18(value: u64) -> BigUint {
    BigUint::from(value) * BigUint::from(10u64).pow(18)
}

pub fn e15(value: u64) -> BigUint {
    BigUint::from(value) * BigUint::from(10u64).pow(15)
}

fn pool(
    address: u64,
    tokens: [u64; 2],
    fee_bps: u32,
    hook: Option<(u64, HookKind)>,
) -> PoolConfig {
    PoolConfig {
        address: addr(address),
        kind: PoolKind::Linear,
        tokens: tokens.iter().copied().map(addr).collect(),
        balances: vec![e18(1_000), e18(1_000)],
        total_supply: None,
        fee_bps,
        hook: hook.map(|(account, kind)| HookConfig { account: addr(account), kind }),
    }
}

fn balance(account: u64, token: &Address, amount: BigUint) -> BalanceConfig {
    BalanceConfig { account: addr(account), token: token.clone(), amount }
}

pub fn seed() -> VaultSeed {
    VaultSeed {
        timestamp: NOW,
        wrapped_native: Some(addr(WRAPPED_NATIVE)),
        pools: vec![
            pool(POOL_AB, [TOKEN_A, TOKEN_B], 0, None),
            pool(POOL_AD, [TOKEN_A, TOKEN_D], 0, None),
            pool(POOL_AD_FEE, [TOKEN_A, TOKEN_D], 100, None),
            pool(POOL_DE, [TOKEN_D, TOKEN_E], 0, None),
            pool(
                POOL_FEE_HOOK,
                [TOKEN_A, TOKEN_B],
                0,
                Some((HOOK, HookKind::Fee { fee_bps: 100 })),
            ),
            pool(
                POOL_DISCOUNT_HOOK,
                [TOKEN_A, TOKEN_B],
                0,
                Some((HOOK, HookKind::Discount { discount_bps: 100 })),
            ),
            pool(
                POOL_BROKE_HOOK,
                [TOKEN_A, TOKEN_B],
                0,
                Some((BROKE_HOOK, HookKind::Discount { discount_bps: 100 })),
            ),
            pool(POOL_WRAPPED, [WRAPPED_A, TOKEN_B], 0, None),
            pool(POOL_NATIVE, [WRAPPED_NATIVE, TOKEN_B], 0, None),
        ],
        // two units of A per share
        wrapped_tokens: vec![WrappedToken {
            address: addr(WRAPPED_A),
            underlying: addr(TOKEN_A),
            total_assets: e18(2_000),
            total_supply: e18(1_000),
        }],
        buffers: vec![BufferConfig {
            wrapped: addr(WRAPPED_A),
            underlying: addr(TOKEN_A),
            underlying_balance: e18(100),
            wrapped_balance: e18(50),
        }],
        balances: vec![
            balance(ALICE, &addr(TOKEN_A), e18(1_000)),
            balance(ALICE, &addr(TOKEN_B), e18(100)),
            balance(ALICE, &addr(POOL_AD), e18(100)),
            balance(ALICE, &addr(POOL_AD_FEE), e18(100)),
            balance(ALICE, &addr(POOL_WRAPPED), e18(10)),
            balance(ALICE, &native_asset(), e18(100)),
            balance(HOOK, &addr(TOKEN_A), e18(1_000)),
            balance(HOOK, &addr(TOKEN_B), e18(1_000)),
        ],
        ..Default::default()
    }
}

pub fn router() -> BatchRouter<InMemoryVault> {
    BatchRouter::new(InMemoryVault::from_seed(seed()).expect("fixture seeds"))
}

/// Every token an account can hold in the fixture.
pub fn all_tokens() -> Vec<Address> {
    let mut tokens: Vec<Address> = [
        TOKEN_A,
        TOKEN_B,
        TOKEN_D,
        TOKEN_E,
        WRAPPED_A,
        WRAPPED_NATIVE,
        POOL_AB,
        POOL_AD,
        POOL_AD_FEE,
        POOL_DE,
        POOL_FEE_HOOK,
        POOL_DISCOUNT_HOOK,
        POOL_BROKE_HOOK,
        POOL_WRAPPED,
        POOL_NATIVE,
    ]
    .into_iter()
    .map(addr)
    .collect();
    tokens.push(native_asset());
    tokens
}

pub fn balance_of(router: &BatchRouter<InMemoryVault>, account: u64, token: u64) -> BigUint {
    router
        .vault()
        .balance_of(&addr(account), &addr(token))
}

/// Observable ledger state: account holdings, pool reserves and supplies, wrapped token
/// reserves and buffer reserves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshot {
    holdings: Vec<BigUint>,
    pools: Vec<(Vec<BigUint>, BigUint)>,
    wrapped: WrappedToken,
    buffer: BufferState,
}

pub fn snapshot(router: &BatchRouter<InMemoryVault>) -> LedgerSnapshot {
    let vault = router.vault();
    let holdings = [ALICE, HOOK, BROKE_HOOK]
        .into_iter()
        .flat_map(|account| {
            all_tokens()
                .into_iter()
                .map(move |token| vault.balance_of(&addr(account), &token))
        })
        .collect();
    let pools = seed()
        .pools
        .iter()
        .map(|config| {
            let pool = vault
                .pool(&config.address)
                .expect("fixture pool");
            (pool.balances.clone(), pool.total_supply.clone())
        })
        .collect();
    LedgerSnapshot {
        holdings,
        pools,
        wrapped: vault
            .wrapped_token(&addr(WRAPPED_A))
            .expect("fixture wrapped token")
            .clone(),
        buffer: vault
            .buffer(&addr(WRAPPED_A))
            .expect("fixture buffer"),
    }
}

pub fn exact_in_path(
    token_in: u64,
    steps: Vec<Step>,
    exact_amount_in: BigUint,
    min_amount_out: BigUint,
) -> ExactInPath {
    ExactInPath { token_in: addr(token_in), steps, exact_amount_in, min_amount_out }
}

pub fn exact_out_path(
    token_in: u64,
    steps: Vec<Step>,
    exact_amount_out: BigUint,
    max_amount_in: BigUint,
) -> ExactOutPath {
    ExactOutPath { token_in: addr(token_in), steps, exact_amount_out, max_amount_in }
}

pub fn pool_step(pool: u64, token_out: u64) -> Step {
    Step::pool(addr(pool), addr(token_out))
}

pub fn buffer_step(wrapped: u64, token_out: u64) -> Step {
    Step::buffer(addr(wrapped), addr(token_out))
}

pub fn exact_in_request(paths: Vec<ExactInPath>) -> SwapExactInRequest {
    SwapExactInRequest {
        sender: addr(ALICE),
        paths,
        deadline: NOW + 60,
        native_asset_mode: false,
        user_data: Bytes::new(),
    }
}

pub fn exact_out_request(paths: Vec<ExactOutPath>) -> SwapExactOutRequest {
    SwapExactOutRequest {
        sender: addr(ALICE),
        paths,
        deadline: NOW + 60,
        native_asset_mode: false,
        user_data: Bytes::new(),
    }
}
