//! In-memory reference ledger.
//!
//! Holds pool balances, wrapped assets, buffer reserves and account holdings, and implements the
//! collaborator traits the router consumes. Every operation validates before it mutates, so a
//! failing call leaves the ledger untouched.

pub mod hooks;
pub mod math;
pub mod pool;
pub mod transient;
pub mod wrapped;

use std::collections::HashMap;

use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    config::VaultConfig,
    errors::VaultError,
    models::{
        native_asset,
        operation::{
            AddLiquidityKind, AddLiquidityRequest, ConversionOutcome, HookAdjustment, LendSource,
            LiquidityOutcome, RemoveLiquidityKind, RemoveLiquidityRequest, SwapOutcome,
            SwapRequest,
        },
        Address, BufferState, SwapKind, WrappingDirection,
    },
    serde_primitives::{biguint_string, biguint_string_vec},
    traits::{AfterSwapParams, BufferOperations, PoolOperations, Settlement},
    vault::{
        hooks::HookConfig,
        math::BPS,
        pool::{Pool, PoolKind},
        transient::TransientAccounting,
        wrapped::WrappedToken,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub address: Address,
    pub kind: PoolKind,
    pub tokens: Vec<Address>,
    #[serde(with = "biguint_string_vec")]
    pub balances: Vec<BigUint>,
    /// Initial pool token supply. Defaults to the pool's invariant.
    #[serde(default, with = "optional_biguint")]
    pub total_supply: Option<BigUint>,
    #[serde(default)]
    pub fee_bps: u32,
    #[serde(default)]
    pub hook: Option<HookConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    pub wrapped: Address,
    pub underlying: Address,
    #[serde(with = "biguint_string")]
    pub underlying_balance: BigUint,
    #[serde(with = "biguint_string")]
    pub wrapped_balance: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub account: Address,
    pub token: Address,
    #[serde(with = "biguint_string")]
    pub amount: BigUint,
}

/// Everything needed to build a ledger from a scenario file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSeed {
    #[serde(default)]
    pub config: VaultConfig,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub wrapped_native: Option<Address>,
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
    #[serde(default)]
    pub wrapped_tokens: Vec<WrappedToken>,
    #[serde(default)]
    pub buffers: Vec<BufferConfig>,
    #[serde(default)]
    pub balances: Vec<BalanceConfig>,
}

mod optional_biguint {
    use std::str::FromStr;

    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<BigUint>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_some(&value.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<BigUint>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|value| BigUint::from_str(value.trim()).map_err(de::Error::custom))
            .transpose()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryVault {
    config: VaultConfig,
    timestamp: u64,
    wrapped_native: Option<Address>,
    pools: HashMap<Address, Pool>,
    wrapped_tokens: HashMap<Address, WrappedToken>,
    buffers: HashMap<Address, BufferState>,
    /// Holdings per account, then per token.
    balances: HashMap<Address, HashMap<Address, BigUint>>,
    transient: TransientAccounting,
}

impl InMemoryVault {
    pub fn new(config: VaultConfig) -> Self {
        Self { config, ..Default::default() }
    }

    pub fn from_seed(seed: VaultSeed) -> Result<Self, VaultError> {
        let mut vault = Self::new(seed.config);
        vault.set_timestamp(seed.timestamp);
        vault.wrapped_native = seed.wrapped_native;
        for wrapped in seed.wrapped_tokens {
            vault.register_wrapped_token(wrapped)?;
        }
        for pool in seed.pools {
            vault.register_pool(pool)?;
        }
        for buffer in seed.buffers {
            vault.initialize_buffer(buffer)?;
        }
        for balance in seed.balances {
            vault.mint(&balance.account, &balance.token, &balance.amount);
        }
        debug!(
            pools = vault.pools.len(),
            wrapped_tokens = vault.wrapped_tokens.len(),
            buffers = vault.buffers.len(),
            "Ledger seeded"
        );
        Ok(vault)
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn set_wrapped_native(&mut self, token: Address) {
        self.wrapped_native = Some(token);
    }

    pub fn register_pool(&mut self, config: PoolConfig) -> Result<(), VaultError> {
        let invalid = |reason: String| {
            Err(VaultError::InvalidConfiguration(format!("pool {}: {reason}", config.address)))
        };
        if self.pools.contains_key(&config.address) {
            return invalid("already registered".to_string());
        }
        if config.tokens.len() < 2 || config.tokens.len() != config.balances.len() {
            return invalid(format!(
                "{} tokens with {} balances",
                config.tokens.len(),
                config.balances.len()
            ));
        }
        if config.kind == PoolKind::ConstantProduct && config.tokens.len() != 2 {
            return invalid("constant product pools take exactly two tokens".to_string());
        }
        if config.fee_bps >= BPS {
            return invalid(format!("fee of {} bps", config.fee_bps));
        }
        for (i, token) in config.tokens.iter().enumerate() {
            if config.tokens[..i].contains(token) || token == &config.address {
                return invalid(format!("token {token} listed twice"));
            }
        }
        let hook = config
            .hook
            .as_ref()
            .map(HookConfig::build)
            .transpose()?;
        let mut pool = Pool {
            address: config.address.clone(),
            kind: config.kind,
            tokens: config.tokens,
            balances: config.balances,
            total_supply: BigUint::zero(),
            fee_bps: config.fee_bps,
            hook,
        };
        pool.total_supply = config
            .total_supply
            .unwrap_or_else(|| pool.invariant(&pool.balances));
        debug!(
            pool = %pool.address,
            kind = %pool.kind,
            supply = %pool.total_supply,
            "Pool registered"
        );
        self.pools
            .insert(config.address, pool);
        Ok(())
    }

    pub fn register_wrapped_token(&mut self, token: WrappedToken) -> Result<(), VaultError> {
        if token.address == token.underlying {
            return Err(VaultError::InvalidConfiguration(format!(
                "wrapped token {} wraps itself",
                token.address
            )));
        }
        self.wrapped_tokens
            .insert(token.address.clone(), token);
        Ok(())
    }

    /// Seeds the buffer of a registered wrapped token.
    pub fn initialize_buffer(&mut self, config: BufferConfig) -> Result<(), VaultError> {
        let wrapped = self
            .wrapped_tokens
            .get(&config.wrapped)
            .ok_or_else(|| VaultError::WrappedTokenNotRegistered(config.wrapped.clone()))?;
        if wrapped.underlying != config.underlying {
            return Err(VaultError::InvalidConfiguration(format!(
                "buffer {} declares underlying {} but the token wraps {}",
                config.wrapped, config.underlying, wrapped.underlying
            )));
        }
        if self.buffers.contains_key(&config.wrapped) {
            return Err(VaultError::InvalidConfiguration(format!(
                "buffer {} already initialized",
                config.wrapped
            )));
        }
        self.buffers.insert(
            config.wrapped,
            BufferState::new(config.underlying_balance, config.wrapped_balance),
        );
        Ok(())
    }

    /// Adds to an account's holdings.
    pub fn mint(&mut self, account: &Address, token: &Address, amount: &BigUint) {
        *self
            .balances
            .entry(account.clone())
            .or_default()
            .entry(token.clone())
            .or_default() += amount;
    }

    pub fn pool(&self, address: &Address) -> Result<&Pool, VaultError> {
        self.pools
            .get(address)
            .ok_or_else(|| VaultError::PoolNotRegistered(address.clone()))
    }

    fn pool_mut(&mut self, address: &Address) -> Result<&mut Pool, VaultError> {
        self.pools
            .get_mut(address)
            .ok_or_else(|| VaultError::PoolNotRegistered(address.clone()))
    }

    pub fn wrapped_token(&self, address: &Address) -> Result<&WrappedToken, VaultError> {
        self.wrapped_tokens
            .get(address)
            .ok_or_else(|| VaultError::WrappedTokenNotRegistered(address.clone()))
    }

    fn check_trade_amount(&self, amount: &BigUint) -> Result<(), VaultError> {
        if amount < &self.config.minimum_trade_amount {
            return Err(VaultError::TradeAmountTooSmall {
                amount: amount.clone(),
                minimum: self.config.minimum_trade_amount.clone(),
            });
        }
        Ok(())
    }

    fn check_liquidity_amount(&self, amount: &BigUint) -> Result<(), VaultError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.check_trade_amount(amount)
    }

    fn check_wrap_amount(&self, amount: &BigUint) -> Result<(), VaultError> {
        if amount < &self.config.minimum_wrap_amount {
            return Err(VaultError::WrapAmountTooSmall {
                amount: amount.clone(),
                minimum: self.config.minimum_wrap_amount.clone(),
            });
        }
        Ok(())
    }

    fn sub_balance(
        &mut self,
        account: &Address,
        token: &Address,
        amount: &BigUint,
    ) -> Result<(), VaultError> {
        let available = self.balance_of(account, token);
        if &available < amount {
            return Err(VaultError::InsufficientBalance {
                account: account.clone(),
                token: token.clone(),
                available,
                required: amount.clone(),
            });
        }
        self.balances
            .entry(account.clone())
            .or_default()
            .insert(token.clone(), available - amount);
        Ok(())
    }

    fn settlement_token(&self, token: &Address, native_asset_mode: bool) -> Address {
        if native_asset_mode && self.wrapped_native.as_ref() == Some(token) {
            native_asset()
        } else {
            token.clone()
        }
    }
}

/// Amounts a swap actually moves once the hook has run.
struct HookedSwap {
    amount_calculated: BigUint,
    router_pays: BigUint,
    router_receives: BigUint,
    /// Fee paid to (positive) or discount funded by (negative) the hook account.
    hook_transfer: Option<(Address, Address, BigInt)>,
    adjustment: Option<HookAdjustment>,
}

impl InMemoryVault {
    fn apply_hook(
        &self,
        pool: &Pool,
        request: &SwapRequest,
        raw_in: &BigUint,
        raw_out: &BigUint,
    ) -> Result<HookedSwap, VaultError> {
        let raw_calculated = match request.kind {
            SwapKind::ExactIn => raw_out,
            SwapKind::ExactOut => raw_in,
        };
        let Some(binding) = pool.hook.as_ref() else {
            return Ok(HookedSwap {
                amount_calculated: raw_calculated.clone(),
                router_pays: raw_in.clone(),
                router_receives: raw_out.clone(),
                hook_transfer: None,
                adjustment: None,
            });
        };
        let adjusted = binding
            .hook
            .on_after_swap(&AfterSwapParams {
                kind: request.kind,
                pool: &pool.address,
                token_in: &request.token_in,
                token_out: &request.token_out,
                amount_in: raw_in,
                amount_out: raw_out,
                amount_calculated: raw_calculated,
                user_data: &request.user_data,
            })?;

        let token = match request.kind {
            SwapKind::ExactIn => &request.token_out,
            SwapKind::ExactOut => &request.token_in,
        };
        // A lower output or a higher input is a fee the hook collects.
        let is_fee = match request.kind {
            SwapKind::ExactIn => &adjusted <= raw_calculated,
            SwapKind::ExactOut => &adjusted >= raw_calculated,
        };
        let (promised, settled) = if is_fee {
            let fee = if &adjusted > raw_calculated {
                &adjusted - raw_calculated
            } else {
                raw_calculated - &adjusted
            };
            (fee.clone(), fee)
        } else {
            let discount = if &adjusted > raw_calculated {
                &adjusted - raw_calculated
            } else {
                raw_calculated - &adjusted
            };
            let funded = self
                .balance_of(&binding.account, token)
                .min(discount.clone());
            (discount, funded)
        };
        trace!(
            hook = %binding.account,
            %token,
            fee = is_fee,
            %promised,
            %settled,
            "Hook adjusted swap"
        );

        let (router_pays, router_receives) = match (request.kind, is_fee) {
            (SwapKind::ExactIn, true) => (raw_in.clone(), raw_out - &settled),
            (SwapKind::ExactIn, false) => (raw_in.clone(), raw_out + &settled),
            (SwapKind::ExactOut, true) => (raw_in + &settled, raw_out.clone()),
            (SwapKind::ExactOut, false) => (raw_in - &settled, raw_out.clone()),
        };
        let transfer = if is_fee {
            BigInt::from(settled.clone())
        } else {
            -BigInt::from(settled.clone())
        };
        Ok(HookedSwap {
            amount_calculated: adjusted,
            router_pays,
            router_receives,
            hook_transfer: Some((binding.account.clone(), token.clone(), transfer)),
            adjustment: Some(HookAdjustment {
                hook: binding.account.clone(),
                token: token.clone(),
                promised,
                settled,
            }),
        })
    }
}

impl PoolOperations for InMemoryVault {
    fn pool_tokens(&self, pool: &Address) -> Result<Vec<Address>, VaultError> {
        Ok(self.pool(pool)?.tokens.clone())
    }

    fn swap(&mut self, request: &SwapRequest) -> Result<SwapOutcome, VaultError> {
        if request.token_in == request.token_out {
            return Err(VaultError::InvalidConfiguration(format!(
                "swap of {} into itself",
                request.token_in
            )));
        }
        let pool = self.pool(&request.pool)?;
        let index_in = pool.token_index(&request.token_in)?;
        let index_out = pool.token_index(&request.token_out)?;
        self.check_trade_amount(&request.amount_given)?;

        let raw_calculated =
            pool.compute_swap(request.kind, index_in, index_out, &request.amount_given)?;
        self.check_trade_amount(&raw_calculated)?;
        let (raw_in, raw_out) = match request.kind {
            SwapKind::ExactIn => (request.amount_given.clone(), raw_calculated),
            SwapKind::ExactOut => (raw_calculated, request.amount_given.clone()),
        };
        let hooked = self.apply_hook(pool, request, &raw_in, &raw_out)?;

        if let Some(limit) = &request.limit {
            let violated = match request.kind {
                SwapKind::ExactIn => &hooked.amount_calculated < limit,
                SwapKind::ExactOut => &hooked.amount_calculated > limit,
            };
            if violated {
                return Err(VaultError::SwapLimit {
                    amount: hooked.amount_calculated,
                    limit: limit.clone(),
                });
            }
        }

        if let Some((account, token, transfer)) = &hooked.hook_transfer {
            if transfer.is_negative() {
                self.sub_balance(account, token, transfer.magnitude())?;
            } else {
                self.mint(account, token, transfer.magnitude());
            }
        }
        let pool = self.pool_mut(&request.pool)?;
        pool.balances[index_in] += &raw_in;
        pool.balances[index_out] -= &raw_out;
        self.transient
            .debit(&request.token_in, &hooked.router_pays);
        self.transient
            .credit(&request.token_out, &hooked.router_receives);
        trace!(
            pool = %request.pool,
            kind = %request.kind,
            amount_in = %hooked.router_pays,
            amount_out = %hooked.router_receives,
            "Swap"
        );

        Ok(SwapOutcome {
            amount_calculated: hooked.amount_calculated,
            amount_in: hooked.router_pays,
            amount_out: hooked.router_receives,
            hook_adjustment: hooked.adjustment,
        })
    }

    fn add_liquidity(
        &mut self,
        request: &AddLiquidityRequest,
    ) -> Result<LiquidityOutcome, VaultError> {
        let pool = self.pool(&request.pool)?;
        let (pool_tokens, amounts) = match &request.kind {
            AddLiquidityKind::Unbalanced { exact_amounts_in, min_pool_tokens_out } => {
                for amount in exact_amounts_in {
                    self.check_liquidity_amount(amount)?;
                }
                let minted = pool.compute_add_unbalanced(exact_amounts_in)?;
                self.check_trade_amount(&minted)?;
                if let Some(limit) = min_pool_tokens_out {
                    if &minted < limit {
                        return Err(VaultError::AmountOutBelowMin {
                            token: request.pool.clone(),
                            amount: minted,
                            limit: limit.clone(),
                        });
                    }
                }
                (minted, exact_amounts_in.clone())
            }
            AddLiquidityKind::SingleTokenExactOut {
                token,
                exact_pool_tokens_out,
                max_amount_in,
            } => {
                let index = pool.token_index(token)?;
                self.check_trade_amount(exact_pool_tokens_out)?;
                let amount_in =
                    pool.compute_add_single_token_exact_out(index, exact_pool_tokens_out)?;
                self.check_trade_amount(&amount_in)?;
                if let Some(limit) = max_amount_in {
                    if &amount_in > limit {
                        return Err(VaultError::AmountInAboveMax {
                            token: token.clone(),
                            amount: amount_in,
                            limit: limit.clone(),
                        });
                    }
                }
                let mut amounts = vec![BigUint::zero(); pool.tokens.len()];
                amounts[index] = amount_in;
                (exact_pool_tokens_out.clone(), amounts)
            }
        };

        let tokens = pool.tokens.clone();
        let pool = self.pool_mut(&request.pool)?;
        for (balance, amount) in pool.balances.iter_mut().zip(&amounts) {
            *balance += amount;
        }
        pool.total_supply += &pool_tokens;
        for (token, amount) in tokens.iter().zip(&amounts) {
            if !amount.is_zero() {
                self.transient.debit(token, amount);
            }
        }
        self.transient
            .credit(&request.pool, &pool_tokens);
        trace!(pool = %request.pool, minted = %pool_tokens, "Liquidity added");

        Ok(LiquidityOutcome::new(pool_tokens, amounts))
    }

    fn remove_liquidity(
        &mut self,
        request: &RemoveLiquidityRequest,
    ) -> Result<LiquidityOutcome, VaultError> {
        let pool = self.pool(&request.pool)?;
        let (pool_tokens, amounts) = match &request.kind {
            RemoveLiquidityKind::SingleTokenExactIn {
                exact_pool_tokens_in,
                token,
                min_amount_out,
            } => {
                let index = pool.token_index(token)?;
                self.check_trade_amount(exact_pool_tokens_in)?;
                let amount_out =
                    pool.compute_remove_single_token_exact_in(index, exact_pool_tokens_in)?;
                self.check_trade_amount(&amount_out)?;
                if let Some(limit) = min_amount_out {
                    if &amount_out < limit {
                        return Err(VaultError::AmountOutBelowMin {
                            token: token.clone(),
                            amount: amount_out,
                            limit: limit.clone(),
                        });
                    }
                }
                let mut amounts = vec![BigUint::zero(); pool.tokens.len()];
                amounts[index] = amount_out;
                (exact_pool_tokens_in.clone(), amounts)
            }
            RemoveLiquidityKind::SingleTokenExactOut {
                token,
                exact_amount_out,
                max_pool_tokens_in,
            } => {
                let index = pool.token_index(token)?;
                self.check_trade_amount(exact_amount_out)?;
                let burned = pool.compute_remove_single_token_exact_out(index, exact_amount_out)?;
                self.check_trade_amount(&burned)?;
                if let Some(limit) = max_pool_tokens_in {
                    if &burned > limit {
                        return Err(VaultError::AmountInAboveMax {
                            token: request.pool.clone(),
                            amount: burned,
                            limit: limit.clone(),
                        });
                    }
                }
                let mut amounts = vec![BigUint::zero(); pool.tokens.len()];
                amounts[index] = exact_amount_out.clone();
                (burned, amounts)
            }
            RemoveLiquidityKind::Proportional { exact_pool_tokens_in, min_amounts_out } => {
                self.check_trade_amount(exact_pool_tokens_in)?;
                let amounts = pool.compute_remove_proportional(exact_pool_tokens_in)?;
                if let Some(limits) = min_amounts_out {
                    if limits.len() != amounts.len() {
                        return Err(VaultError::InvalidConfiguration(format!(
                            "pool {} expects {} minimum amounts, got {}",
                            request.pool,
                            amounts.len(),
                            limits.len()
                        )));
                    }
                    for ((token, amount), limit) in pool.tokens.iter().zip(&amounts).zip(limits) {
                        if amount < limit {
                            return Err(VaultError::AmountOutBelowMin {
                                token: token.clone(),
                                amount: amount.clone(),
                                limit: limit.clone(),
                            });
                        }
                    }
                }
                for amount in &amounts {
                    self.check_liquidity_amount(amount)?;
                }
                (exact_pool_tokens_in.clone(), amounts)
            }
        };

        let tokens = pool.tokens.clone();
        self.transient
            .take_working(&request.pool, &pool_tokens)?;
        let pool = self.pool_mut(&request.pool)?;
        for (balance, amount) in pool.balances.iter_mut().zip(&amounts) {
            *balance -= amount;
        }
        pool.total_supply -= &pool_tokens;
        for (token, amount) in tokens.iter().zip(&amounts) {
            if !amount.is_zero() {
                self.transient.credit(token, amount);
            }
        }
        trace!(pool = %request.pool, burned = %pool_tokens, "Liquidity removed");

        Ok(LiquidityOutcome::new(pool_tokens, amounts))
    }

    fn query_remove_liquidity_single_token_exact_out(
        &self,
        pool: &Address,
        token: &Address,
        exact_amount_out: &BigUint,
    ) -> Result<BigUint, VaultError> {
        let pool = self.pool(pool)?;
        let index = pool.token_index(token)?;
        self.check_trade_amount(exact_amount_out)?;
        pool.compute_remove_single_token_exact_out(index, exact_amount_out)
    }
}

impl BufferOperations for InMemoryVault {
    fn underlying_of(&self, wrapped: &Address) -> Option<Address> {
        self.wrapped_tokens
            .get(wrapped)
            .map(|token| token.underlying.clone())
    }

    fn buffer(&self, wrapped: &Address) -> Result<BufferState, VaultError> {
        self.buffers
            .get(wrapped)
            .cloned()
            .ok_or_else(|| VaultError::BufferNotInitialized(wrapped.clone()))
    }

    fn preview_conversion(
        &self,
        wrapped: &Address,
        direction: WrappingDirection,
        kind: SwapKind,
        amount: &BigUint,
    ) -> Result<BigUint, VaultError> {
        self.check_wrap_amount(amount)?;
        let counter = self
            .wrapped_token(wrapped)?
            .preview(direction, kind, amount)?;
        self.check_wrap_amount(&counter)?;
        Ok(counter)
    }

    fn trade_with_buffer(
        &mut self,
        wrapped: &Address,
        direction: WrappingDirection,
        amount_in: &BigUint,
        amount_out: &BigUint,
    ) -> Result<ConversionOutcome, VaultError> {
        let underlying = self.wrapped_token(wrapped)?.underlying.clone();
        let state = self.buffer(wrapped)?;
        let available = state.outgoing_reserve(direction);
        if available < amount_out {
            let token = match direction {
                WrappingDirection::Wrap => wrapped.clone(),
                WrappingDirection::Unwrap => underlying,
            };
            return Err(VaultError::InsufficientLiquidity {
                token,
                available: available.clone(),
                required: amount_out.clone(),
            });
        }

        let state = self
            .buffers
            .get_mut(wrapped)
            .ok_or_else(|| VaultError::BufferNotInitialized(wrapped.clone()))?;
        let (token_in, token_out) = match direction {
            WrappingDirection::Wrap => {
                state.underlying_balance += amount_in;
                state.wrapped_balance -= amount_out;
                (underlying, wrapped.clone())
            }
            WrappingDirection::Unwrap => {
                state.wrapped_balance += amount_in;
                state.underlying_balance -= amount_out;
                (wrapped.clone(), underlying)
            }
        };
        self.transient.debit(&token_in, amount_in);
        self.transient
            .credit(&token_out, amount_out);

        Ok(ConversionOutcome {
            amount_in: amount_in.clone(),
            amount_out: amount_out.clone(),
            used_buffer: true,
        })
    }

    fn convert_directly(
        &mut self,
        wrapped: &Address,
        direction: WrappingDirection,
        amount_in: &BigUint,
        amount_out: &BigUint,
    ) -> Result<ConversionOutcome, VaultError> {
        self.check_wrap_amount(amount_in)?;
        let token = self
            .wrapped_tokens
            .get_mut(wrapped)
            .ok_or_else(|| VaultError::WrappedTokenNotRegistered(wrapped.clone()))?;
        let underlying = token.underlying.clone();
        let (token_in, token_out) = match direction {
            WrappingDirection::Wrap => {
                token.deposit(amount_in, amount_out);
                (underlying, wrapped.clone())
            }
            WrappingDirection::Unwrap => {
                token.redeem(amount_in, amount_out)?;
                (wrapped.clone(), underlying)
            }
        };
        self.transient.debit(&token_in, amount_in);
        self.transient
            .credit(&token_out, amount_out);

        Ok(ConversionOutcome {
            amount_in: amount_in.clone(),
            amount_out: amount_out.clone(),
            used_buffer: false,
        })
    }
}

impl Settlement for InMemoryVault {
    fn now(&self) -> u64 {
        self.timestamp
    }

    fn wrapped_native(&self) -> Option<Address> {
        self.wrapped_native.clone()
    }

    fn balance_of(&self, account: &Address, token: &Address) -> BigUint {
        self.balances
            .get(account)
            .and_then(|holdings| holdings.get(token))
            .cloned()
            .unwrap_or_default()
    }

    fn transient_delta(&self, token: &Address) -> BigInt {
        self.transient.delta(token)
    }

    fn lendable(&self, token: &Address) -> BigUint {
        self.pools
            .get(token)
            .map(|pool| pool.total_supply.clone())
            .unwrap_or_default()
    }

    fn lend(
        &mut self,
        token: &Address,
        amount: &BigUint,
        source: &LendSource,
    ) -> Result<(), VaultError> {
        match source {
            LendSource::Caller(account) => self.sub_balance(account, token, amount)?,
            LendSource::Ledger => {
                let available = self.lendable(token);
                if amount > &available {
                    return Err(VaultError::InsufficientLiquidity {
                        token: token.clone(),
                        available,
                        required: amount.clone(),
                    });
                }
                self.transient.debit(token, amount);
            }
        }
        self.transient
            .add_working(token, amount);
        trace!(%token, %amount, ?source, "Lent pool tokens");
        Ok(())
    }

    fn repay(
        &mut self,
        token: &Address,
        amount: &BigUint,
        source: &LendSource,
    ) -> Result<(), VaultError> {
        self.transient
            .take_working(token, amount)?;
        match source {
            LendSource::Caller(account) => self.mint(account, token, amount),
            LendSource::Ledger => self.transient.credit(token, amount),
        }
        trace!(%token, %amount, ?source, "Repaid pool tokens");
        Ok(())
    }

    fn charge_then_credit(
        &mut self,
        account: &Address,
        deltas: &[(Address, BigInt)],
        native_asset_mode: bool,
    ) -> Result<(), VaultError> {
        let mut staged = self.clone();
        for (token, delta) in deltas
            .iter()
            .filter(|(_, delta)| delta.is_negative())
        {
            let holding = staged.settlement_token(token, native_asset_mode);
            staged.sub_balance(account, &holding, delta.magnitude())?;
            staged
                .transient
                .credit(token, delta.magnitude());
        }
        for (token, delta) in deltas
            .iter()
            .filter(|(_, delta)| delta.is_positive())
        {
            let holding = staged.settlement_token(token, native_asset_mode);
            staged
                .transient
                .debit(token, delta.magnitude());
            staged.mint(account, &holding, delta.magnitude());
        }
        if let Some((token, residual)) = staged.transient.first_unsettled() {
            return Err(VaultError::BalanceNotSettled {
                token,
                promised: BigInt::zero(),
                settled: residual,
            });
        }
        staged.transient.clear();
        *self = staged;
        debug!(%account, tokens = deltas.len(), native_asset_mode, "Settled");
        Ok(())
    }
}
