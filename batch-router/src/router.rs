//! Batch entry points.

use num_bigint::BigUint;
use num_traits::Zero;
use router_common::{models::SwapKind, traits::Vault};
use tracing::{info, instrument, warn};

use crate::{
    errors::RouterError,
    models::{BatchSwapResult, SwapExactInRequest, SwapExactOutRequest, TokenTotals},
    resolver::{exact_in, exact_out},
    settlement::SettlementAggregator,
    shadow::ShadowState,
    step::validation::validate_path,
};

/// Routes batches of paths against a ledger it owns.
///
/// Every committing call runs against a [`ShadowState`] fork and only replaces the ledger once
/// the batch settled. Query calls run the exact same code on a fork that is always discarded.
#[derive(Debug, Clone)]
pub struct BatchRouter<V: Vault> {
    vault: V,
}

impl<V: Vault> BatchRouter<V> {
    pub fn new(vault: V) -> Self {
        Self { vault }
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut V {
        &mut self.vault
    }

    pub fn swap_exact_in(
        &mut self,
        request: &SwapExactInRequest,
    ) -> Result<BatchSwapResult, RouterError> {
        self.commit(|vault| run_exact_in(vault, request))
    }

    pub fn swap_exact_out(
        &mut self,
        request: &SwapExactOutRequest,
    ) -> Result<BatchSwapResult, RouterError> {
        self.commit(|vault| run_exact_out(vault, request))
    }

    pub fn query_swap_exact_in(
        &self,
        request: &SwapExactInRequest,
    ) -> Result<BatchSwapResult, RouterError> {
        self.query(|vault| run_exact_in(vault, request))
    }

    pub fn query_swap_exact_out(
        &self,
        request: &SwapExactOutRequest,
    ) -> Result<BatchSwapResult, RouterError> {
        self.query(|vault| run_exact_out(vault, request))
    }

    pub(crate) fn commit<T, F>(&mut self, run: F) -> Result<T, RouterError>
    where
        F: FnOnce(&mut V) -> Result<T, RouterError>,
    {
        let mut shadow = ShadowState::fork(&self.vault);
        match run(shadow.state_mut()) {
            Ok(result) => {
                shadow.commit(&mut self.vault);
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "Batch aborted");
                shadow.discard();
                Err(err)
            }
        }
    }

    pub(crate) fn query<T, F>(&self, run: F) -> Result<T, RouterError>
    where
        F: FnOnce(&mut V) -> Result<T, RouterError>,
    {
        let mut shadow = ShadowState::fork(&self.vault);
        let result = run(shadow.state_mut());
        shadow.discard();
        result
    }
}

/// Aborts before anything else runs if the ledger's clock is past `deadline`.
pub(crate) fn check_deadline<V: Vault>(vault: &V, deadline: u64) -> Result<(), RouterError> {
    let now = vault.now();
    if now > deadline {
        return Err(RouterError::DeadlineExpired { deadline, now });
    }
    Ok(())
}

#[instrument(
    skip_all,
    fields(kind = %SwapKind::ExactIn, sender = %request.sender, paths = request.paths.len())
)]
fn run_exact_in<V: Vault>(
    vault: &mut V,
    request: &SwapExactInRequest,
) -> Result<BatchSwapResult, RouterError> {
    check_deadline(vault, request.deadline)?;
    if request.paths.is_empty() {
        return Err(RouterError::InvalidConfiguration("batch has no paths".to_string()));
    }
    for (index, path) in request.paths.iter().enumerate() {
        validate_path(vault, index, &path.token_in, &path.steps, &path.exact_amount_in)?;
    }

    let mut aggregator = SettlementAggregator::default();
    let mut received = TokenTotals::default();
    let mut path_amounts = Vec::with_capacity(request.paths.len());
    for (index, path) in request.paths.iter().enumerate() {
        let resolution = exact_in::resolve(
            vault,
            &request.sender,
            index,
            path,
            &request.user_data,
            &mut aggregator,
        )?;
        received.add(path.token_out(), &resolution.path_amount);
        path_amounts.push(resolution.path_amount);
    }

    let net_deltas = aggregator.settle(vault, &request.sender, request.native_asset_mode)?;
    let (tokens, amounts) = received.into_parts();
    info!(?path_amounts, "Exact in batch resolved");
    Ok(BatchSwapResult { path_amounts, tokens, amounts, net_deltas })
}

#[instrument(
    skip_all,
    fields(kind = %SwapKind::ExactOut, sender = %request.sender, paths = request.paths.len())
)]
fn run_exact_out<V: Vault>(
    vault: &mut V,
    request: &SwapExactOutRequest,
) -> Result<BatchSwapResult, RouterError> {
    check_deadline(vault, request.deadline)?;
    if request.paths.is_empty() {
        return Err(RouterError::InvalidConfiguration("batch has no paths".to_string()));
    }
    for (index, path) in request.paths.iter().enumerate() {
        validate_path(vault, index, &path.token_in, &path.steps, &path.exact_amount_out)?;
    }

    // Paths resolve last to first; amounts are still reported in request order.
    let mut aggregator = SettlementAggregator::default();
    let mut path_amounts = vec![BigUint::zero(); request.paths.len()];
    for (index, path) in request.paths.iter().enumerate().rev() {
        let resolution = exact_out::resolve(
            vault,
            index,
            path,
            &request.user_data,
            &mut aggregator,
        )?;
        path_amounts[index] = resolution.path_amount;
    }
    let mut paid = TokenTotals::default();
    for (path, amount) in request.paths.iter().zip(&path_amounts) {
        paid.add(&path.token_in, amount);
    }

    let net_deltas = aggregator.settle(vault, &request.sender, request.native_asset_mode)?;
    let (tokens, amounts) = paid.into_parts();
    info!(?path_amounts, "Exact out batch resolved");
    Ok(BatchSwapResult { path_amounts, tokens, amounts, net_deltas })
}
