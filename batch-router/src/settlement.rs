//! Net per token settlement of a batch.

use std::collections::HashMap;

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use router_common::{models::Address, traits::Settlement};
use tracing::debug;

use crate::{errors::RouterError, models::TokenDelta};

/// Accumulates what every resolved path owes the caller and what the caller owes it.
///
/// Amounts flow through two ledgers. External deltas are settled by a single
/// `charge_then_credit` at the end of the batch. Direct deltas record pool tokens that already
/// left the caller's holdings when a removal lent them, so they are reported but never
/// transferred again.
#[derive(Debug, Clone, Default)]
pub struct SettlementAggregator {
    order: Vec<Address>,
    external: HashMap<Address, BigInt>,
    direct: HashMap<Address, BigInt>,
}

impl SettlementAggregator {
    fn touch(&mut self, token: &Address) {
        if !self.order.contains(token) {
            self.order.push(token.clone());
        }
    }

    /// The caller owes `amount` of `token`.
    pub fn charge(&mut self, token: &Address, amount: &BigUint) {
        self.touch(token);
        *self
            .external
            .entry(token.clone())
            .or_default() -= BigInt::from(amount.clone());
    }

    /// The caller is owed `amount` of `token`.
    pub fn credit(&mut self, token: &Address, amount: &BigUint) {
        self.touch(token);
        *self
            .external
            .entry(token.clone())
            .or_default() += BigInt::from(amount.clone());
    }

    /// `amount` of `token` was already taken from the caller's holdings.
    pub fn record_direct(&mut self, token: &Address, amount: &BigUint) {
        self.touch(token);
        *self
            .direct
            .entry(token.clone())
            .or_default() -= BigInt::from(amount.clone());
    }

    /// Non-zero external deltas in first touch order: what settlement will transfer.
    pub fn transfers(&self) -> Vec<(Address, BigInt)> {
        self.order
            .iter()
            .filter_map(|token| {
                self.external
                    .get(token)
                    .filter(|delta| !delta.is_zero())
                    .map(|delta| (token.clone(), delta.clone()))
            })
            .collect()
    }

    /// Full per token balance change of the caller, zero totals omitted.
    pub fn net_deltas(&self) -> Vec<TokenDelta> {
        self.order
            .iter()
            .map(|token| {
                let external = self
                    .external
                    .get(token)
                    .cloned()
                    .unwrap_or_default();
                let direct = self
                    .direct
                    .get(token)
                    .cloned()
                    .unwrap_or_default();
                TokenDelta { token: token.clone(), delta: external + direct }
            })
            .filter(|delta| !delta.delta.is_zero())
            .collect()
    }

    /// Settles the batch with one `charge_then_credit`, returning the caller's net deltas.
    pub fn settle<V: Settlement>(
        self,
        vault: &mut V,
        account: &Address,
        native_asset_mode: bool,
    ) -> Result<Vec<TokenDelta>, RouterError> {
        let transfers = self.transfers();
        vault.charge_then_credit(account, &transfers, native_asset_mode)?;
        debug!(%account, transfers = transfers.len(), "Batch settled");
        Ok(self.net_deltas())
    }
}
