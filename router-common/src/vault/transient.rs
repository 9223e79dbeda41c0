use std::collections::HashMap;

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

use crate::{errors::VaultError, models::Address};

/// Balances owed between the ledger and the router while a batch is open.
///
/// `deltas` is signed from the router's point of view: a credit is an amount the ledger owes
/// the router, a debit one the router owes the ledger. `working` holds pool tokens lent to the
/// router ahead of a burn.
#[derive(Debug, Clone, Default)]
pub struct TransientAccounting {
    deltas: HashMap<Address, BigInt>,
    working: HashMap<Address, BigUint>,
}

impl TransientAccounting {
    pub fn credit(&mut self, token: &Address, amount: &BigUint) {
        *self
            .deltas
            .entry(token.clone())
            .or_default() += BigInt::from(amount.clone());
    }

    pub fn debit(&mut self, token: &Address, amount: &BigUint) {
        *self
            .deltas
            .entry(token.clone())
            .or_default() -= BigInt::from(amount.clone());
    }

    pub fn delta(&self, token: &Address) -> BigInt {
        self.deltas
            .get(token)
            .cloned()
            .unwrap_or_default()
    }

    pub fn working(&self, token: &Address) -> BigUint {
        self.working
            .get(token)
            .cloned()
            .unwrap_or_default()
    }

    pub fn add_working(&mut self, token: &Address, amount: &BigUint) {
        *self
            .working
            .entry(token.clone())
            .or_default() += amount;
    }

    pub fn take_working(&mut self, token: &Address, amount: &BigUint) -> Result<(), VaultError> {
        let available = self.working(token);
        if &available < amount {
            return Err(VaultError::InsufficientWorkingBalance {
                token: token.clone(),
                available,
                required: amount.clone(),
            });
        }
        self.working
            .insert(token.clone(), available - amount);
        Ok(())
    }

    /// The lowest addressed token whose delta or working balance is non-zero.
    pub fn first_unsettled(&self) -> Option<(Address, BigInt)> {
        let open_deltas = self
            .deltas
            .iter()
            .filter(|(_, delta)| !delta.is_zero())
            .map(|(token, delta)| (token.clone(), delta.clone()));
        let open_working = self
            .working
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(token, amount)| (token.clone(), BigInt::from(amount.clone())));
        open_deltas
            .chain(open_working)
            .min_by(|a, b| a.0.cmp(&b.0))
    }

    pub fn clear(&mut self) {
        self.deltas.clear();
        self.working.clear();
    }
}
