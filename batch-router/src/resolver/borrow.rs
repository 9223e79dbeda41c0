//! Borrow and reconcile for liquidity removals resolved out of settlement order.
//!
//! Under exact out a removal that is not the first step processed has to burn pool tokens
//! before the router has produced (or charged) them. The ticket lends an upper bound of pool
//! tokens into the working balance, lets the removal burn what it needs, then refunds the rest.

use num_bigint::BigUint;
use router_common::{
    models::{operation::LendSource, Address},
    traits::Settlement,
};
use tracing::trace;

use crate::errors::RouterError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowState {
    NotStarted,
    Borrowed { borrowed: BigUint },
    Settled { borrowed: BigUint, consumed: BigUint },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowTicket {
    token: Address,
    source: LendSource,
    state: BorrowState,
}

impl BorrowTicket {
    pub fn new(token: Address, source: LendSource) -> Self {
        Self { token, source, state: BorrowState::NotStarted }
    }

    pub fn state(&self) -> &BorrowState {
        &self.state
    }

    fn unreconciled(&self) -> RouterError {
        let (borrowed, consumed) = match &self.state {
            BorrowState::NotStarted => (BigUint::default(), BigUint::default()),
            BorrowState::Borrowed { borrowed } => (borrowed.clone(), BigUint::default()),
            BorrowState::Settled { borrowed, consumed } => (borrowed.clone(), consumed.clone()),
        };
        RouterError::UnreconciledBorrow { token: self.token.clone(), borrowed, consumed }
    }

    /// Lends `bound` pool tokens into the working balance. Returns the amount borrowed.
    pub fn borrow<V: Settlement>(
        &mut self,
        vault: &mut V,
        bound: BigUint,
    ) -> Result<BigUint, RouterError> {
        if self.state != BorrowState::NotStarted {
            return Err(self.unreconciled());
        }
        vault.lend(&self.token, &bound, &self.source)?;
        trace!(token = %self.token, borrowed = %bound, source = ?self.source, "Borrowed");
        self.state = BorrowState::Borrowed { borrowed: bound.clone() };
        Ok(bound)
    }

    /// Commits `consumed` as the true cost and refunds `borrowed - consumed` to the lender.
    /// Returns the refund.
    pub fn reconcile<V: Settlement>(
        &mut self,
        vault: &mut V,
        consumed: &BigUint,
    ) -> Result<BigUint, RouterError> {
        let borrowed = match &self.state {
            BorrowState::Borrowed { borrowed } if consumed <= borrowed => borrowed.clone(),
            BorrowState::Borrowed { borrowed } => {
                return Err(RouterError::UnreconciledBorrow {
                    token: self.token.clone(),
                    borrowed: borrowed.clone(),
                    consumed: consumed.clone(),
                })
            }
            _ => return Err(self.unreconciled()),
        };
        let refund = &borrowed - consumed;
        if refund > BigUint::default() {
            vault.repay(&self.token, &refund, &self.source)?;
        }
        trace!(token = %self.token, %borrowed, %consumed, %refund, "Reconciled borrow");
        self.state = BorrowState::Settled { borrowed, consumed: consumed.clone() };
        Ok(refund)
    }

    /// Fails unless the ticket was reconciled. Returns the consumed amount.
    pub fn ensure_settled(&self) -> Result<&BigUint, RouterError> {
        match &self.state {
            BorrowState::Settled { consumed, .. } => Ok(consumed),
            _ => Err(self.unreconciled()),
        }
    }
}
