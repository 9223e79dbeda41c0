use router_common::traits::Vault;
use tracing::trace;

/// A disposable copy of the ledger a batch runs against.
///
/// Queries discard the copy; committing calls swap it in only once the batch settled, so a
/// failure anywhere leaves the original ledger exactly as it was.
#[derive(Debug)]
pub struct ShadowState<V: Vault> {
    fork: V,
}

impl<V: Vault> ShadowState<V> {
    pub fn fork(base: &V) -> Self {
        Self { fork: base.clone() }
    }

    pub fn state(&self) -> &V {
        &self.fork
    }

    pub fn state_mut(&mut self) -> &mut V {
        &mut self.fork
    }

    /// Replaces `base` with the forked state.
    pub fn commit(self, base: &mut V) {
        trace!("Committing shadow state");
        *base = self.fork;
    }

    pub fn discard(self) {
        trace!("Discarding shadow state");
    }
}
