use super::LedgerStore;
use crate::ledger::Ledger;
use anyhow::Result;
use std::sync::RwLock;

/// In-memory store used by tests and ephemeral runs. Starts from the seed
/// dataset like a first launch.
pub struct MemoryLedgerStore {
    inner: RwLock<Ledger>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Ledger::seed()),
        }
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<Ledger> {
        Ok(self.inner.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = ledger.clone();
        Ok(())
    }
}
