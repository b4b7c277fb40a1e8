pub mod disk;
pub mod memory;

use crate::ledger::Ledger;
use anyhow::Result;

/// Persistence for the ledger blob. The whole ledger is loaded at startup
/// and rewritten after every mutation; there is no finer-grained scheme.
pub trait LedgerStore: Send + Sync {
    /// Loads the stored ledger, or the built-in seed dataset when nothing
    /// has been stored yet.
    fn load(&self) -> Result<Ledger>;

    fn save(&self, ledger: &Ledger) -> Result<()>;
}
