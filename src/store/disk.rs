use super::LedgerStore;
use crate::ledger::Ledger;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const LEDGER_KEY: &str = "ledger";

/// Ledger blob persisted in a fjall keyspace partition.
pub struct DiskLedgerStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskLedgerStore {
    pub fn open(path: &Path) -> Result<Self> {
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open data store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(LEDGER_KEY, PartitionCreateOptions::default())
            .context("Failed to open ledger partition")?;
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl LedgerStore for DiskLedgerStore {
    fn load(&self) -> Result<Ledger> {
        match self.partition.get(LEDGER_KEY)? {
            Some(blob) => {
                let ledger = serde_json::from_slice(&blob).context("Stored ledger is corrupt")?;
                debug!("Loaded stored ledger");
                Ok(ledger)
            }
            None => {
                debug!("No stored ledger, seeding");
                let ledger = Ledger::seed();
                self.save(&ledger)?;
                Ok(ledger)
            }
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let blob = serde_json::to_vec(ledger).context("Failed to serialize ledger")?;
        self.partition
            .insert(LEDGER_KEY, blob)
            .context("Failed to write ledger")?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist ledger")?;
        Ok(())
    }
}
