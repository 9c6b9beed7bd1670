//! In-process console facade: demo store plus SQLite document persistence and
//! the mock collaborator server.

mod persistence;
mod server;

use std::path::Path;

use contracts::{
    DashboardAggregates, DemoConfig, EnvelopeStatus, LeaseStatus, ScenarioFlags, ScenarioKind,
    StoreError, STORAGE_NAME,
};
use imob_core::DemoStore;
use persistence::SqliteDocumentStore;
pub use persistence::PersistenceError;
pub use server::{serve, ServerError};

/// Facade over the demo store. Every mutation flushes the full document to
/// the attached SQLite store; flush failures are surfaced, not propagated,
/// so a broken disk never blocks the demo.
#[derive(Debug)]
pub struct ConsoleApi {
    store: DemoStore,
    persistence: Option<SqliteDocumentStore>,
    last_persistence_error: Option<String>,
}

impl ConsoleApi {
    pub fn from_config(config: DemoConfig) -> Result<Self, StoreError> {
        Ok(Self {
            store: DemoStore::new(config)?,
            persistence: None,
            last_persistence_error: None,
        })
    }

    /// Attaches the SQLite store and loads the persisted document when one
    /// exists under the console storage name; otherwise the freshly seeded
    /// dataset is written out as the initial document.
    pub fn attach_sqlite_store(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let store = SqliteDocumentStore::open(path)?;
        match store.load_document(STORAGE_NAME)? {
            Some(document) => match DemoStore::from_document(document) {
                Ok(restored) => {
                    log::info!("restored persisted demo document '{STORAGE_NAME}'");
                    self.store = restored;
                }
                Err(err) => {
                    log::warn!("persisted document rejected, reseeding: {err}");
                }
            },
            None => log::info!("no persisted document, starting from seed"),
        }
        self.persistence = Some(store);
        self.flush_persistence_if_enabled();
        Ok(())
    }

    pub fn store(&self) -> &DemoStore {
        &self.store
    }

    pub fn dashboard(&self) -> DashboardAggregates {
        self.store.aggregates()
    }

    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_persistence_error.as_deref()
    }

    /// Runs one store mutation and flushes the document afterwards. Mutation
    /// errors leave both the snapshot and the persisted document untouched.
    pub fn mutate<T>(
        &mut self,
        operation: impl FnOnce(&mut DemoStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let outcome = operation(&mut self.store)?;
        self.flush_persistence_if_enabled();
        Ok(outcome)
    }

    pub fn toggle_scenario(&mut self, kind: ScenarioKind) -> ScenarioFlags {
        let flags = self.store.toggle_scenario(kind);
        self.flush_persistence_if_enabled();
        flags
    }

    pub fn generate_invoices(&mut self, period: &str) -> Result<usize, StoreError> {
        let period = period.to_string();
        self.mutate(|store| store.generate_invoices(&period))
    }

    pub fn register_payment(
        &mut self,
        invoice_id: &str,
        amount: i64,
        receipt: Option<String>,
    ) -> Result<(), StoreError> {
        let invoice_id = invoice_id.to_string();
        self.mutate(|store| store.register_payment(&invoice_id, amount, receipt))
    }

    pub fn record_signature_status(
        &mut self,
        lease_id: &str,
        envelope_id: &str,
        status: EnvelopeStatus,
    ) -> Result<(), StoreError> {
        let lease_id = lease_id.to_string();
        let envelope_id = envelope_id.to_string();
        self.mutate(|store| {
            store.record_signature_status(&lease_id, &envelope_id, status)?;
            if status == EnvelopeStatus::Signed {
                // A signed envelope activates a lease still pending signature.
                let pending = store
                    .entities()
                    .lease(&lease_id)
                    .map(|lease| lease.status == LeaseStatus::PendingSignature)
                    .unwrap_or(false);
                if pending {
                    store.set_lease_status(&lease_id, LeaseStatus::Active)?;
                }
            }
            Ok(())
        })
    }

    /// Discards the current state (including anything restored from disk)
    /// and reseeds from the given configuration.
    pub fn reseed(&mut self, config: DemoConfig) -> Result<(), StoreError> {
        self.store = DemoStore::new(config)?;
        self.flush_persistence_if_enabled();
        Ok(())
    }

    /// Regenerates the dataset from the seed and drops the persisted
    /// document so the next save starts clean.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.store.reset()?;
        if let Some(store) = self.persistence.as_mut() {
            if let Err(err) = store.delete_document(STORAGE_NAME) {
                self.last_persistence_error = Some(err.to_string());
            }
        }
        self.flush_persistence_if_enabled();
        Ok(())
    }

    fn flush_persistence_if_enabled(&mut self) {
        let Some(store) = self.persistence.as_mut() else {
            return;
        };
        let document = self.store.to_document();
        match store.save_document(STORAGE_NAME, &document) {
            Ok(()) => self.last_persistence_error = None,
            Err(err) => {
                log::error!("persistence flush failed: {err}");
                self.last_persistence_error = Some(err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::InvoiceStatus;

    fn api() -> ConsoleApi {
        ConsoleApi::from_config(DemoConfig::default()).expect("api seeds")
    }

    #[test]
    fn mutations_persist_across_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("console.sqlite");

        let mut first = api();
        first.attach_sqlite_store(&db_path).expect("store attaches");
        let created = first.generate_invoices("2025-02").expect("invoices created");
        assert!(created > 0);
        let invoice_count = first.store().entities().invoices.len();

        let mut second = api();
        second.attach_sqlite_store(&db_path).expect("store reattaches");
        assert_eq!(second.store().entities().invoices.len(), invoice_count);
        assert_eq!(second.generate_invoices("2025-02").expect("idempotent"), 0);
    }

    #[test]
    fn reset_clears_the_persisted_document() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("console.sqlite");

        let mut api = api();
        api.attach_sqlite_store(&db_path).expect("store attaches");
        let pristine = api.store().entities().clone();
        api.generate_invoices("2025-03").expect("invoices created");
        api.reset().expect("reset succeeds");
        assert_eq!(api.store().entities(), &pristine);

        let mut reopened = ConsoleApi::from_config(DemoConfig::default()).expect("api seeds");
        reopened.attach_sqlite_store(&db_path).expect("store reattaches");
        assert_eq!(reopened.store().entities(), &pristine);
    }

    #[test]
    fn failed_mutations_do_not_flush() {
        let mut api = api();
        assert!(api.register_payment("inv_99999", 100, None).is_err());
        assert!(api.last_persistence_error().is_none());
    }

    #[test]
    fn signed_envelope_activates_a_pending_lease() {
        let mut api = api();
        let lease_id = api
            .store()
            .entities()
            .leases
            .iter()
            .find(|lease| {
                lease.status == LeaseStatus::PendingSignature
                    && api
                        .store()
                        .entities()
                        .property(&lease.property_id)
                        .map(|property| property.active_lease_id.is_none())
                        .unwrap_or(false)
            })
            .expect("pending lease exists")
            .id
            .clone();

        api.record_signature_status(&lease_id, "env_001", EnvelopeStatus::Signed)
            .expect("signature records");
        let lease = api.store().entities().lease(&lease_id).unwrap();
        assert_eq!(lease.status, LeaseStatus::Active);
        assert!(!api.store().lease_events(&lease_id).is_empty());
    }

    #[test]
    fn full_payment_marks_the_invoice_paid() {
        let mut api = api();
        let (invoice_id, total) = {
            let invoice = api
                .store()
                .entities()
                .invoices
                .iter()
                .find(|invoice| invoice.status == InvoiceStatus::Open)
                .expect("open invoice exists");
            (invoice.id.clone(), invoice.total_due())
        };
        api.register_payment(&invoice_id, total, Some("rec_777".to_string()))
            .expect("payment registers");
        assert_eq!(
            api.store().entities().invoice(&invoice_id).unwrap().status,
            InvoiceStatus::Paid
        );
    }
}
