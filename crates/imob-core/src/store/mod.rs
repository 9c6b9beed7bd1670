//! The demo store: one owned entity snapshot plus scenario flags, a logical
//! clock, and the mutation API that keeps cross-entity invariants intact.

mod mutations;
#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use contracts::{
    DashboardAggregates, DemoConfig, EntityKind, EntitySet, IdCounters, LogEntry,
    PersistedDocument, ScenarioFlags, ScenarioKind, StoreError, SCHEMA_VERSION_V1,
};

use crate::{aggregate, gen, scenario};

pub use mutations::{LeaseInput, MailInput, NoticeInput, PropertyInput, TicketInput};

#[derive(Debug, Clone)]
pub struct DemoStore {
    config: DemoConfig,
    entities: EntitySet,
    scenarios: ScenarioFlags,
    lease_events: BTreeMap<String, Vec<LogEntry>>,
    current_tenant_id: Option<String>,
    current_owner_id: Option<String>,
    /// Logical clock. Every mutation advances it once; synthetic timestamps
    /// derive from the reference date plus the tick count.
    clock_tick: u64,
    id_counters: IdCounters,
}

impl DemoStore {
    /// Generates the seeded dataset and wraps it in a fresh store.
    pub fn new(config: DemoConfig) -> Result<Self, StoreError> {
        let entities = gen::generate(&config)?;
        let id_counters = counters_for(&entities);
        log::info!(
            "seeded demo dataset: {} properties, {} leases, {} invoices (seed {})",
            entities.properties.len(),
            entities.leases.len(),
            entities.invoices.len(),
            config.seed
        );
        Ok(Self {
            config,
            entities,
            scenarios: ScenarioFlags::default(),
            lease_events: BTreeMap::new(),
            current_tenant_id: None,
            current_owner_id: None,
            clock_tick: 0,
            id_counters,
        })
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn entities(&self) -> &EntitySet {
        &self.entities
    }

    pub fn scenarios(&self) -> ScenarioFlags {
        self.scenarios
    }

    pub fn current_tenant_id(&self) -> Option<&str> {
        self.current_tenant_id.as_deref()
    }

    pub fn current_owner_id(&self) -> Option<&str> {
        self.current_owner_id.as_deref()
    }

    /// Current synthetic instant: the reference date advanced by one second
    /// per applied mutation.
    pub fn now(&self) -> DateTime<Utc> {
        self.config.reference_date + Duration::seconds(self.clock_tick as i64)
    }

    pub(crate) fn tick(&mut self) -> DateTime<Utc> {
        self.clock_tick += 1;
        self.now()
    }

    /// Dashboard aggregates with the enabled scenario skews applied. Always
    /// recomputed from the entity snapshot, never patched incrementally.
    pub fn aggregates(&self) -> DashboardAggregates {
        scenario::apply(self.scenarios, self.base_aggregates())
    }

    /// Aggregates without scenario modulation.
    pub fn base_aggregates(&self) -> DashboardAggregates {
        aggregate::compute(&self.entities, self.now())
    }

    /// Flips one scenario flag and returns the resulting flag set.
    pub fn toggle_scenario(&mut self, kind: ScenarioKind) -> ScenarioFlags {
        self.scenarios.toggle(kind);
        log::debug!(
            "scenario {} now {}",
            kind.as_str(),
            self.scenarios.is_enabled(kind)
        );
        self.scenarios
    }

    /// Regenerates the dataset from the stored seed and drops all runtime
    /// state: flags, logs, selections, clock.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.entities = gen::generate(&self.config)?;
        self.id_counters = counters_for(&self.entities);
        self.scenarios = ScenarioFlags::default();
        self.lease_events.clear();
        self.current_tenant_id = None;
        self.current_owner_id = None;
        self.clock_tick = 0;
        log::info!("store reset from seed {}", self.config.seed);
        Ok(())
    }

    pub fn lease_events(&self, lease_id: &str) -> &[LogEntry] {
        self.lease_events
            .get(lease_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set_current_tenant(&mut self, tenant_id: Option<String>) -> Result<(), StoreError> {
        if let Some(id) = &tenant_id {
            if self.entities.tenant(id).is_none() {
                return Err(StoreError::not_found(EntityKind::Tenant, id.clone()));
            }
        }
        self.current_tenant_id = tenant_id;
        Ok(())
    }

    pub fn set_current_owner(&mut self, owner_id: Option<String>) -> Result<(), StoreError> {
        if let Some(id) = &owner_id {
            if self.entities.owner(id).is_none() {
                return Err(StoreError::not_found(EntityKind::Owner, id.clone()));
            }
        }
        self.current_owner_id = owner_id;
        Ok(())
    }

    /// Snapshot of the full state, suitable for persistence.
    pub fn to_document(&self) -> PersistedDocument {
        PersistedDocument {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            config: self.config.clone(),
            entities: self.entities.clone(),
            scenarios: self.scenarios,
            lease_events: self.lease_events.clone(),
            current_tenant_id: self.current_tenant_id.clone(),
            current_owner_id: self.current_owner_id.clone(),
            clock_tick: self.clock_tick,
            id_counters: self.id_counters,
        }
    }

    /// Restores a store from a persisted document.
    pub fn from_document(document: PersistedDocument) -> Result<Self, StoreError> {
        if document.schema_version != SCHEMA_VERSION_V1 {
            return Err(StoreError::Validation(format!(
                "unsupported document schema version: {}",
                document.schema_version
            )));
        }
        document.config.validate()?;
        Ok(Self {
            config: document.config,
            entities: document.entities,
            scenarios: document.scenarios,
            lease_events: document.lease_events,
            current_tenant_id: document.current_tenant_id,
            current_owner_id: document.current_owner_id,
            clock_tick: document.clock_tick,
            id_counters: document.id_counters,
        })
    }

    pub(crate) fn push_lease_event(&mut self, lease_id: &str, at: DateTime<Utc>, text: String) {
        self.lease_events
            .entry(lease_id.to_string())
            .or_default()
            .push(LogEntry { at, text });
    }
}

fn counters_for(entities: &EntitySet) -> IdCounters {
    IdCounters {
        properties: entities.properties.len() as u64,
        leases: entities.leases.len() as u64,
        invoices: entities.invoices.len() as u64,
        transfers: entities.transfers.len() as u64,
        tickets: entities.tickets.len() as u64,
        mail: entities.mail.len() as u64,
        notices: entities.notices.len() as u64,
    }
}
