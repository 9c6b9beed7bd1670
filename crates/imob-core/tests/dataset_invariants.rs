//! Cross-entity invariants of the generated dataset, checked over several
//! seeds.

use std::collections::BTreeSet;

use chrono::Datelike;
use contracts::{DemoConfig, InvoiceStatus, LeaseStatus, OccupancyStatus, TransferStatus};
use imob_core::gen;

const SEEDS: [u64; 4] = [1, 42, 1337, 987_654_321];

fn config_with_seed(seed: u64) -> DemoConfig {
    let mut config = DemoConfig::default();
    config.seed = seed;
    config
}

#[test]
fn references_resolve_for_every_seed() {
    for seed in SEEDS {
        let entities = gen::generate(&config_with_seed(seed)).expect("dataset generates");
        for property in &entities.properties {
            assert!(entities.owner(&property.owner_id).is_some(), "seed {seed}");
        }
        for lease in &entities.leases {
            assert!(entities.property(&lease.property_id).is_some(), "seed {seed}");
            assert!(entities.tenant(&lease.tenant_id).is_some(), "seed {seed}");
            assert!(entities.owner(&lease.owner_id).is_some(), "seed {seed}");
            assert!(lease.end > lease.start, "seed {seed}");
        }
        for invoice in &entities.invoices {
            assert!(entities.lease(&invoice.lease_id).is_some(), "seed {seed}");
        }
        for record in &entities.mail {
            assert!(entities.property(&record.property_id).is_some(), "seed {seed}");
        }
    }
}

#[test]
fn occupancy_mirrors_lease_state() {
    for seed in SEEDS {
        let entities = gen::generate(&config_with_seed(seed)).expect("dataset generates");
        let mut active_per_property: BTreeSet<&str> = BTreeSet::new();
        for lease in entities.leases.iter().filter(|l| l.status == LeaseStatus::Active) {
            assert!(
                active_per_property.insert(lease.property_id.as_str()),
                "property {} carries two active leases (seed {seed})",
                lease.property_id
            );
        }
        for property in &entities.properties {
            match &property.active_lease_id {
                Some(lease_id) => {
                    assert_eq!(property.occupancy, OccupancyStatus::Occupied, "seed {seed}");
                    let lease = entities.lease(lease_id).expect("lease reference resolves");
                    assert_eq!(lease.status, LeaseStatus::Active, "seed {seed}");
                    assert_eq!(lease.property_id, property.id, "seed {seed}");
                }
                None => {
                    assert_ne!(property.occupancy, OccupancyStatus::Occupied, "seed {seed}");
                }
            }
        }
    }
}

#[test]
fn each_lease_bills_exactly_twelve_distinct_periods() {
    for seed in SEEDS {
        let entities = gen::generate(&config_with_seed(seed)).expect("dataset generates");
        for lease in &entities.leases {
            let periods: BTreeSet<&str> = entities
                .invoices
                .iter()
                .filter(|invoice| invoice.lease_id == lease.id)
                .map(|invoice| invoice.period.as_str())
                .collect();
            assert_eq!(periods.len(), 12, "lease {} seed {seed}", lease.id);
        }
        for invoice in &entities.invoices {
            assert_eq!(invoice.due_date.day0(), 9, "seed {seed}");
            assert!(invoice.amount > 0, "seed {seed}");
            if invoice.status == InvoiceStatus::Overdue {
                assert!(invoice.interest > 0 && invoice.penalty > 0, "seed {seed}");
            } else {
                assert_eq!((invoice.interest, invoice.penalty), (0, 0), "seed {seed}");
            }
        }
    }
}

#[test]
fn transfer_math_is_consistent() {
    for seed in SEEDS {
        let entities = gen::generate(&config_with_seed(seed)).expect("dataset generates");
        for transfer in &entities.transfers {
            assert_eq!(
                transfer.net_amount,
                (transfer.gross_amount - transfer.fee).max(0),
                "seed {seed}"
            );
            assert_eq!(
                transfer.fee,
                ((transfer.gross_amount * 3) as f64 / 100.0).round() as i64,
                "seed {seed}"
            );
            match transfer.status {
                TransferStatus::Settled => assert!(transfer.net_amount > 0, "seed {seed}"),
                TransferStatus::Pending => assert_eq!(transfer.net_amount, 0, "seed {seed}"),
            }
            let expected_gross: i64 = entities
                .invoices
                .iter()
                .filter(|invoice| {
                    invoice.period == transfer.period
                        && invoice.status == InvoiceStatus::Paid
                        && entities
                            .lease(&invoice.lease_id)
                            .map(|lease| lease.owner_id == transfer.owner_id)
                            .unwrap_or(false)
                })
                .map(|invoice| invoice.amount)
                .sum();
            assert_eq!(transfer.gross_amount, expected_gross, "seed {seed}");
        }
    }
}

#[test]
fn ids_are_unique_within_each_family() {
    let entities = gen::generate(&DemoConfig::default()).expect("dataset generates");
    fn assert_unique<'a>(ids: impl Iterator<Item = &'a str>, family: &str) {
        let mut seen = BTreeSet::new();
        for id in ids {
            assert!(seen.insert(id), "duplicate {family} id {id}");
        }
    }
    assert_unique(entities.properties.iter().map(|e| e.id.as_str()), "property");
    assert_unique(entities.leases.iter().map(|e| e.id.as_str()), "lease");
    assert_unique(entities.invoices.iter().map(|e| e.id.as_str()), "invoice");
    assert_unique(entities.transfers.iter().map(|e| e.id.as_str()), "transfer");
    assert_unique(entities.tickets.iter().map(|e| e.id.as_str()), "ticket");
    assert_unique(entities.mail.iter().map(|e| e.id.as_str()), "mail");
    assert_unique(entities.notices.iter().map(|e| e.id.as_str()), "notice");
}
