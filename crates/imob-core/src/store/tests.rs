use contracts::{
    DemoConfig, EntityKind, GeoPoint, InvoiceStatus, LeaseStatus, OccupancyStatus, PickupStatus,
    PropertyKind, ScenarioKind, StoreError, TicketStatus, TransferStatus,
};

use super::*;
use crate::store::mutations::{LeaseInput, MailInput, NoticeInput, PropertyInput};

fn store() -> DemoStore {
    DemoStore::new(DemoConfig::default()).expect("store seeds")
}

fn vacant_property_id(store: &DemoStore) -> String {
    store
        .entities()
        .properties
        .iter()
        .find(|property| property.active_lease_id.is_none())
        .expect("dataset has vacant properties")
        .id
        .clone()
}

fn lease_input(store: &DemoStore, status: LeaseStatus) -> LeaseInput {
    LeaseInput {
        property_id: vacant_property_id(store),
        tenant_id: store.entities().tenants[0].id.clone(),
        rent_amount: None,
        condo_fee: None,
        start: None,
        end: None,
        renewal_index: None,
        status: Some(status),
    }
}

fn property_input(store: &DemoStore) -> PropertyInput {
    PropertyInput {
        code: None,
        kind: PropertyKind::Apartment,
        address: "Rua Augusta, 901".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
        geo: GeoPoint {
            lat: -23.55,
            lng: -46.64,
        },
        area_m2: 70,
        rooms: 2,
        bathrooms: 1,
        parking_spots: 1,
        owner_id: store.entities().owners[0].id.clone(),
    }
}

fn notice_input(title: &str, body: &str) -> NoticeInput {
    NoticeInput {
        title: title.to_string(),
        body: body.to_string(),
        groups: vec![contracts::NoticeGroup::General],
        audience: contracts::NoticeAudience::All,
        expiry: None,
        segment_detail: None,
        attachments: Vec::new(),
    }
}

#[test]
fn activating_a_lease_links_its_property() {
    let mut store = store();
    let input = lease_input(&store, LeaseStatus::Draft);
    let property_id = input.property_id.clone();
    let lease_id = store.add_lease(input).expect("lease created");

    store
        .set_lease_status(&lease_id, LeaseStatus::Active)
        .expect("activation succeeds");
    let property = store.entities().property(&property_id).unwrap();
    assert_eq!(property.occupancy, OccupancyStatus::Occupied);
    assert_eq!(property.active_lease_id.as_deref(), Some(lease_id.as_str()));

    store
        .set_lease_status(&lease_id, LeaseStatus::Closed)
        .expect("closing succeeds");
    let property = store.entities().property(&property_id).unwrap();
    assert_eq!(property.occupancy, OccupancyStatus::Vacant);
    assert_eq!(property.active_lease_id, None);
}

#[test]
fn a_property_cannot_carry_two_active_leases() {
    let mut store = store();
    let first = lease_input(&store, LeaseStatus::Active);
    let property_id = first.property_id.clone();
    store.add_lease(first).expect("first lease created");

    let second = LeaseInput {
        property_id: property_id.clone(),
        ..lease_input(&store, LeaseStatus::Active)
    };
    assert!(matches!(
        store.add_lease(second),
        Err(StoreError::InvalidState { .. })
    ));

    let draft = LeaseInput {
        property_id,
        ..lease_input(&store, LeaseStatus::Draft)
    };
    let draft_id = store.add_lease(draft).expect("draft on occupied property is fine");
    assert!(matches!(
        store.set_lease_status(&draft_id, LeaseStatus::Active),
        Err(StoreError::InvalidState { .. })
    ));
}

#[test]
fn invoice_generation_is_idempotent() {
    let mut store = store();
    let period = "2025-02";
    let created = store.generate_invoices(period).expect("first run creates");
    assert_eq!(created, store.entities().leases.len());
    assert_eq!(store.generate_invoices(period).expect("second run"), 0);
    assert!(store.generate_invoices("2025/02").is_err());
}

#[test]
fn every_lease_is_billed_regardless_of_status() {
    let mut store = store();
    let draft_id = store
        .add_lease(lease_input(&store, LeaseStatus::Draft))
        .expect("draft lease created");
    let created = store.generate_invoices("2025-02").expect("invoices created");
    assert_eq!(created, store.entities().leases.len());
    assert!(store
        .entities()
        .invoices
        .iter()
        .any(|invoice| invoice.lease_id == draft_id && invoice.period == "2025-02"));
}

#[test]
fn penalty_then_full_payment_clears_the_invoice() {
    let mut store = store();
    let lease_id = store
        .add_lease(lease_input(&store, LeaseStatus::Active))
        .expect("lease created");
    store.generate_invoices("2025-02").expect("invoices created");
    let invoice_id = store
        .entities()
        .invoices
        .iter()
        .find(|invoice| invoice.lease_id == lease_id && invoice.period == "2025-02")
        .expect("invoice for the new lease")
        .id
        .clone();

    store.apply_penalty(&invoice_id).expect("penalty applies");
    let invoice = store.entities().invoice(&invoice_id).unwrap();
    assert_eq!(invoice.amount, 2300);
    assert_eq!(invoice.interest, 46);
    assert_eq!(invoice.penalty, 23);
    assert_eq!(invoice.status, InvoiceStatus::Overdue);
    assert_eq!(invoice.total_due(), 2369);

    store
        .register_payment(&invoice_id, 2369, Some("rec_001".to_string()))
        .expect("payment registers");
    let invoice = store.entities().invoice(&invoice_id).unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.paid_amount, Some(2369));
    assert!(invoice.paid_at.is_some());

    // Paid is terminal for both operations.
    assert!(matches!(
        store.apply_penalty(&invoice_id),
        Err(StoreError::InvalidState { .. })
    ));
    assert!(matches!(
        store.register_payment(&invoice_id, 1, None),
        Err(StoreError::InvalidState { .. })
    ));
}

#[test]
fn partial_payment_is_recorded_without_clearing() {
    let mut store = store();
    let invoice_id = store
        .entities()
        .invoices
        .iter()
        .find(|invoice| invoice.status == InvoiceStatus::Open)
        .expect("open invoice exists")
        .id
        .clone();
    store
        .register_payment(&invoice_id, 1, None)
        .expect("partial payment registers");
    let invoice = store.entities().invoice(&invoice_id).unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Open);
    assert_eq!(invoice.paid_amount, Some(1));
}

#[test]
fn penalties_compound_without_a_cap() {
    let mut store = store();
    let invoice_id = store
        .entities()
        .invoices
        .iter()
        .find(|invoice| invoice.status == InvoiceStatus::Open)
        .expect("open invoice exists")
        .id
        .clone();
    store.apply_penalty(&invoice_id).expect("first penalty");
    let after_first = store.entities().invoice(&invoice_id).unwrap().clone();
    store.apply_penalty(&invoice_id).expect("second penalty");
    let after_second = store.entities().invoice(&invoice_id).unwrap();
    assert_eq!(after_second.interest, after_first.interest * 2);
    assert_eq!(after_second.penalty, after_first.penalty * 2);
}

#[test]
fn transfer_settlement_is_one_way() {
    let mut store = store();
    let pending_id = store
        .entities()
        .transfers
        .iter()
        .find(|transfer| transfer.status == TransferStatus::Pending)
        .expect("pending transfer exists")
        .id
        .clone();
    store.settle_transfer(&pending_id).expect("settles");
    assert!(matches!(
        store.settle_transfer(&pending_id),
        Err(StoreError::InvalidState { .. })
    ));
}

#[test]
fn mail_pickup_is_terminal_and_reassigns_the_recipient() {
    let mut store = store();
    let property_id = store.entities().properties[0].id.clone();
    let mail_id = store
        .add_mail(MailInput {
            property_id,
            unit_id: Some("apto 42".to_string()),
            recipient: "Ana Almeida".to_string(),
            sender: "Correios".to_string(),
            photo: None,
        })
        .expect("mail registered");

    // Registration also raises a unit notice for the delivery.
    let notice = store
        .entities()
        .notices
        .iter()
        .find(|notice| notice.title.contains("Ana Almeida"))
        .expect("delivery notice exists");
    assert!(notice.body.contains("Correios"));

    store
        .confirm_mail_pickup(&mail_id, "Bruno Dias")
        .expect("pickup confirms");
    let record = store
        .entities()
        .mail
        .iter()
        .find(|entry| entry.id == mail_id)
        .unwrap();
    assert_eq!(record.pickup_status, PickupStatus::PickedUp);
    assert_eq!(record.unit_id.as_deref(), Some("apto 42"));
    assert_eq!(record.recipient, "Bruno Dias");
    assert!(record.picked_up_at.is_some());

    assert!(matches!(
        store.confirm_mail_pickup(&mail_id, "Carla"),
        Err(StoreError::InvalidState { .. })
    ));
}

#[test]
fn notice_read_confirmation_is_idempotent() {
    let mut store = store();
    let notice_id = store
        .add_notice(notice_input("Assembleia", "Pauta anexa."))
        .expect("notice created");
    store
        .confirm_notice_read(&notice_id, "tenant_001")
        .expect("first read");
    store
        .confirm_notice_read(&notice_id, "tenant_001")
        .expect("repeat read is a no-op");
    let notice = store
        .entities()
        .notices
        .iter()
        .find(|entry| entry.id == notice_id)
        .unwrap();
    assert_eq!(notice.read_by, vec!["tenant_001".to_string()]);
}

#[test]
fn property_crud_respects_the_active_lease_link() {
    let mut store = store();
    let property_id = store
        .add_property(property_input(&store))
        .expect("property created");
    let created = store.entities().property(&property_id).unwrap();
    assert_eq!(created.occupancy, OccupancyStatus::Vacant);
    assert!(created.code.starts_with("IM-"));

    let mut update = property_input(&store);
    update.address = "Avenida Paulista, 1000".to_string();
    store
        .update_property(&property_id, update)
        .expect("property updated");
    assert_eq!(
        store.entities().property(&property_id).unwrap().address,
        "Avenida Paulista, 1000"
    );

    let mut orphan = property_input(&store);
    orphan.owner_id = "owner_9999".to_string();
    assert!(matches!(
        store.update_property(&property_id, orphan),
        Err(StoreError::NotFound { kind: EntityKind::Owner, .. })
    ));

    let lease_id = store
        .add_lease(LeaseInput {
            property_id: property_id.clone(),
            ..lease_input(&store, LeaseStatus::Active)
        })
        .expect("lease created");
    assert!(matches!(
        store.remove_property(&property_id),
        Err(StoreError::InvalidState { .. })
    ));

    store
        .set_lease_status(&lease_id, LeaseStatus::Closed)
        .expect("lease closes");
    store
        .remove_property(&property_id)
        .expect("vacant property removed");
    assert!(store.entities().property(&property_id).is_none());
}

#[test]
fn lease_files_and_ticket_photos_accumulate() {
    let mut store = store();
    let lease_id = store
        .add_lease(lease_input(&store, LeaseStatus::Draft))
        .expect("lease created");
    store
        .add_lease_file(&lease_id, "contrato.pdf".to_string())
        .expect("file attached");
    store
        .add_lease_file(&lease_id, "aditivo.pdf".to_string())
        .expect("second file attached");
    assert_eq!(
        store.entities().lease(&lease_id).unwrap().files,
        vec!["contrato.pdf", "aditivo.pdf"]
    );

    let ticket_id = store
        .add_ticket(mutations::TicketInput {
            lease_id: Some(lease_id),
            property_id: None,
            created_by: contracts::CreatedByRole::Admin,
            description: "Infiltração no teto".to_string(),
            priority: None,
        })
        .expect("ticket created");
    store
        .add_ticket_photo(&ticket_id, "foto_01.jpg".to_string())
        .expect("photo attached");
    let ticket = store
        .entities()
        .tickets
        .iter()
        .find(|entry| entry.id == ticket_id)
        .unwrap();
    assert_eq!(ticket.photos, vec!["foto_01.jpg"]);
}

#[test]
fn notice_update_keeps_readers_and_removal_is_final() {
    let mut store = store();
    let notice_id = store
        .add_notice(notice_input("Manutenção do elevador", "Parado na quinta."))
        .expect("notice created");
    store
        .confirm_notice_read(&notice_id, "tenant_001")
        .expect("read confirmed");

    store
        .update_notice(
            &notice_id,
            notice_input("Manutenção remarcada", "Nova data: sexta."),
        )
        .expect("notice updated");
    let notice = store
        .entities()
        .notices
        .iter()
        .find(|entry| entry.id == notice_id)
        .unwrap();
    assert_eq!(notice.title, "Manutenção remarcada");
    assert_eq!(notice.read_by, vec!["tenant_001".to_string()]);

    store.remove_notice(&notice_id).expect("notice removed");
    assert!(matches!(
        store.remove_notice(&notice_id),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn current_party_selection_is_validated() {
    let mut store = store();
    let owner_id = store.entities().owners[0].id.clone();
    store
        .set_current_owner(Some(owner_id.clone()))
        .expect("owner selected");
    assert_eq!(store.current_owner_id(), Some(owner_id.as_str()));

    assert!(matches!(
        store.set_current_owner(Some("owner_9999".to_string())),
        Err(StoreError::NotFound { kind: EntityKind::Owner, .. })
    ));
    assert_eq!(store.current_owner_id(), Some(owner_id.as_str()));

    store.set_current_owner(None).expect("selection cleared");
    assert_eq!(store.current_owner_id(), None);
}

#[test]
fn missing_ids_fail_without_touching_the_snapshot() {
    let mut store = store();
    let before = store.entities().clone();
    let before_now = store.now();

    assert!(matches!(
        store.apply_penalty("inv_99999"),
        Err(StoreError::NotFound { kind: EntityKind::Invoice, .. })
    ));
    assert!(matches!(
        store.set_lease_status("lease_9999", LeaseStatus::Active),
        Err(StoreError::NotFound { kind: EntityKind::Lease, .. })
    ));
    assert!(matches!(
        store.confirm_mail_pickup("mail_9999", ""),
        Err(StoreError::NotFound { kind: EntityKind::Mail, .. })
    ));
    assert!(matches!(
        store.set_ticket_status("ticket_9999", TicketStatus::Done),
        Err(StoreError::NotFound { kind: EntityKind::Ticket, .. })
    ));

    assert_eq!(store.entities(), &before);
    assert_eq!(store.now(), before_now);
}

#[test]
fn ticket_lifecycle_appends_to_the_event_log() {
    let mut store = store();
    let ticket_id = store
        .add_ticket(mutations::TicketInput {
            lease_id: None,
            property_id: Some(store.entities().properties[0].id.clone()),
            created_by: contracts::CreatedByRole::Tenant,
            description: "Vazamento na pia".to_string(),
            priority: None,
        })
        .expect("ticket created");
    store
        .set_ticket_status(&ticket_id, TicketStatus::InProgress)
        .expect("status moves");
    store
        .set_ticket_technician(&ticket_id, Some("Paulo Gomes".to_string()))
        .expect("technician set");
    store
        .append_ticket_event(&ticket_id, "Peça encomendada".to_string())
        .expect("event appended");
    assert!(store.set_ticket_sla(&ticket_id, 0).is_err());

    let ticket = store
        .entities()
        .tickets
        .iter()
        .find(|entry| entry.id == ticket_id)
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::InProgress);
    assert_eq!(ticket.technician.as_deref(), Some("Paulo Gomes"));
    assert_eq!(ticket.events.len(), 3);
    assert_eq!(ticket.events[0].text, "Chamado aberto");
}

#[test]
fn scenario_toggle_is_reversible_on_read() {
    let mut store = store();
    let base = store.aggregates();
    store.toggle_scenario(ScenarioKind::HighDelinquency);
    let skewed = store.aggregates();
    assert_ne!(base, skewed);
    assert_eq!(skewed.kpis.delinquency_rate, 0.18);
    store.toggle_scenario(ScenarioKind::HighDelinquency);
    assert_eq!(store.aggregates(), base);
}

#[test]
fn document_round_trip_preserves_state_and_aggregates() {
    let mut store = store();
    store.toggle_scenario(ScenarioKind::HighVacancy);
    let lease_id = store.entities().leases[0].id.clone();
    let tenant_id = store.entities().tenants[0].id.clone();
    store
        .append_lease_event(&lease_id, "Vistoria".to_string())
        .expect("event appended");
    store
        .set_current_tenant(Some(tenant_id))
        .expect("tenant selected");

    let document = store.to_document();
    let json = serde_json::to_string(&document).expect("document serializes");
    let decoded = serde_json::from_str(&json).expect("document parses");
    let restored = DemoStore::from_document(decoded).expect("store restores");

    assert_eq!(restored.entities(), store.entities());
    assert_eq!(restored.scenarios(), store.scenarios());
    assert_eq!(restored.current_tenant_id(), store.current_tenant_id());
    assert_eq!(restored.aggregates(), store.aggregates());
    assert_eq!(restored.lease_events(&lease_id), store.lease_events(&lease_id));
}

#[test]
fn reset_restores_the_seeded_dataset() {
    let mut store = store();
    let pristine = store.entities().clone();
    store.toggle_scenario(ScenarioKind::HighMaintenance);
    store.generate_invoices("2025-03").expect("invoices created");
    assert_ne!(store.entities(), &pristine);

    store.reset().expect("reset succeeds");
    assert_eq!(store.entities(), &pristine);
    assert_eq!(store.scenarios(), ScenarioFlags::default());
    assert_eq!(store.now(), store.config().reference_date);
}

#[test]
fn signature_status_lands_in_the_lease_log() {
    let mut store = store();
    let lease_id = store.entities().leases[0].id.clone();
    store
        .record_signature_status(&lease_id, "env_001", contracts::EnvelopeStatus::Signed)
        .expect("status recorded");
    let events = store.lease_events(&lease_id);
    assert_eq!(events.len(), 1);
    assert!(events[0].text.contains("env_001"));
    assert!(events[0].text.contains("signed"));
}
