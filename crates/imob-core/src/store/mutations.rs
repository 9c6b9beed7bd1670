//! Mutation API. Every operation validates first, then applies atomically in
//! a single clock tick; on any error the snapshot is left untouched.

use chrono::{DateTime, Duration, Utc};
use contracts::{
    CreatedByRole, EntityKind, EnvelopeStatus, GeoPoint, Invoice, InvoiceStatus, Lease,
    LeaseStatus, LogEntry, MailRecord, MaintenanceTicket, Notice, NoticeAudience, NoticeGroup,
    OccupancyStatus, PickupStatus, Property, PropertyKind, RenewalIndex, StoreError,
    TicketPriority, TicketStatus, TransferStatus,
};

use crate::gen::rounded_share;
use crate::periods::{due_date, parse_period};

use super::DemoStore;

const DEFAULT_RENT: i64 = 2000;
const DEFAULT_CONDO_FEE: i64 = 300;
const DEFAULT_TICKET_SLA_DAYS: i64 = 5;

#[derive(Debug, Clone)]
pub struct PropertyInput {
    pub code: Option<String>,
    pub kind: PropertyKind,
    pub address: String,
    pub city: String,
    pub state: String,
    pub geo: GeoPoint,
    pub area_m2: i64,
    pub rooms: u8,
    pub bathrooms: u8,
    pub parking_spots: u8,
    pub owner_id: String,
}

#[derive(Debug, Clone)]
pub struct LeaseInput {
    pub property_id: String,
    pub tenant_id: String,
    pub rent_amount: Option<i64>,
    pub condo_fee: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub renewal_index: Option<RenewalIndex>,
    pub status: Option<LeaseStatus>,
}

#[derive(Debug, Clone)]
pub struct TicketInput {
    pub lease_id: Option<String>,
    pub property_id: Option<String>,
    pub created_by: CreatedByRole,
    pub description: String,
    pub priority: Option<TicketPriority>,
}

#[derive(Debug, Clone)]
pub struct MailInput {
    pub property_id: String,
    pub unit_id: Option<String>,
    pub recipient: String,
    pub sender: String,
    pub photo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NoticeInput {
    pub title: String,
    pub body: String,
    pub groups: Vec<NoticeGroup>,
    pub audience: NoticeAudience,
    pub expiry: Option<DateTime<Utc>>,
    pub segment_detail: Option<String>,
    pub attachments: Vec<String>,
}

impl DemoStore {
    pub fn add_property(&mut self, input: PropertyInput) -> Result<String, StoreError> {
        if self.entities.owner(&input.owner_id).is_none() {
            return Err(StoreError::not_found(EntityKind::Owner, input.owner_id));
        }
        self.tick();
        let seq = self.id_counters.properties;
        self.id_counters.properties += 1;
        let id = format!("prop_{seq:04}");
        let code = input.code.unwrap_or_else(|| format!("IM-{}", 1000 + seq));
        self.entities.properties.push(Property {
            id: id.clone(),
            code,
            kind: input.kind,
            address: input.address,
            city: input.city,
            state: input.state,
            geo: input.geo,
            area_m2: input.area_m2,
            rooms: input.rooms,
            bathrooms: input.bathrooms,
            parking_spots: input.parking_spots,
            photos: Vec::new(),
            occupancy: OccupancyStatus::Vacant,
            owner_id: input.owner_id,
            active_lease_id: None,
        });
        Ok(id)
    }

    /// Replaces the descriptive fields of a property; occupancy, photos and
    /// the active-lease link are managed by lease transitions, not here.
    pub fn update_property(&mut self, id: &str, input: PropertyInput) -> Result<(), StoreError> {
        if self.entities.owner(&input.owner_id).is_none() {
            return Err(StoreError::not_found(EntityKind::Owner, input.owner_id));
        }
        if self.entities.property(id).is_none() {
            return Err(StoreError::not_found(EntityKind::Property, id));
        }
        self.tick();
        let property = self.entities.property_mut(id).expect("checked above");
        if let Some(code) = input.code {
            property.code = code;
        }
        property.kind = input.kind;
        property.address = input.address;
        property.city = input.city;
        property.state = input.state;
        property.geo = input.geo;
        property.area_m2 = input.area_m2;
        property.rooms = input.rooms;
        property.bathrooms = input.bathrooms;
        property.parking_spots = input.parking_spots;
        property.owner_id = input.owner_id;
        Ok(())
    }

    pub fn remove_property(&mut self, id: &str) -> Result<(), StoreError> {
        let property = self
            .entities
            .property(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Property, id))?;
        if property.active_lease_id.is_some() {
            return Err(StoreError::invalid_state(
                EntityKind::Property,
                id,
                "property has an active lease",
            ));
        }
        self.tick();
        self.entities.properties.retain(|entry| entry.id != id);
        Ok(())
    }

    /// Creates a lease; when created `active` it links its property the same
    /// way `set_lease_status` does.
    pub fn add_lease(&mut self, input: LeaseInput) -> Result<String, StoreError> {
        let property = self
            .entities
            .property(&input.property_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Property, input.property_id.clone()))?;
        let owner_id = property.owner_id.clone();
        if self.entities.tenant(&input.tenant_id).is_none() {
            return Err(StoreError::not_found(EntityKind::Tenant, input.tenant_id));
        }
        let status = input.status.unwrap_or(LeaseStatus::Draft);
        if status == LeaseStatus::Active {
            if let Some(existing) = &property.active_lease_id {
                return Err(StoreError::invalid_state(
                    EntityKind::Property,
                    input.property_id,
                    format!("already has active lease {existing}"),
                ));
            }
        }
        let start_candidate = input.start.unwrap_or(self.now() + Duration::seconds(1));
        let end = input.end.unwrap_or(start_candidate + Duration::days(365));
        if end <= start_candidate {
            return Err(StoreError::Validation(
                "lease end must be after its start".to_string(),
            ));
        }
        let at = self.tick();
        let seq = self.id_counters.leases;
        self.id_counters.leases += 1;
        let id = format!("lease_{seq:04}");
        let start = input.start.unwrap_or(at);
        self.entities.leases.push(Lease {
            id: id.clone(),
            property_id: input.property_id.clone(),
            tenant_id: input.tenant_id,
            owner_id,
            start,
            end,
            rent_amount: input.rent_amount.unwrap_or(DEFAULT_RENT),
            condo_fee: input.condo_fee.unwrap_or(DEFAULT_CONDO_FEE),
            renewal_index: input.renewal_index.unwrap_or(RenewalIndex::Annual),
            status,
            files: Vec::new(),
        });
        if status == LeaseStatus::Active {
            let property = self
                .entities
                .property_mut(&input.property_id)
                .expect("checked above");
            property.occupancy = OccupancyStatus::Occupied;
            property.active_lease_id = Some(id.clone());
        }
        self.push_lease_event(&id, at, "Contrato criado".to_string());
        Ok(id)
    }

    /// Transitions a lease. Moving to `active` links the property (occupied
    /// plus active-lease reference); moving away unlinks it and marks the
    /// property vacant. A property can carry at most one active lease.
    pub fn set_lease_status(&mut self, id: &str, status: LeaseStatus) -> Result<(), StoreError> {
        let lease = self
            .entities
            .lease(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Lease, id))?;
        let property_id = lease.property_id.clone();
        let previous = lease.status;

        if status == LeaseStatus::Active && previous != LeaseStatus::Active {
            if let Some(property) = self.entities.property(&property_id) {
                if let Some(existing) = &property.active_lease_id {
                    if existing != id {
                        return Err(StoreError::invalid_state(
                            EntityKind::Property,
                            property_id,
                            format!("already has active lease {existing}"),
                        ));
                    }
                }
            }
        }

        let at = self.tick();
        self.entities.lease_mut(id).expect("checked above").status = status;
        if let Some(property) = self.entities.property_mut(&property_id) {
            if status == LeaseStatus::Active {
                property.occupancy = OccupancyStatus::Occupied;
                property.active_lease_id = Some(id.to_string());
            } else if property.active_lease_id.as_deref() == Some(id) {
                property.occupancy = OccupancyStatus::Vacant;
                property.active_lease_id = None;
            }
        }
        self.push_lease_event(id, at, format!("Status alterado para {status:?}"));
        Ok(())
    }

    pub fn add_lease_file(&mut self, id: &str, file: String) -> Result<(), StoreError> {
        if self.entities.lease(id).is_none() {
            return Err(StoreError::not_found(EntityKind::Lease, id));
        }
        self.tick();
        self.entities
            .lease_mut(id)
            .expect("checked above")
            .files
            .push(file);
        Ok(())
    }

    pub fn append_lease_event(&mut self, id: &str, text: String) -> Result<(), StoreError> {
        if self.entities.lease(id).is_none() {
            return Err(StoreError::not_found(EntityKind::Lease, id));
        }
        let at = self.tick();
        self.push_lease_event(id, at, text);
        Ok(())
    }

    /// Records an e-signature outcome in the lease event log.
    pub fn record_signature_status(
        &mut self,
        lease_id: &str,
        envelope_id: &str,
        status: EnvelopeStatus,
    ) -> Result<(), StoreError> {
        if self.entities.lease(lease_id).is_none() {
            return Err(StoreError::not_found(EntityKind::Lease, lease_id));
        }
        let at = self.tick();
        self.push_lease_event(
            lease_id,
            at,
            format!("Assinatura {envelope_id}: {}", status.as_str()),
        );
        Ok(())
    }

    /// Creates the missing `open` invoices for the given competence period,
    /// at most one per (lease, period). Every lease is billed regardless of
    /// its status. Idempotent: returns the count actually created.
    pub fn generate_invoices(&mut self, period: &str) -> Result<usize, StoreError> {
        parse_period(period)?;
        let due = due_date(period)?;
        self.tick();
        let pending: Vec<(String, i64)> = self
            .entities
            .leases
            .iter()
            .filter(|lease| {
                !self
                    .entities
                    .invoices
                    .iter()
                    .any(|invoice| invoice.lease_id == lease.id && invoice.period == period)
            })
            .map(|lease| (lease.id.clone(), lease.monthly_amount()))
            .collect();
        let created = pending.len();
        for (lease_id, amount) in pending {
            let seq = self.id_counters.invoices;
            self.id_counters.invoices += 1;
            self.entities.invoices.push(Invoice {
                id: format!("inv_{seq:05}"),
                lease_id,
                period: period.to_string(),
                due_date: due,
                amount,
                interest: 0,
                penalty: 0,
                discount: 0,
                status: InvoiceStatus::Open,
                paid_amount: None,
                paid_at: None,
                receipt: None,
            });
        }
        log::info!("generated {created} invoices for period {period}");
        Ok(created)
    }

    /// Adds late charges to an unpaid invoice: 2% interest and 1% penalty of
    /// the base amount, and flags it overdue. Charges compound on repeat
    /// calls without a cap; a paid invoice is a fixed point.
    pub fn apply_penalty(&mut self, invoice_id: &str) -> Result<(), StoreError> {
        let invoice = self
            .entities
            .invoice(invoice_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Invoice, invoice_id))?;
        if invoice.status == InvoiceStatus::Paid {
            return Err(StoreError::invalid_state(
                EntityKind::Invoice,
                invoice_id,
                "invoice already paid",
            ));
        }
        self.tick();
        let invoice = self.entities.invoice_mut(invoice_id).expect("checked above");
        invoice.interest += rounded_share(invoice.amount, 200);
        invoice.penalty += rounded_share(invoice.amount, 100);
        invoice.status = InvoiceStatus::Overdue;
        Ok(())
    }

    /// Records a payment. The invoice flips to `paid` only when the amount
    /// covers the full outstanding total; a partial payment is recorded but
    /// leaves the status untouched.
    pub fn register_payment(
        &mut self,
        invoice_id: &str,
        amount: i64,
        receipt: Option<String>,
    ) -> Result<(), StoreError> {
        let invoice = self
            .entities
            .invoice(invoice_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Invoice, invoice_id))?;
        if invoice.status == InvoiceStatus::Paid {
            return Err(StoreError::invalid_state(
                EntityKind::Invoice,
                invoice_id,
                "invoice already paid",
            ));
        }
        let at = self.tick();
        let invoice = self.entities.invoice_mut(invoice_id).expect("checked above");
        invoice.paid_amount = Some(amount);
        invoice.paid_at = Some(at);
        invoice.receipt = receipt;
        if amount >= invoice.total_due() {
            invoice.status = InvoiceStatus::Paid;
        }
        Ok(())
    }

    /// Marks a pending transfer settled; settling twice is rejected.
    pub fn settle_transfer(&mut self, id: &str) -> Result<(), StoreError> {
        let transfer = self
            .entities
            .transfers
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Transfer, id))?;
        if transfer.status == TransferStatus::Settled {
            return Err(StoreError::invalid_state(
                EntityKind::Transfer,
                id,
                "transfer already settled",
            ));
        }
        self.tick();
        self.entities.transfer_mut(id).expect("checked above").status = TransferStatus::Settled;
        Ok(())
    }

    pub fn add_ticket(&mut self, input: TicketInput) -> Result<String, StoreError> {
        if let Some(lease_id) = &input.lease_id {
            if self.entities.lease(lease_id).is_none() {
                return Err(StoreError::not_found(EntityKind::Lease, lease_id.clone()));
            }
        }
        if let Some(property_id) = &input.property_id {
            if self.entities.property(property_id).is_none() {
                return Err(StoreError::not_found(
                    EntityKind::Property,
                    property_id.clone(),
                ));
            }
        }
        let at = self.tick();
        let seq = self.id_counters.tickets;
        self.id_counters.tickets += 1;
        let id = format!("ticket_{seq:04}");
        self.entities.tickets.push(MaintenanceTicket {
            id: id.clone(),
            lease_id: input.lease_id,
            property_id: input.property_id,
            created_by: input.created_by,
            description: input.description,
            photos: Vec::new(),
            priority: input.priority.unwrap_or(TicketPriority::Medium),
            technician: None,
            status: TicketStatus::Open,
            sla_days: DEFAULT_TICKET_SLA_DAYS,
            events: vec![LogEntry {
                at,
                text: "Chamado aberto".to_string(),
            }],
        });
        Ok(id)
    }

    pub fn append_ticket_event(&mut self, id: &str, text: String) -> Result<(), StoreError> {
        if self.entities.tickets.iter().all(|entry| entry.id != id) {
            return Err(StoreError::not_found(EntityKind::Ticket, id));
        }
        let at = self.tick();
        self.entities
            .ticket_mut(id)
            .expect("checked above")
            .events
            .push(LogEntry { at, text });
        Ok(())
    }

    /// Tickets move freely among the four states; each change is logged.
    pub fn set_ticket_status(&mut self, id: &str, status: TicketStatus) -> Result<(), StoreError> {
        if self.entities.tickets.iter().all(|entry| entry.id != id) {
            return Err(StoreError::not_found(EntityKind::Ticket, id));
        }
        let at = self.tick();
        let ticket = self.entities.ticket_mut(id).expect("checked above");
        ticket.status = status;
        ticket.events.push(LogEntry {
            at,
            text: format!("Status alterado para {status:?}"),
        });
        Ok(())
    }

    pub fn set_ticket_technician(
        &mut self,
        id: &str,
        technician: Option<String>,
    ) -> Result<(), StoreError> {
        if self.entities.tickets.iter().all(|entry| entry.id != id) {
            return Err(StoreError::not_found(EntityKind::Ticket, id));
        }
        self.tick();
        self.entities.ticket_mut(id).expect("checked above").technician = technician;
        Ok(())
    }

    pub fn set_ticket_sla(&mut self, id: &str, sla_days: i64) -> Result<(), StoreError> {
        if sla_days <= 0 {
            return Err(StoreError::Validation(format!(
                "ticket SLA must be positive, got {sla_days}"
            )));
        }
        if self.entities.tickets.iter().all(|entry| entry.id != id) {
            return Err(StoreError::not_found(EntityKind::Ticket, id));
        }
        self.tick();
        self.entities.ticket_mut(id).expect("checked above").sla_days = sla_days;
        Ok(())
    }

    pub fn set_ticket_priority(
        &mut self,
        id: &str,
        priority: TicketPriority,
    ) -> Result<(), StoreError> {
        if self.entities.tickets.iter().all(|entry| entry.id != id) {
            return Err(StoreError::not_found(EntityKind::Ticket, id));
        }
        self.tick();
        self.entities.ticket_mut(id).expect("checked above").priority = priority;
        Ok(())
    }

    pub fn add_ticket_photo(&mut self, id: &str, photo: String) -> Result<(), StoreError> {
        if self.entities.tickets.iter().all(|entry| entry.id != id) {
            return Err(StoreError::not_found(EntityKind::Ticket, id));
        }
        self.tick();
        self.entities
            .ticket_mut(id)
            .expect("checked above")
            .photos
            .push(photo);
        Ok(())
    }

    /// Registers an incoming delivery and announces it with an automatic
    /// unit-targeted notice for the tenants of that property.
    pub fn add_mail(&mut self, input: MailInput) -> Result<String, StoreError> {
        let property = self
            .entities
            .property(&input.property_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Property, input.property_id.clone()))?;
        let property_code = property.code.clone();
        let at = self.tick();

        let seq = self.id_counters.mail;
        self.id_counters.mail += 1;
        let id = format!("mail_{seq:04}");
        self.entities.mail.push(MailRecord {
            id: id.clone(),
            property_id: input.property_id,
            unit_id: input.unit_id,
            recipient: input.recipient.clone(),
            sender: input.sender.clone(),
            photo: input.photo,
            received_at: at,
            pickup_status: PickupStatus::Pending,
            picked_up_at: None,
        });

        let notice_seq = self.id_counters.notices;
        self.id_counters.notices += 1;
        self.entities.notices.push(Notice {
            id: format!("notice_{notice_seq:03}"),
            title: format!("Correspondência recebida para {}", input.recipient),
            body: format!("Remetente: {}. Imóvel: {property_code}.", input.sender),
            groups: vec![NoticeGroup::Unit],
            audience: NoticeAudience::Tenants,
            expiry: None,
            attachments: Vec::new(),
            read_by: Vec::new(),
            segment_detail: Some(property_code),
        });
        Ok(id)
    }

    /// One-way pickup confirmation. The responsible party, when given,
    /// replaces the recorded recipient.
    pub fn confirm_mail_pickup(&mut self, id: &str, responsible: &str) -> Result<(), StoreError> {
        let record = self
            .entities
            .mail
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Mail, id))?;
        if record.pickup_status == PickupStatus::PickedUp {
            return Err(StoreError::invalid_state(
                EntityKind::Mail,
                id,
                "mail already picked up",
            ));
        }
        let at = self.tick();
        let record = self.entities.mail_record_mut(id).expect("checked above");
        record.pickup_status = PickupStatus::PickedUp;
        record.picked_up_at = Some(at);
        if !responsible.is_empty() {
            record.recipient = responsible.to_string();
        }
        Ok(())
    }

    pub fn add_notice(&mut self, input: NoticeInput) -> Result<String, StoreError> {
        self.tick();
        let seq = self.id_counters.notices;
        self.id_counters.notices += 1;
        let id = format!("notice_{seq:03}");
        self.entities.notices.push(Notice {
            id: id.clone(),
            title: input.title,
            body: input.body,
            groups: input.groups,
            audience: input.audience,
            expiry: input.expiry,
            attachments: input.attachments,
            read_by: Vec::new(),
            segment_detail: input.segment_detail,
        });
        Ok(id)
    }

    /// Replaces the content of a notice; read confirmations are kept.
    pub fn update_notice(&mut self, id: &str, input: NoticeInput) -> Result<(), StoreError> {
        if self.entities.notices.iter().all(|entry| entry.id != id) {
            return Err(StoreError::not_found(EntityKind::Notice, id));
        }
        self.tick();
        let notice = self.entities.notice_mut(id).expect("checked above");
        notice.title = input.title;
        notice.body = input.body;
        notice.groups = input.groups;
        notice.audience = input.audience;
        notice.expiry = input.expiry;
        notice.attachments = input.attachments;
        notice.segment_detail = input.segment_detail;
        Ok(())
    }

    pub fn remove_notice(&mut self, id: &str) -> Result<(), StoreError> {
        if self.entities.notices.iter().all(|entry| entry.id != id) {
            return Err(StoreError::not_found(EntityKind::Notice, id));
        }
        self.tick();
        self.entities.notices.retain(|entry| entry.id != id);
        Ok(())
    }

    /// Set semantics on the reader list: confirming twice is a no-op.
    pub fn confirm_notice_read(&mut self, id: &str, reader: &str) -> Result<(), StoreError> {
        if self.entities.notices.iter().all(|entry| entry.id != id) {
            return Err(StoreError::not_found(EntityKind::Notice, id));
        }
        self.tick();
        let notice = self.entities.notice_mut(id).expect("checked above");
        if let Err(slot) = notice.read_by.binary_search_by(|entry| entry.as_str().cmp(reader)) {
            notice.read_by.insert(slot, reader.to_string());
        }
        Ok(())
    }
}
