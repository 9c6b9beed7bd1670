//! Deterministic synthetic dataset generator. Given a fixed seed, produces a
//! fully-linked entity set satisfying every cross-entity invariant; repeated
//! generation from the same seed yields a byte-identical dataset.

use chrono::{Duration, Utc};
use contracts::{
    Contact, CreatedByRole, DemoConfig, EntitySet, GeoPoint, Invoice, InvoiceStatus, Lease,
    LeaseStatus, LogEntry, MailRecord, MaintenanceTicket, Notice, NoticeAudience, NoticeGroup,
    NotificationChannel, OccupancyStatus, Owner, PayoutAccount, PickupStatus, Property,
    PropertyKind, RenewalIndex, StoreError, Tenant, TicketPriority, TicketStatus, Transfer,
    TransferStatus,
};

use crate::periods::{due_date, trailing_periods};
use crate::sampling::{mix_seed, pick, sample_chance, sample_index, sample_range_i64};

/// Platform service fee retained from each owner payout, in basis points.
pub const TRANSFER_FEE_BPS: i64 = 300;

/// Trailing months of invoices synthesized per lease.
pub const INVOICE_MONTHS: u32 = 12;

const TICKET_COUNT: usize = 300;
const MAIL_COUNT: usize = 400;
const NOTICE_COUNT: usize = 60;

const OWNER_SALT: u64 = 0x0001_0000;
const PROPERTY_SALT: u64 = 0x0002_0000;
const TENANT_SALT: u64 = 0x0003_0000;
const LEASE_SALT: u64 = 0x0004_0000;
const TICKET_SALT: u64 = 0x0005_0000;
const MAIL_SALT: u64 = 0x0006_0000;
const NOTICE_SALT: u64 = 0x0007_0000;

const FIRST_NAMES: [&str; 24] = [
    "Ana", "Bruno", "Camila", "Diego", "Elisa", "Felipe", "Gabriela", "Henrique", "Isabela",
    "João", "Karina", "Lucas", "Mariana", "Nicolas", "Olívia", "Paulo", "Quésia", "Rafael",
    "Sofia", "Thiago", "Úrsula", "Vinícius", "William", "Yasmin",
];

const SURNAMES: [&str; 20] = [
    "Almeida", "Barbosa", "Cardoso", "Dias", "Esteves", "Ferreira", "Gomes", "Lima", "Martins",
    "Nascimento", "Oliveira", "Pereira", "Queiroz", "Ribeiro", "Santos", "Teixeira", "Uchoa",
    "Vieira", "Xavier", "Azevedo",
];

const STREETS: [&str; 16] = [
    "Rua das Acácias", "Avenida Paulista", "Rua Harmonia", "Rua Augusta", "Alameda Santos",
    "Rua Oscar Freire", "Rua dos Pinheiros", "Avenida Faria Lima", "Rua Bela Cintra",
    "Rua da Consolação", "Rua Vergueiro", "Avenida Rebouças", "Rua Teodoro Sampaio",
    "Rua Cardeal Arcoverde", "Avenida Angélica", "Rua Frei Caneca",
];

const CITIES: [&str; 12] = [
    "São Paulo", "Campinas", "Santos", "Guarulhos", "Osasco", "Santo André", "São Bernardo",
    "Sorocaba", "Jundiaí", "Barueri", "Cotia", "Mogi das Cruzes",
];

const STATES: [&str; 4] = ["SP", "RJ", "MG", "PR"];

const BANKS: [&str; 6] = [
    "Banco do Brasil", "Itaú", "Bradesco", "Caixa", "Santander", "Nubank",
];

const MAIL_SENDERS: [&str; 12] = [
    "Correios", "Mercado Livre", "Amazon", "Magazine Luiza", "Enel", "Sabesp", "Vivo", "Claro",
    "Receita Federal", "Prefeitura de São Paulo", "Shopee", "Americanas",
];

const TICKET_ISSUES: [&str; 12] = [
    "Vazamento na pia da cozinha",
    "Chuveiro sem aquecimento",
    "Infiltração no teto do quarto",
    "Porta do armário solta",
    "Tomada da sala sem energia",
    "Interfone mudo",
    "Fechadura da entrada travando",
    "Mofo na parede do banheiro",
    "Janela não fecha completamente",
    "Descarga com vazamento contínuo",
    "Ar-condicionado pingando",
    "Lâmpada da garagem queimada",
];

const NOTICE_TITLES: [&str; 10] = [
    "Manutenção programada dos elevadores",
    "Limpeza da caixa d'água",
    "Assembleia geral ordinária",
    "Dedetização das áreas comuns",
    "Atualização da taxa condominial",
    "Horário da piscina no verão",
    "Obras na fachada do bloco B",
    "Campanha de coleta seletiva",
    "Troca dos portões da garagem",
    "Cadastro de veículos na portaria",
];

const NOTICE_BODIES: [&str; 5] = [
    "Pedimos a colaboração de todos durante o período informado.",
    "A administração agradece a compreensão e permanece à disposição.",
    "Em caso de dúvidas, procure a administração pelo portal ou portaria.",
    "O serviço será executado por empresa contratada e homologada.",
    "A atividade pode gerar ruído durante o horário comercial.",
];

fn full_name(seed: u64, stream: u64) -> String {
    format!(
        "{} {}",
        pick(seed, stream, &FIRST_NAMES),
        pick(seed, stream + 1, &SURNAMES)
    )
}

fn contact_for(name: &str, seed: u64, stream: u64) -> Contact {
    let user = name.to_lowercase().replace(' ', ".");
    Contact {
        email: format!("{user}@example.com"),
        phone: format!(
            "+55 11 9{:04}-{:04}",
            sample_range_i64(seed, stream, 0, 9999),
            sample_range_i64(seed, stream + 1, 0, 9999)
        ),
    }
}

fn document_number(seed: u64, stream: u64) -> String {
    format!("{:011}", mix_seed(seed, stream) % 100_000_000_000)
}

fn sample_count(seed: u64, stream: u64, range: contracts::CountRange) -> usize {
    sample_range_i64(seed, stream, i64::from(range.min), i64::from(range.max)) as usize
}

fn round_bps(amount: i64, bps: i64) -> i64 {
    ((amount * bps) as f64 / 10_000.0).round() as i64
}

/// Generates the base dataset for `config`. Pure in the seed: no wall clock,
/// no global state.
pub fn generate(config: &DemoConfig) -> Result<EntitySet, StoreError> {
    config.validate()?;

    let seed = config.seed;
    let reference = config.reference_date;

    let owner_count = sample_count(seed, 1, config.owners);
    let property_count = sample_count(seed, 2, config.properties);
    let lease_count = sample_count(seed, 3, config.leases).min(property_count);
    let tenant_count = lease_count + sample_count(seed, 4, config.tenant_surplus);

    let owners: Vec<Owner> = (0..owner_count)
        .map(|idx| {
            let entity_seed = mix_seed(seed, OWNER_SALT + idx as u64);
            let name = full_name(entity_seed, 1);
            let contact = contact_for(&name, entity_seed, 3);
            Owner {
                id: format!("owner_{idx:03}"),
                document: document_number(entity_seed, 5),
                contact,
                payout_account: PayoutAccount {
                    bank: pick(entity_seed, 6, &BANKS).to_string(),
                    branch: format!("{:04}", sample_range_i64(entity_seed, 7, 1, 9999)),
                    account: format!("{:06}-{}", sample_range_i64(entity_seed, 8, 1, 999_999),
                        sample_range_i64(entity_seed, 9, 0, 9)),
                },
                name,
            }
        })
        .collect();

    let mut properties: Vec<Property> = (0..property_count)
        .map(|idx| {
            let entity_seed = mix_seed(seed, PROPERTY_SALT + idx as u64);
            let kind = *pick(
                entity_seed,
                1,
                &[
                    PropertyKind::Apartment,
                    PropertyKind::House,
                    PropertyKind::Studio,
                    PropertyKind::Office,
                    PropertyKind::Land,
                ],
            );
            // Greater São Paulo bounding box, as in the source dataset.
            let lat = -23.7 + sample_range_i64(entity_seed, 2, 0, 300_000) as f64 / 1_000_000.0;
            let lng = -46.8 + sample_range_i64(entity_seed, 3, 0, 300_000) as f64 / 1_000_000.0;
            Property {
                id: format!("prop_{idx:04}"),
                code: format!("IM-{}", 1000 + idx),
                kind,
                address: format!(
                    "{}, {}",
                    pick(entity_seed, 4, &STREETS),
                    sample_range_i64(entity_seed, 5, 1, 2000)
                ),
                city: pick(entity_seed, 6, &CITIES).to_string(),
                state: pick(entity_seed, 7, &STATES).to_string(),
                geo: GeoPoint { lat, lng },
                area_m2: sample_range_i64(entity_seed, 8, 28, 250),
                rooms: sample_range_i64(entity_seed, 9, 0, 5) as u8,
                bathrooms: sample_range_i64(entity_seed, 10, 1, 4) as u8,
                parking_spots: sample_range_i64(entity_seed, 11, 0, 3) as u8,
                photos: Vec::new(),
                occupancy: OccupancyStatus::Vacant,
                owner_id: owners[sample_index(entity_seed, 12, owners.len())].id.clone(),
                active_lease_id: None,
            }
        })
        .collect();

    let tenants: Vec<Tenant> = (0..tenant_count)
        .map(|idx| {
            let entity_seed = mix_seed(seed, TENANT_SALT + idx as u64);
            let name = full_name(entity_seed, 1);
            let contact = contact_for(&name, entity_seed, 3);
            Tenant {
                id: format!("tenant_{idx:03}"),
                document: document_number(entity_seed, 5),
                contact,
                notification_channel: *pick(
                    entity_seed,
                    6,
                    &[
                        NotificationChannel::Email,
                        NotificationChannel::Sms,
                        NotificationChannel::Push,
                    ],
                ),
                name,
            }
        })
        .collect();

    // Leases consume the unassigned-property pool without replacement, so no
    // property can end up with two active leases.
    let mut free_pool: Vec<usize> = (0..properties.len()).collect();
    let mut leases: Vec<Lease> = Vec::with_capacity(lease_count);
    for idx in 0..lease_count {
        let entity_seed = mix_seed(seed, LEASE_SALT + idx as u64);
        let pool_slot = sample_index(entity_seed, 1, free_pool.len());
        let property_idx = free_pool.swap_remove(pool_slot);

        let start = reference - Duration::days(sample_range_i64(entity_seed, 2, 30, 720));
        let end = start + Duration::days(sample_range_i64(entity_seed, 3, 180, 720));
        let status = *pick(
            entity_seed,
            4,
            &[
                LeaseStatus::Active,
                LeaseStatus::Active,
                LeaseStatus::Active,
                LeaseStatus::PendingSignature,
                LeaseStatus::Closed,
            ],
        );
        let lease = Lease {
            id: format!("lease_{idx:04}"),
            property_id: properties[property_idx].id.clone(),
            tenant_id: tenants[sample_index(entity_seed, 5, tenants.len())].id.clone(),
            owner_id: properties[property_idx].owner_id.clone(),
            start,
            end,
            rent_amount: sample_range_i64(entity_seed, 6, 1200, 8000),
            condo_fee: sample_range_i64(entity_seed, 7, 0, 1200),
            renewal_index: *pick(
                entity_seed,
                8,
                &[RenewalIndex::Annual, RenewalIndex::Igpm, RenewalIndex::Ipca],
            ),
            status,
            files: Vec::new(),
        };

        // Occupancy is derived from the lease drawn for the property; the
        // active-lease reference exists only while the lease is active.
        let property = &mut properties[property_idx];
        if status == LeaseStatus::Active {
            property.occupancy = OccupancyStatus::Occupied;
            property.active_lease_id = Some(lease.id.clone());
        } else {
            property.occupancy = OccupancyStatus::Vacant;
            property.active_lease_id = None;
        }
        leases.push(lease);
    }

    let periods = trailing_periods(reference, INVOICE_MONTHS);
    let mut invoices: Vec<Invoice> = Vec::with_capacity(leases.len() * periods.len());
    for (lease_idx, lease) in leases.iter().enumerate() {
        let lease_seed = mix_seed(seed, LEASE_SALT + lease_idx as u64);
        for (month_idx, period) in periods.iter().enumerate() {
            let stream = 100 + month_idx as u64;
            let status = *pick(
                lease_seed,
                stream,
                &[
                    InvoiceStatus::Paid,
                    InvoiceStatus::Paid,
                    InvoiceStatus::Open,
                    InvoiceStatus::Overdue,
                ],
            );
            let amount = lease.monthly_amount();
            let (interest, penalty) = if status == InvoiceStatus::Overdue {
                (round_bps(amount, 200), round_bps(amount, 100))
            } else {
                (0, 0)
            };
            invoices.push(Invoice {
                id: format!("inv_{:05}", invoices.len()),
                lease_id: lease.id.clone(),
                period: period.clone(),
                due_date: due_date(period)?,
                amount,
                interest,
                penalty,
                discount: 0,
                status,
                paid_amount: None,
                paid_at: None,
                receipt: None,
            });
        }
    }

    // One transfer per (owner, period) over that period's paid invoices.
    let mut transfers: Vec<Transfer> = Vec::with_capacity(owners.len() * periods.len());
    for owner in &owners {
        for period in &periods {
            let gross: i64 = invoices
                .iter()
                .filter(|invoice| {
                    invoice.period == *period
                        && invoice.status == InvoiceStatus::Paid
                        && leases
                            .iter()
                            .any(|lease| lease.id == invoice.lease_id && lease.owner_id == owner.id)
                })
                .map(|invoice| invoice.amount)
                .sum();
            let fee = round_bps(gross, TRANSFER_FEE_BPS);
            let net = (gross - fee).max(0);
            transfers.push(Transfer {
                id: format!("transfer_{:05}", transfers.len()),
                owner_id: owner.id.clone(),
                period: period.clone(),
                gross_amount: gross,
                fee,
                net_amount: net,
                status: if net > 0 {
                    TransferStatus::Settled
                } else {
                    TransferStatus::Pending
                },
            });
        }
    }

    let tickets: Vec<MaintenanceTicket> = (0..TICKET_COUNT)
        .map(|idx| {
            let entity_seed = mix_seed(seed, TICKET_SALT + idx as u64);
            let lease = &leases[sample_index(entity_seed, 1, leases.len())];
            MaintenanceTicket {
                id: format!("ticket_{idx:04}"),
                lease_id: Some(lease.id.clone()),
                property_id: Some(lease.property_id.clone()),
                created_by: *pick(entity_seed, 2, &[CreatedByRole::Admin, CreatedByRole::Tenant]),
                description: pick(entity_seed, 3, &TICKET_ISSUES).to_string(),
                photos: Vec::new(),
                priority: *pick(
                    entity_seed,
                    4,
                    &[TicketPriority::Low, TicketPriority::Medium, TicketPriority::High],
                ),
                technician: Some(full_name(entity_seed, 5)),
                status: *pick(
                    entity_seed,
                    7,
                    &[
                        TicketStatus::Open,
                        TicketStatus::InProgress,
                        TicketStatus::Waiting,
                        TicketStatus::Done,
                    ],
                ),
                sla_days: sample_range_i64(entity_seed, 8, 2, 10),
                events: vec![LogEntry {
                    at: reference - Duration::days(sample_range_i64(entity_seed, 9, 0, 30)),
                    text: "Chamado aberto".to_string(),
                }],
            }
        })
        .collect();

    let mail: Vec<MailRecord> = (0..MAIL_COUNT)
        .map(|idx| {
            let entity_seed = mix_seed(seed, MAIL_SALT + idx as u64);
            let property = &properties[sample_index(entity_seed, 1, properties.len())];
            let picked_up = sample_chance(entity_seed, 2, 600);
            MailRecord {
                id: format!("mail_{idx:04}"),
                property_id: property.id.clone(),
                unit_id: None,
                recipient: full_name(entity_seed, 3),
                sender: pick(entity_seed, 5, &MAIL_SENDERS).to_string(),
                photo: None,
                received_at: reference - Duration::days(sample_range_i64(entity_seed, 6, 0, 60)),
                pickup_status: if picked_up {
                    PickupStatus::PickedUp
                } else {
                    PickupStatus::Pending
                },
                picked_up_at: picked_up.then(|| {
                    reference - Duration::days(sample_range_i64(entity_seed, 7, 0, 30))
                }),
            }
        })
        .collect();

    let notices: Vec<Notice> = (0..NOTICE_COUNT)
        .map(|idx| {
            let entity_seed = mix_seed(seed, NOTICE_SALT + idx as u64);
            Notice {
                id: format!("notice_{idx:03}"),
                title: pick(entity_seed, 1, &NOTICE_TITLES).to_string(),
                body: pick(entity_seed, 2, &NOTICE_BODIES).to_string(),
                groups: vec![*pick(
                    entity_seed,
                    3,
                    &[NoticeGroup::General, NoticeGroup::Building, NoticeGroup::Unit],
                )],
                audience: *pick(
                    entity_seed,
                    4,
                    &[NoticeAudience::All, NoticeAudience::Tenants, NoticeAudience::Owners],
                ),
                expiry: sample_chance(entity_seed, 5, 300).then(|| {
                    reference + Duration::days(sample_range_i64(entity_seed, 6, 7, 180))
                }),
                attachments: Vec::new(),
                read_by: Vec::new(),
                segment_detail: sample_chance(entity_seed, 7, 500).then(|| {
                    format!("BL-{}", sample_range_i64(entity_seed, 8, 1, 12))
                }),
            }
        })
        .collect();

    Ok(EntitySet {
        properties,
        units: Vec::new(),
        owners,
        tenants,
        leases,
        invoices,
        transfers,
        tickets,
        mail,
        notices,
    })
}

pub(crate) fn rounded_share(amount: i64, bps: i64) -> i64 {
    round_bps(amount, bps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_reproducible() {
        let config = DemoConfig::default();
        let first = generate(&config).expect("dataset generates");
        let second = generate(&config).expect("dataset generates");
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_differ() {
        let base = generate(&DemoConfig::default()).expect("dataset generates");
        let mut other_config = DemoConfig::default();
        other_config.seed = 1337;
        let other = generate(&other_config).expect("dataset generates");
        assert_ne!(base, other);
    }

    #[test]
    fn counts_fall_inside_configured_ranges() {
        let config = DemoConfig::default();
        let entities = generate(&config).expect("dataset generates");
        let props = entities.properties.len() as u32;
        let owners = entities.owners.len() as u32;
        let leases = entities.leases.len() as u32;
        assert!((config.properties.min..=config.properties.max).contains(&props));
        assert!((config.owners.min..=config.owners.max).contains(&owners));
        assert!((config.leases.min..=config.leases.max).contains(&leases));
        assert!(entities.tenants.len() > entities.leases.len());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = DemoConfig::default();
        config.leases = contracts::CountRange::new(0, 0);
        assert!(matches!(generate(&config), Err(StoreError::Validation(_))));
    }

    #[test]
    fn transfer_fee_is_three_percent_rounded() {
        assert_eq!(round_bps(10_000, TRANSFER_FEE_BPS), 300);
        assert_eq!(round_bps(2_300, 200), 46);
        assert_eq!(round_bps(2_300, 100), 23);
        assert_eq!(round_bps(0, TRANSFER_FEE_BPS), 0);
    }
}
