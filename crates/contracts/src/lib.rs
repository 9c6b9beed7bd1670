//! v1 cross-boundary contracts shared by the demo engine, API, persistence, and CLI.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Storage name under which the full demo document is persisted.
pub const STORAGE_NAME: &str = "imobgest-demo";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DemoConfig {
    pub schema_version: String,
    #[serde(with = "serde_u64_string")]
    pub seed: u64,
    pub reference_date: DateTime<Utc>,
    pub properties: CountRange,
    pub owners: CountRange,
    pub leases: CountRange,
    pub tenant_surplus: CountRange,
    pub notes: Option<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            seed: 42,
            reference_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            properties: CountRange::new(150, 300),
            owners: CountRange::new(60, 80),
            leases: CountRange::new(120, 150),
            tenant_surplus: CountRange::new(10, 60),
            notes: None,
        }
    }
}

impl DemoConfig {
    /// Rejects configurations the generator cannot satisfy.
    pub fn validate(&self) -> Result<(), StoreError> {
        for (label, range) in [
            ("properties", self.properties),
            ("owners", self.owners),
            ("leases", self.leases),
            ("tenant_surplus", self.tenant_surplus),
        ] {
            if range.min > range.max {
                return Err(StoreError::Validation(format!(
                    "{label} range is inverted: {}..{}",
                    range.min, range.max
                )));
            }
        }
        if self.properties.min == 0 || self.owners.min == 0 || self.leases.min == 0 {
            return Err(StoreError::Validation(
                "properties, owners and leases must be nonzero".to_string(),
            ));
        }
        if self.leases.max > self.properties.min {
            // Leases consume the free-property pool without replacement.
            return Err(StoreError::Validation(format!(
                "lease count {} can exceed the property pool {}",
                self.leases.max, self.properties.min
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Apartment,
    House,
    Studio,
    Office,
    Land,
}

impl PropertyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::House => "house",
            Self::Studio => "studio",
            Self::Office => "office",
            Self::Land => "land",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyStatus {
    Occupied,
    Vacant,
    UnderMaintenance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: String,
    pub code: String,
    pub kind: PropertyKind,
    pub address: String,
    pub city: String,
    pub state: String,
    pub geo: GeoPoint,
    pub area_m2: i64,
    pub rooms: u8,
    pub bathrooms: u8,
    pub parking_spots: u8,
    pub photos: Vec<String>,
    pub occupancy: OccupancyStatus,
    pub owner_id: String,
    pub active_lease_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Unit {
    pub id: String,
    pub property_id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayoutAccount {
    pub bank: String,
    pub branch: String,
    pub account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Owner {
    pub id: String,
    pub name: String,
    pub document: String,
    pub contact: Contact,
    pub payout_account: PayoutAccount,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Sms,
    Push,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub document: String,
    pub contact: Contact,
    pub notification_channel: NotificationChannel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RenewalIndex {
    Annual,
    Igpm,
    Ipca,
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Draft,
    PendingSignature,
    Active,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lease {
    pub id: String,
    pub property_id: String,
    pub tenant_id: String,
    pub owner_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub rent_amount: i64,
    pub condo_fee: i64,
    pub renewal_index: RenewalIndex,
    pub status: LeaseStatus,
    pub files: Vec<String>,
}

impl Lease {
    /// Monthly billed amount: rent plus condo fee.
    pub fn monthly_amount(&self) -> i64 {
        self.rent_amount + self.condo_fee
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Open,
    Overdue,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: String,
    pub lease_id: String,
    /// Competence period, `YYYY-MM`.
    pub period: String,
    pub due_date: NaiveDate,
    pub amount: i64,
    pub interest: i64,
    pub penalty: i64,
    pub discount: i64,
    pub status: InvoiceStatus,
    pub paid_amount: Option<i64>,
    pub paid_at: Option<DateTime<Utc>>,
    pub receipt: Option<String>,
}

impl Invoice {
    /// Outstanding total the payer must cover to clear the obligation.
    pub fn total_due(&self) -> i64 {
        self.amount + self.interest + self.penalty - self.discount
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Settled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transfer {
    pub id: String,
    pub owner_id: String,
    pub period: String,
    pub gross_amount: i64,
    pub fee: i64,
    pub net_amount: i64,
    pub status: TransferStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CreatedByRole {
    Admin,
    Tenant,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Waiting,
    Done,
}

/// Timestamped append-only log line shared by lease and ticket histories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MaintenanceTicket {
    pub id: String,
    pub lease_id: Option<String>,
    pub property_id: Option<String>,
    pub created_by: CreatedByRole,
    pub description: String,
    pub photos: Vec<String>,
    pub priority: TicketPriority,
    pub technician: Option<String>,
    pub status: TicketStatus,
    pub sla_days: i64,
    pub events: Vec<LogEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PickupStatus {
    Pending,
    PickedUp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MailRecord {
    pub id: String,
    pub property_id: String,
    pub unit_id: Option<String>,
    pub recipient: String,
    pub sender: String,
    pub photo: Option<String>,
    pub received_at: DateTime<Utc>,
    pub pickup_status: PickupStatus,
    pub picked_up_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NoticeGroup {
    General,
    Building,
    Unit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NoticeAudience {
    All,
    Tenants,
    Owners,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notice {
    pub id: String,
    pub title: String,
    pub body: String,
    pub groups: Vec<NoticeGroup>,
    pub audience: NoticeAudience,
    pub expiry: Option<DateTime<Utc>>,
    pub attachments: Vec<String>,
    /// Reader ids that confirmed reading; confirming twice is a no-op.
    pub read_by: Vec<String>,
    pub segment_detail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntitySet {
    pub properties: Vec<Property>,
    pub units: Vec<Unit>,
    pub owners: Vec<Owner>,
    pub tenants: Vec<Tenant>,
    pub leases: Vec<Lease>,
    pub invoices: Vec<Invoice>,
    pub transfers: Vec<Transfer>,
    pub tickets: Vec<MaintenanceTicket>,
    pub mail: Vec<MailRecord>,
    pub notices: Vec<Notice>,
}

impl EntitySet {
    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|entry| entry.id == id)
    }

    pub fn property_mut(&mut self, id: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|entry| entry.id == id)
    }

    pub fn owner(&self, id: &str) -> Option<&Owner> {
        self.owners.iter().find(|entry| entry.id == id)
    }

    pub fn tenant(&self, id: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|entry| entry.id == id)
    }

    pub fn lease(&self, id: &str) -> Option<&Lease> {
        self.leases.iter().find(|entry| entry.id == id)
    }

    pub fn lease_mut(&mut self, id: &str) -> Option<&mut Lease> {
        self.leases.iter_mut().find(|entry| entry.id == id)
    }

    pub fn invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|entry| entry.id == id)
    }

    pub fn invoice_mut(&mut self, id: &str) -> Option<&mut Invoice> {
        self.invoices.iter_mut().find(|entry| entry.id == id)
    }

    pub fn transfer_mut(&mut self, id: &str) -> Option<&mut Transfer> {
        self.transfers.iter_mut().find(|entry| entry.id == id)
    }

    pub fn ticket_mut(&mut self, id: &str) -> Option<&mut MaintenanceTicket> {
        self.tickets.iter_mut().find(|entry| entry.id == id)
    }

    pub fn mail_record_mut(&mut self, id: &str) -> Option<&mut MailRecord> {
        self.mail.iter_mut().find(|entry| entry.id == id)
    }

    pub fn notice_mut(&mut self, id: &str) -> Option<&mut Notice> {
        self.notices.iter_mut().find(|entry| entry.id == id)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioFlags {
    pub high_delinquency: bool,
    pub high_vacancy: bool,
    pub high_maintenance: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    HighDelinquency,
    HighVacancy,
    HighMaintenance,
}

impl ScenarioKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighDelinquency => "high_delinquency",
            Self::HighVacancy => "high_vacancy",
            Self::HighMaintenance => "high_maintenance",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "high_delinquency" => Some(Self::HighDelinquency),
            "high_vacancy" => Some(Self::HighVacancy),
            "high_maintenance" => Some(Self::HighMaintenance),
            _ => None,
        }
    }
}

impl ScenarioFlags {
    pub fn is_enabled(&self, kind: ScenarioKind) -> bool {
        match kind {
            ScenarioKind::HighDelinquency => self.high_delinquency,
            ScenarioKind::HighVacancy => self.high_vacancy,
            ScenarioKind::HighMaintenance => self.high_maintenance,
        }
    }

    pub fn toggle(&mut self, kind: ScenarioKind) {
        match kind {
            ScenarioKind::HighDelinquency => self.high_delinquency = !self.high_delinquency,
            ScenarioKind::HighVacancy => self.high_vacancy = !self.high_vacancy,
            ScenarioKind::HighMaintenance => self.high_maintenance = !self.high_maintenance,
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.high_delinquency || self.high_vacancy || self.high_maintenance
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Kpis {
    pub active_leases: usize,
    /// Occupied properties over total properties, 0..1.
    pub occupancy_rate: f64,
    /// 1 - received/expected for the latest competence period, 0..1.
    pub delinquency_rate: f64,
    pub due_within_7_days: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesPoint {
    pub period: String,
    pub month_label: String,
    pub expected: i64,
    pub received: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgingBucket {
    pub invoices: usize,
    pub amount: i64,
}

/// Overdue unpaid invoices bucketed by days elapsed since due date.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgingBuckets {
    pub current_30: AgingBucket,
    pub days_31_60: AgingBucket,
    pub days_61_90: AgingBucket,
    pub over_90: AgingBucket,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapPoint {
    pub id: String,
    pub label: String,
    pub lat: f64,
    pub lng: f64,
    pub status: OccupancyStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverdueRow {
    pub id: String,
    pub lease_code: String,
    pub tenant_name: String,
    pub period: String,
    pub amount: i64,
    pub days_late: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardAggregates {
    pub kpis: Kpis,
    pub delinquency_series: Vec<SeriesPoint>,
    pub aging: AgingBuckets,
    pub map_points: Vec<MapPoint>,
    pub overdue_invoices: Vec<OverdueRow>,
}

/// Full store state persisted as a single JSON document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedDocument {
    pub schema_version: String,
    pub config: DemoConfig,
    pub entities: EntitySet,
    pub scenarios: ScenarioFlags,
    pub lease_events: BTreeMap<String, Vec<LogEntry>>,
    pub current_tenant_id: Option<String>,
    pub current_owner_id: Option<String>,
    pub clock_tick: u64,
    pub id_counters: IdCounters,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdCounters {
    pub properties: u64,
    pub leases: u64,
    pub invoices: u64,
    pub transfers: u64,
    pub tickets: u64,
    pub mail: u64,
    pub notices: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Property,
    Owner,
    Tenant,
    Lease,
    Invoice,
    Transfer,
    Ticket,
    Mail,
    Notice,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Owner => "owner",
            Self::Tenant => "tenant",
            Self::Lease => "lease",
            Self::Invoice => "invoice",
            Self::Transfer => "transfer",
            Self::Ticket => "ticket",
            Self::Mail => "mail",
            Self::Notice => "notice",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The targeted id does not exist; the snapshot is left unchanged.
    NotFound { kind: EntityKind, id: String },
    /// The entity is in a terminal or conflicting state; the snapshot is left unchanged.
    InvalidState {
        kind: EntityKind,
        id: String,
        reason: String,
    },
    /// Malformed generation input, fatal at startup.
    Validation(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, id } => {
                write!(f, "{} not found: {id}", kind.as_str())
            }
            Self::InvalidState { kind, id, reason } => {
                write!(f, "invalid state for {} {id}: {reason}", kind.as_str())
            }
            Self::Validation(message) => write!(f, "validation error: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid_state(
        kind: EntityKind,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            kind,
            id: id.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    InvalidState,
    InvalidRequest,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

impl From<&StoreError> for ApiError {
    fn from(value: &StoreError) -> Self {
        let code = match value {
            StoreError::NotFound { .. } => ErrorCode::NotFound,
            StoreError::InvalidState { .. } => ErrorCode::InvalidState,
            StoreError::Validation(_) => ErrorCode::InvalidRequest,
        };
        ApiError::new(code, value.to_string(), None)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeStatus {
    Created,
    Sent,
    Signed,
}

impl EnvelopeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Sent => "sent",
            Self::Signed => "signed",
        }
    }
}

/// E-signature envelope as exchanged with the provider mock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignatureEnvelope {
    pub envelope_id: String,
    pub lease_id: String,
    pub status: EnvelopeStatus,
}

pub mod serde_u64_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u64>().map_err(D::Error::custom)
    }
}
