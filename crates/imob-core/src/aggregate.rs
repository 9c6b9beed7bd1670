//! Pure dashboard aggregation over an entity set. No mutation, no clock
//! access: callers pass the observation instant explicitly.

use chrono::{DateTime, Utc};
use contracts::{
    AgingBucket, AgingBuckets, DashboardAggregates, EntitySet, InvoiceStatus, Kpis, LeaseStatus,
    MapPoint, OccupancyStatus, OverdueRow, SeriesPoint,
};

use crate::periods::month_label;

/// Series covers the latest periods only, most recent last.
const SERIES_LEN: usize = 10;

/// The map and the overdue table are capped so a large dataset stays
/// renderable.
const MAP_POINT_CAP: usize = 200;
const OVERDUE_ROW_CAP: usize = 50;

/// Computes every dashboard aggregate from the raw entity set as observed at
/// `now`.
pub fn compute(entities: &EntitySet, now: DateTime<Utc>) -> DashboardAggregates {
    let series = delinquency_series(entities);
    DashboardAggregates {
        kpis: kpis(entities, &series, now),
        aging: aging_buckets(entities, now),
        map_points: map_points(entities),
        overdue_invoices: overdue_rows(entities, now),
        delinquency_series: series,
    }
}

fn delinquency_series(entities: &EntitySet) -> Vec<SeriesPoint> {
    let mut periods: Vec<&str> = entities
        .invoices
        .iter()
        .map(|invoice| invoice.period.as_str())
        .collect();
    periods.sort_unstable();
    periods.dedup();
    let skip = periods.len().saturating_sub(SERIES_LEN);

    periods
        .into_iter()
        .skip(skip)
        .map(|period| {
            let mut expected = 0;
            let mut received = 0;
            for invoice in entities.invoices.iter().filter(|i| i.period == period) {
                expected += invoice.amount;
                if invoice.status == InvoiceStatus::Paid {
                    received += invoice.paid_amount.unwrap_or(invoice.amount);
                }
            }
            SeriesPoint {
                period: period.to_string(),
                month_label: month_label(period),
                expected,
                received,
            }
        })
        .collect()
}

fn kpis(entities: &EntitySet, series: &[SeriesPoint], now: DateTime<Utc>) -> Kpis {
    let active_leases = entities
        .leases
        .iter()
        .filter(|lease| lease.status == LeaseStatus::Active)
        .count();

    let occupancy_rate = if entities.properties.is_empty() {
        0.0
    } else {
        let occupied = entities
            .properties
            .iter()
            .filter(|property| property.occupancy == OccupancyStatus::Occupied)
            .count();
        occupied as f64 / entities.properties.len() as f64
    };

    let delinquency_rate = series
        .last()
        .filter(|point| point.expected > 0)
        .map(|point| 1.0 - point.received as f64 / point.expected as f64)
        .unwrap_or(0.0);

    let today = now.date_naive();
    let horizon = today + chrono::Duration::days(7);
    // Due-soon counts open invoices only; overdue ones are already tracked
    // by the aging buckets.
    let due_within_7_days = entities
        .invoices
        .iter()
        .filter(|invoice| {
            invoice.status == InvoiceStatus::Open
                && invoice.due_date >= today
                && invoice.due_date <= horizon
        })
        .count();

    Kpis {
        active_leases,
        occupancy_rate,
        delinquency_rate,
        due_within_7_days,
    }
}

fn aging_buckets(entities: &EntitySet, now: DateTime<Utc>) -> AgingBuckets {
    let today = now.date_naive();
    let mut buckets = AgingBuckets::default();
    for invoice in &entities.invoices {
        if invoice.status != InvoiceStatus::Overdue {
            continue;
        }
        let days_late = (today - invoice.due_date).num_days().max(0);
        let bucket = match days_late {
            0..=30 => &mut buckets.current_30,
            31..=60 => &mut buckets.days_31_60,
            61..=90 => &mut buckets.days_61_90,
            _ => &mut buckets.over_90,
        };
        add_to_bucket(bucket, invoice.total_due());
    }
    buckets
}

fn add_to_bucket(bucket: &mut AgingBucket, amount: i64) {
    bucket.invoices += 1;
    bucket.amount += amount;
}

fn map_points(entities: &EntitySet) -> Vec<MapPoint> {
    entities
        .properties
        .iter()
        .take(MAP_POINT_CAP)
        .map(|property| MapPoint {
            id: property.id.clone(),
            label: format!("{} {}", property.kind.as_str().to_uppercase(), property.code),
            lat: property.geo.lat,
            lng: property.geo.lng,
            status: property.occupancy,
        })
        .collect()
}

fn overdue_rows(entities: &EntitySet, now: DateTime<Utc>) -> Vec<OverdueRow> {
    let today = now.date_naive();
    entities
        .invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Overdue)
        .take(OVERDUE_ROW_CAP)
        .map(|invoice| {
            let lease = entities.lease(&invoice.lease_id);
            let tenant_name = lease
                .and_then(|lease| entities.tenant(&lease.tenant_id))
                .map(|tenant| tenant.name.clone())
                .unwrap_or_else(|| "—".to_string());
            OverdueRow {
                id: invoice.id.clone(),
                lease_code: invoice.lease_id.to_uppercase(),
                tenant_name,
                period: invoice.period.clone(),
                amount: invoice.total_due(),
                days_late: (today - invoice.due_date).num_days().max(0),
            }
        })
        .collect()
}
