//! Scenario modulation. Demo presenters can flip narrative toggles that skew
//! the computed aggregates without touching the underlying entity set, so
//! disabling a scenario restores the base numbers exactly.

use contracts::{DashboardAggregates, OccupancyStatus, ScenarioFlags};

/// Applies the enabled scenario transforms to `base`, always in the same
/// order: delinquency, then vacancy, then maintenance. Each transform is a
/// pure function of the aggregate snapshot.
pub fn apply(flags: ScenarioFlags, base: DashboardAggregates) -> DashboardAggregates {
    let mut aggregates = base;
    if flags.high_delinquency {
        aggregates = high_delinquency(aggregates);
    }
    if flags.high_vacancy {
        aggregates = high_vacancy(aggregates);
    }
    if flags.high_maintenance {
        aggregates = high_maintenance(aggregates);
    }
    aggregates
}

/// Depresses collections: older periods collect 76% of expected, recent ones
/// 82%, and the headline delinquency rate is pinned at 18%.
fn high_delinquency(mut aggregates: DashboardAggregates) -> DashboardAggregates {
    for (idx, point) in aggregates.delinquency_series.iter_mut().enumerate() {
        let factor = if idx < 6 { 0.76 } else { 0.82 };
        point.received = (point.expected as f64 * factor).round() as i64;
    }
    aggregates.kpis.delinquency_rate = 0.18;
    aggregates
}

/// Empties every other property on the map and pins occupancy at 78%.
fn high_vacancy(mut aggregates: DashboardAggregates) -> DashboardAggregates {
    aggregates.kpis.occupancy_rate = 0.78;
    for (idx, point) in aggregates.map_points.iter_mut().enumerate() {
        if idx % 2 == 0 {
            point.status = OccupancyStatus::Vacant;
        }
    }
    aggregates
}

/// Pushes a third of the map into maintenance and inflates the due-soon KPI.
fn high_maintenance(mut aggregates: DashboardAggregates) -> DashboardAggregates {
    aggregates.kpis.due_within_7_days += 6;
    for (idx, point) in aggregates.map_points.iter_mut().enumerate() {
        if idx % 3 == 0 {
            point.status = OccupancyStatus::UnderMaintenance;
        }
    }
    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate, gen};
    use contracts::{DemoConfig, ScenarioKind};

    fn base() -> DashboardAggregates {
        let config = DemoConfig::default();
        let entities = gen::generate(&config).expect("dataset generates");
        aggregate::compute(&entities, config.reference_date)
    }

    #[test]
    fn no_flags_is_identity() {
        let aggregates = base();
        assert_eq!(apply(ScenarioFlags::default(), aggregates.clone()), aggregates);
    }

    #[test]
    fn delinquency_scenario_depresses_collections() {
        let mut flags = ScenarioFlags::default();
        flags.toggle(ScenarioKind::HighDelinquency);
        let skewed = apply(flags, base());
        assert_eq!(skewed.kpis.delinquency_rate, 0.18);
        for (idx, point) in skewed.delinquency_series.iter().enumerate() {
            let factor = if idx < 6 { 0.76 } else { 0.82 };
            assert_eq!(point.received, (point.expected as f64 * factor).round() as i64);
        }
    }

    #[test]
    fn vacancy_scenario_empties_alternating_map_points() {
        let mut flags = ScenarioFlags::default();
        flags.toggle(ScenarioKind::HighVacancy);
        let skewed = apply(flags, base());
        assert_eq!(skewed.kpis.occupancy_rate, 0.78);
        for point in skewed.map_points.iter().step_by(2) {
            assert_eq!(point.status, OccupancyStatus::Vacant);
        }
    }

    #[test]
    fn maintenance_overrides_vacancy_on_shared_points() {
        let mut flags = ScenarioFlags::default();
        flags.toggle(ScenarioKind::HighVacancy);
        flags.toggle(ScenarioKind::HighMaintenance);
        let untouched = base();
        let skewed = apply(flags, untouched.clone());
        assert_eq!(
            skewed.kpis.due_within_7_days,
            untouched.kpis.due_within_7_days + 6
        );
        // Index 0 is hit by both transforms; maintenance runs last and wins.
        assert_eq!(skewed.map_points[0].status, OccupancyStatus::UnderMaintenance);
        assert_eq!(skewed.map_points[2].status, OccupancyStatus::Vacant);
    }

    #[test]
    fn disabling_a_flag_restores_base_numbers() {
        let untouched = base();
        let mut flags = ScenarioFlags::default();
        flags.toggle(ScenarioKind::HighDelinquency);
        flags.toggle(ScenarioKind::HighDelinquency);
        assert_eq!(apply(flags, untouched.clone()), untouched);
    }
}
