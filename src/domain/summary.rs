use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::trip_group::TripGroup;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogbookSummary {
    pub seance_count: usize,
    pub total_km: i64,
    pub outward_km: i64,
    pub return_km: i64,
    /// Distance per guide id, taken from the outward leg of each seance.
    pub km_by_guide: BTreeMap<String, i64>,
}

pub fn summarize(groups: &[TripGroup]) -> LogbookSummary {
    let mut summary = LogbookSummary {
        seance_count: groups.len(),
        ..LogbookSummary::default()
    };
    for group in groups {
        let outward = i64::from(group.outward.distance_km());
        let back = group
            .return_trip
            .as_ref()
            .map_or(0, |trip| i64::from(trip.distance_km()));
        summary.outward_km += outward;
        summary.return_km += back;
        summary.total_km += outward + back;
        *summary
            .km_by_guide
            .entry(group.outward.guide.clone())
            .or_insert(0) += outward + back;
    }
    summary
}
