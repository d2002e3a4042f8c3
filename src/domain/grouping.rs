use std::collections::HashSet;

use crate::models::{
    trip::{Trip, TripId, TripStatus},
    trip_group::TripGroup,
};

/// Pairs finished outward legs with their return legs into numbered seances.
///
/// Only completed or skipped trips take part. Seance numbers follow the
/// chronological order of the outward legs (oldest is 1), while the returned
/// list is newest first.
pub fn group_trips(trips: &[Trip]) -> Vec<TripGroup> {
    let mut reportable: Vec<&Trip> = trips
        .iter()
        .filter(|t| matches!(t.status, TripStatus::Completed | TripStatus::Skipped))
        .collect();
    // Ties on start time fall back to creation order.
    reportable.sort_by_key(|t| (t.start_time, t.id));

    let mut consumed: HashSet<TripId> = HashSet::new();
    let mut groups = Vec::new();
    let mut seance_number = 0;

    for outward in reportable.iter().filter(|t| !t.is_return) {
        if consumed.contains(&outward.id) {
            continue;
        }
        let return_trip = reportable
            .iter()
            .find(|t| t.is_return && t.paired_trip_id == Some(outward.id))
            .map(|t| (*t).clone());

        consumed.insert(outward.id);
        if let Some(ret) = &return_trip {
            consumed.insert(ret.id);
        }

        seance_number += 1;
        groups.push(TripGroup {
            outward: (*outward).clone(),
            return_trip,
            seance_number,
        });
    }

    groups.reverse();
    groups
}
