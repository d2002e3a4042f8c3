use tracing::info;

use crate::{error::Outcome, models::trip_group::TripGroup, state::Logbook};

/// Removes a seance: the outward leg, then every return leg paired with it.
///
/// Returns that grouping leaves out (prepared, running or cancelled) go too, so
/// no return row outlives its outward leg. All rows go in one transaction, so a
/// failure leaves the group intact.
pub async fn delete_trip_group(logbook: &Logbook, group: &TripGroup) -> Outcome<()> {
    let mut trips: Vec<_> = group.trips().cloned().collect();
    let outward_id = group.outward.id;
    let paired = logbook
        .trips
        .list_all()
        .await?
        .into_iter()
        .filter(|t| t.is_return && t.paired_trip_id == Some(outward_id));
    for trip in paired {
        if !trips.iter().any(|t| t.id == trip.id) {
            trips.push(trip);
        }
    }
    logbook.trips.delete_all(&trips).await?;

    if let Some(ongoing) = logbook.preferences.ongoing_session_id().await? {
        if trips.iter().any(|t| t.id == ongoing) {
            logbook.preferences.clear_ongoing_session_id().await?;
        }
    }
    info!(
        "seance {} deleted ({} trips)",
        group.seance_number,
        trips.len()
    );
    Ok(())
}
