use tracing::debug;

use crate::{error::Outcome, models::trip::Trip, state::Logbook};

/// Trip the ongoing session marker points at, if it is still in play.
///
/// A marker left pointing at a deleted or terminal trip is cleared.
pub async fn resume_ongoing_session(logbook: &Logbook) -> Outcome<Option<Trip>> {
    let Some(id) = logbook.preferences.ongoing_session_id().await? else {
        return Ok(None);
    };
    match logbook.trips.get_by_id(id).await? {
        Some(trip) if !trip.is_terminal() => Ok(Some(trip)),
        _ => {
            debug!("clearing stale ongoing session marker {id}");
            logbook.preferences.clear_ongoing_session_id().await?;
            Ok(None)
        }
    }
}
