use std::sync::Arc;

use logbook::clock::SystemClock;
use logbook::config::AppConfig;
use logbook::error::AppError;
use logbook::state::Logbook;
use logbook::usecases::session::resume_ongoing_session;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let logbook = Logbook::open(&config, Arc::new(SystemClock)).await?;

    let feed = logbook.feed();
    info!("driving state: {}", feed.driving_state());

    match resume_ongoing_session(&logbook).await {
        Ok(Some(trip)) => info!(
            "ongoing session: trip {} from {} ({})",
            trip.id, trip.start_place, trip.status
        ),
        Ok(None) => info!("no ongoing session"),
        Err(err) => warn!("could not resume ongoing session: {}", err.message()),
    }

    let settings = logbook.preferences.settings().await?;
    let summary = feed.summary();
    info!(
        "{} seances, {} km in total ({} km outward, {} km return)",
        summary.seance_count, summary.total_km, summary.outward_km, summary.return_km
    );
    if let Some(latest) = feed.groups().first() {
        info!(
            "latest seance #{} on {}: {} km",
            latest.seance_number,
            settings.date_format.format(latest.outward.date),
            latest.total_kms()
        );
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,logbook=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
