pub mod feed;
pub mod preferences;
pub mod trips;
