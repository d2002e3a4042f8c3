pub mod driving_state;
pub mod settings;
pub mod trip;
pub mod trip_group;
