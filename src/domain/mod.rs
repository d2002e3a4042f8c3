pub mod grouping;
pub mod state_deriver;
pub mod summary;
pub mod validator;

pub use grouping::group_trips;
pub use state_deriver::derive_driving_state;
pub use summary::{summarize, LogbookSummary};
pub use validator::{StandardValidator, TripValidator, Validation};
