pub mod api;
pub mod models;
pub mod time;

pub use models::{Account, Event, NewEvent, is_owner};
