//! Session handling: position in the record sequence and the handlers that
//! turn user actions into new session values.

mod controller;
mod navigator;
mod state;

pub use controller::{AnnotationController, ItemView, SubmitOutcome};
pub use navigator::Navigator;
pub use state::SessionState;
