//! Live vendor search: a debounced, cancellable search session that turns
//! query, radius and address input into published result snapshots.

pub mod error;
pub mod session;
pub mod snapshot;

pub use error::GeocodeFailure;
pub use session::{AddressOutcome, SearchSession, SessionConfig};
pub use snapshot::{ResultStatus, SearchSnapshot};
