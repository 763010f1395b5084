use std::time::Duration;

use thiserror::Error;

/// Why an address search produced no reference point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeFailure {
    #[error("no location found for \"{0}\"")]
    NotFound(String),

    #[error("geocoding provider error: {0}")]
    Provider(String),

    #[error("geocoding timed out after {0:?}")]
    TimedOut(Duration),
}
