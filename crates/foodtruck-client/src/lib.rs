//! HTTP providers for the food truck finder: the open-data vendor feed and
//! the forward geocoder.

pub mod error;
pub mod geocode;
mod http;
mod rate_limit;
pub mod vendors;

pub use error::ClientError;
pub use geocode::GeocodeClient;
pub use vendors::VendorClient;
