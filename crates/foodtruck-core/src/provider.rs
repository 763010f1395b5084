//! Seams to the two asynchronous collaborators: the vendor data provider and
//! the geocoding provider.

use std::future::Future;

use crate::geo::Coordinate;
use crate::vendor::RawVendorRecord;

/// Source of raw vendor records.
pub trait VendorSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the full vendor list. Records are unvalidated.
    fn fetch_vendors(
        &self,
    ) -> impl Future<Output = Result<Vec<RawVendorRecord>, Self::Error>> + Send;
}

/// Forward geocoder.
pub trait Geocoder: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve `address` to a point. `Ok(None)` means the provider answered
    /// but found nothing.
    fn geocode(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Option<Coordinate>, Self::Error>> + Send;
}
