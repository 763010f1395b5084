//! Forward geocoding against the Mapbox places API.

use foodtruck_core::{Coordinate, Geocoder};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ClientError;
use crate::http::{build_http_client, check_status, parse_endpoint, redacted};
use crate::rate_limit::RetryPolicy;

/// Characters left unescaped in the query path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Vec<PlaceFeature>,
}

#[derive(Debug, Deserialize)]
struct PlaceFeature {
    /// `[longitude, latitude]`.
    center: Option<[f64; 2]>,
}

pub struct GeocodeClient {
    client: Client,
    base: Url,
    token: String,
    retry: RetryPolicy,
}

impl GeocodeClient {
    /// # Errors
    ///
    /// - [`ClientError::InvalidEndpoint`] if `base_url` is not an http(s) URL.
    /// - [`ClientError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        token: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_http_client(timeout_secs, user_agent)?,
            base: parse_endpoint(base_url)?,
            token: token.to_owned(),
            retry: RetryPolicy::new(max_retries, backoff_base_secs),
        })
    }

    fn request_url(&self, address: &str) -> Result<Url, ClientError> {
        let encoded = utf8_percent_encode(address, SEGMENT).to_string();
        let root = self.base.as_str().trim_end_matches('/');
        let raw = format!("{root}/geocoding/v5/mapbox.places/{encoded}.json");
        let mut url = parse_endpoint(&raw)?;
        url.query_pairs_mut()
            .append_pair("access_token", &self.token)
            .append_pair("limit", "1");
        Ok(url)
    }

    /// Resolves `address` to its best-ranked point.
    ///
    /// Returns `Ok(None)` for a blank address (no request is made) and when
    /// the provider has no matching feature.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RateLimited`] / [`ClientError::Http`] after retries are exhausted.
    /// - [`ClientError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`ClientError::Deserialize`] if the body does not match the places shape.
    pub async fn lookup(&self, address: &str) -> Result<Option<Coordinate>, ClientError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }
        let url = self.request_url(address)?;

        let response = self.retry.run(|| {
            let url = url.clone();
            async move {
                // reqwest errors embed the URL, which carries the token.
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(reqwest::Error::without_url)?;
                let response = check_status(response, &url)?;
                let body = response.text().await.map_err(reqwest::Error::without_url)?;
                serde_json::from_str::<PlacesResponse>(&body).map_err(|source| {
                    ClientError::Deserialize {
                        context: format!("geocode response from {}", redacted(&url)),
                        source,
                    }
                })
            }
        })
        .await?;

        let point = response
            .features
            .into_iter()
            .next()
            .and_then(|f| f.center)
            .map(|[lon, lat]| Coordinate::new(lat, lon))
            .filter(Coordinate::is_finite);

        tracing::debug!(address, found = point.is_some(), "geocoded address");
        Ok(point)
    }
}

impl Geocoder for GeocodeClient {
    type Error = ClientError;

    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ClientError> {
        self.lookup(address).await
    }
}
