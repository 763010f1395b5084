use foodtruck_core::{RawVendorRecord, VendorSource};
use reqwest::{Client, Url};

use crate::error::ClientError;
use crate::http::{build_http_client, check_status, parse_endpoint, redacted};
use crate::rate_limit::RetryPolicy;

/// HTTP client for the mobile food facility permit export.
///
/// The endpoint returns one JSON array of permit objects. Elements are kept
/// as [`RawVendorRecord`]s; validation happens later when the working set is
/// built. Transient errors (429, network failures) are retried with
/// exponential backoff.
pub struct VendorClient {
    client: Client,
    endpoint: Url,
    limit: Option<u32>,
    retry: RetryPolicy,
}

impl VendorClient {
    /// Creates a `VendorClient` for `data_url`.
    ///
    /// `limit`, when set, is sent as the Socrata `$limit` parameter.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidEndpoint`] if `data_url` is not an http(s) URL.
    /// - [`ClientError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        data_url: &str,
        limit: Option<u32>,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_http_client(timeout_secs, user_agent)?,
            endpoint: parse_endpoint(data_url)?,
            limit,
            retry: RetryPolicy::new(max_retries, backoff_base_secs),
        })
    }

    fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(limit) = self.limit {
            url.query_pairs_mut()
                .append_pair("$limit", &limit.to_string());
        }
        url
    }

    /// Fetches the complete vendor list.
    ///
    /// Non-object array elements become empty records, which fail
    /// validation downstream instead of failing the whole fetch.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RateLimited`] / [`ClientError::Http`] after retries are exhausted.
    /// - [`ClientError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`ClientError::Deserialize`] if the body is not a JSON array.
    pub async fn fetch_all(&self) -> Result<Vec<RawVendorRecord>, ClientError> {
        let url = self.request_url();

        let records = self.retry.run(|| {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                let response = check_status(response, &url)?;
                let body = response.text().await?;
                let items = serde_json::from_str::<Vec<serde_json::Value>>(&body).map_err(
                    |source| ClientError::Deserialize {
                        context: format!("vendor list from {}", redacted(&url)),
                        source,
                    },
                )?;
                Ok(items
                    .into_iter()
                    .map(RawVendorRecord::from_value)
                    .collect::<Vec<_>>())
            }
        })
        .await?;

        tracing::info!(
            endpoint = %redacted(&url),
            records = records.len(),
            "fetched vendor records"
        );
        Ok(records)
    }
}

impl VendorSource for VendorClient {
    type Error = ClientError;

    async fn fetch_vendors(&self) -> Result<Vec<RawVendorRecord>, ClientError> {
        self.fetch_all().await
    }
}
