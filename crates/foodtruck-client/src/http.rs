use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};

use crate::error::ClientError;

/// Builds the shared `reqwest::Client` used by both providers.
pub(crate) fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ClientError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses `raw` as an absolute http(s) URL.
pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw.trim()).map_err(|e| ClientError::InvalidEndpoint {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::InvalidEndpoint {
            url: raw.to_owned(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Scheme, host and path of `url`. Query strings can carry access tokens
/// and never reach error messages or logs.
pub(crate) fn redacted(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

/// Maps non-2xx responses to typed errors and passes successes through.
pub(crate) fn check_status(response: Response, url: &Url) -> Result<Response, ClientError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(0);
        return Err(ClientError::RateLimited {
            host: url.host_str().unwrap_or_default().to_owned(),
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(ClientError::UnexpectedStatus {
            status: status.as_u16(),
            endpoint: redacted(url),
        });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_endpoint_rejects_garbage() {
        let err = parse_endpoint("not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidEndpoint { .. }));
    }

    #[test]
    fn parse_endpoint_rejects_non_http_scheme() {
        let err = parse_endpoint("ftp://data.example.org/x.json").unwrap_err();
        assert!(
            matches!(err, ClientError::InvalidEndpoint { ref reason, .. } if reason.contains("ftp"))
        );
    }

    #[test]
    fn redacted_drops_query_string() {
        let url = Url::parse("https://api.example.com/geocode/x.json?access_token=pk.secret")
            .unwrap();
        assert_eq!(redacted(&url), "https://api.example.com/geocode/x.json");
    }
}
