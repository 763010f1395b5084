use foodtruck_client::GeocodeClient;
use foodtruck_core::AppConfig;
use foodtruck_search::{AddressOutcome, SearchSession, SessionConfig};

use crate::{fetch, render};

#[derive(Debug, Default)]
pub(crate) struct SearchRequest<'a> {
    pub(crate) text: Option<&'a str>,
    pub(crate) address: Option<&'a str>,
    pub(crate) radius: Option<f64>,
    pub(crate) show_all: bool,
    pub(crate) json: bool,
}

/// Builds the geocoder from configuration.
///
/// # Errors
///
/// Returns an error if no geocoder token is configured or the client cannot
/// be built.
pub(crate) fn geocode_client(config: &AppConfig) -> anyhow::Result<GeocodeClient> {
    let token = config.require_geocoder_token()?;
    GeocodeClient::new(
        &config.geocoder_url,
        token,
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build geocode client: {e}"))
}

/// Runs one search to completion and prints the snapshot.
///
/// A failed address lookup is printed as a failed search, not returned as
/// an error.
pub(crate) async fn run_search(config: &AppConfig, request: &SearchRequest<'_>) -> anyhow::Result<()> {
    let geocoder = request
        .address
        .map(|_| geocode_client(config))
        .transpose()?;

    let session = SearchSession::new(SessionConfig::from_app_config(config));
    session.replace_working_set(fetch::load_or_empty(config).await);

    if let Some(radius) = request.radius {
        session.set_radius(radius);
    }
    if let Some(text) = request.text {
        session.set_query(text);
    }
    if let (Some(address), Some(geocoder)) = (request.address, geocoder.as_ref()) {
        match session.submit_address(geocoder, address).await {
            Ok(AddressOutcome::OutOfRegion(point)) => {
                tracing::info!(?point, "address is outside the service area");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "address search failed"),
        }
    }
    session.flush();
    if request.show_all {
        session.toggle_show_all();
    }

    let snapshot = session.snapshot();
    if request.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render::render_results(&snapshot));
    }
    Ok(())
}
