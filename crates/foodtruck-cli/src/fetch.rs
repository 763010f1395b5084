//! Vendor data loading for the CLI.
//!
//! A failed fetch is a notice, not a fatal error, for the interactive
//! commands: they continue with an empty working set.

use foodtruck_client::VendorClient;
use foodtruck_core::{AppConfig, ValidationReport, VendorSource, WorkingSet};

fn vendor_client(config: &AppConfig) -> anyhow::Result<VendorClient> {
    VendorClient::new(
        &config.data_url,
        config.data_limit,
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build vendor client: {e}"))
}

/// Fetches and validates the vendor list.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the fetch fails after
/// retries.
pub(crate) async fn load_working_set(
    config: &AppConfig,
) -> anyhow::Result<(WorkingSet, ValidationReport)> {
    let client = vendor_client(config)?;
    let records = client.fetch_vendors().await?;
    let (set, report) = WorkingSet::from_records(&records, &config.bounding_box);
    tracing::info!(
        accepted = report.accepted,
        skipped = report.skipped,
        duplicates = report.duplicates,
        "vendor records validated"
    );
    Ok((set, report))
}

/// Like [`load_working_set`], but reports a failure and falls back to an
/// empty set.
pub(crate) async fn load_or_empty(config: &AppConfig) -> WorkingSet {
    match load_working_set(config).await {
        Ok((set, _)) => set,
        Err(e) => {
            tracing::warn!(error = %e, "vendor fetch failed");
            eprintln!("notice: vendor data is unavailable ({e}); continuing with no vendors");
            WorkingSet::empty()
        }
    }
}

pub(crate) async fn run_fetch(config: &AppConfig) -> anyhow::Result<()> {
    let (set, report) = load_working_set(config).await?;
    println!(
        "fetched {} vendors at {} ({} skipped, {} duplicates)",
        report.accepted,
        set.fetched_at().to_rfc3339(),
        report.skipped,
        report.duplicates
    );
    Ok(())
}
