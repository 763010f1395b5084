//! Plain-text rendering of search snapshots.

use foodtruck_core::Vendor;
use foodtruck_search::{ResultStatus, SearchSnapshot};

fn result_line(position: usize, vendor: &Vendor, with_marker: bool) -> String {
    let address = vendor.address.as_deref().unwrap_or("address unknown");
    let mut line = format!("{position}. {} — {address}", vendor.name);
    if let Some(distance) = vendor.distance {
        line.push_str(&format!(" ({distance:.2} mi)"));
    }
    if with_marker {
        line.push_str(&format!(
            " @ {:.5}, {:.5}",
            vendor.latitude, vendor.longitude
        ));
    }
    line
}

fn numbered(snapshot: &SearchSnapshot, lines: &mut Vec<String>) {
    lines.extend(
        snapshot
            .vendors
            .iter()
            .enumerate()
            .map(|(i, v)| result_line(i + 1, v, snapshot.show_all)),
    );
}

/// Renders the result list for `snapshot`, one line per entry, each ending
/// in a newline.
pub(crate) fn render_results(snapshot: &SearchSnapshot) -> String {
    let mut lines = Vec::new();
    match &snapshot.status {
        ResultStatus::NoQuery => {
            lines.push(format!(
                "{} vendors available; search by name, food or address",
                snapshot.vendors.len()
            ));
            if snapshot.show_all {
                numbered(snapshot, &mut lines);
            }
        }
        ResultStatus::NoMatches => lines.push("No Results".to_owned()),
        ResultStatus::Matches => numbered(snapshot, &mut lines),
        ResultStatus::SearchFailed { reason } => {
            lines.push(format!("Search failed: {reason}"));
            numbered(snapshot, &mut lines);
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Detail view for a selected vendor.
pub(crate) fn render_detail(vendor: &Vendor) -> String {
    let permit = vendor.permit.as_deref().unwrap_or("n/a");
    let status = vendor.status.as_deref().unwrap_or("unknown status");
    let facility = vendor.facility_type.as_deref().unwrap_or("Vendor");
    let address = vendor.address.as_deref().unwrap_or("address unknown");

    format!(
        "{}\nPermit({permit}): {status}\n{facility} at: {address}\nFood - {}\n",
        vendor.name,
        vendor.food_items().join(", ")
    )
}
