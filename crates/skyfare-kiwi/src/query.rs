//! Mapping from a [`TripQuery`] to the Kiwi `/flights` query string.

use chrono::{DateTime, NaiveDate, Utc};
use skyfare_core::TripQuery;

/// Currency requested from upstream and assumed when a response omits one.
pub const UPSTREAM_CURRENCY: &str = "GBP";
pub const RESULT_LIMIT: u32 = 20;
pub const MAX_STOPOVERS: u32 = 2;

/// Reformats an ISO calendar date (`YYYY-MM-DD`, or a full RFC 3339
/// timestamp) into the `DD/MM/YYYY` form the upstream expects.
///
/// Timestamps are converted to UTC before the calendar fields are read.
/// Anything unparseable is returned unchanged and left for upstream to
/// reject, so applying the function twice gives the same result as once.
#[must_use]
pub fn kiwi_date(iso: &str) -> String {
    let trimmed = iso.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    });

    match date {
        Some(d) => d.format("%d/%m/%Y").to_string(),
        None => iso.to_string(),
    }
}

/// Builds the upstream query parameters for a round-trip search.
///
/// Depart and return each become a single-day window (`dateFrom == dateTo`,
/// `return_from == return_to`). Passenger count, currency, sort order, page
/// size, trip type and stopover ceiling are fixed.
#[must_use]
pub fn search_params(trip: &TripQuery, partner: &str) -> Vec<(&'static str, String)> {
    let depart = kiwi_date(&trip.depart);
    let back = kiwi_date(&trip.return_date);

    vec![
        ("partner", partner.to_string()),
        ("fly_from", trip.origin.clone()),
        ("to", trip.destination.clone()),
        ("dateFrom", depart.clone()),
        ("dateTo", depart),
        ("return_from", back.clone()),
        ("return_to", back),
        ("adults", "1".to_string()),
        ("curr", UPSTREAM_CURRENCY.to_string()),
        ("sort", "price".to_string()),
        ("limit", RESULT_LIMIT.to_string()),
        ("flight_type", "round".to_string()),
        ("one_for_city", "0".to_string()),
        ("one_per_date", "0".to_string()),
        ("max_stopovers", MAX_STOPOVERS.to_string()),
    ]
}
