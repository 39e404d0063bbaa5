//! Trip parameters supplied by a caller, with defaults resolved against an
//! injected calendar date.

use chrono::{Days, NaiveDate};
use serde::Deserialize;

pub const DEFAULT_ORIGIN: &str = "MAN";
pub const DEFAULT_DESTINATION: &str = "LIS";
/// Days between the default depart date and the default return date.
pub const DEFAULT_STAY_DAYS: u64 = 7;

/// Raw search parameters as they arrive on the query string.
///
/// Every field is optional; an empty value is treated the same as a missing one.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub depart: Option<String>,
    pub ret: Option<String>,
}

impl SearchParams {
    /// Builds parameters from decoded query pairs.
    ///
    /// The first occurrence of a key wins and unknown keys are ignored, so a
    /// repeated or stray parameter never rejects the request.
    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "origin" => &mut params.origin,
                "destination" => &mut params.destination,
                "depart" => &mut params.depart,
                "ret" => &mut params.ret,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

/// A resolved round-trip search.
///
/// Airport codes are uppercased but otherwise unchecked. Dates are kept as the
/// caller's ISO strings so they can be echoed verbatim into fallback links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripQuery {
    pub origin: String,
    pub destination: String,
    pub depart: String,
    pub return_date: String,
}

impl TripQuery {
    /// Fills missing parameters with defaults: `MAN` → `LIS`, departing
    /// `today` and returning [`DEFAULT_STAY_DAYS`] later.
    #[must_use]
    pub fn resolve(params: SearchParams, today: NaiveDate) -> Self {
        let origin = non_empty(params.origin).unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let destination =
            non_empty(params.destination).unwrap_or_else(|| DEFAULT_DESTINATION.to_string());
        let depart = non_empty(params.depart).unwrap_or_else(|| iso_date(today));
        let return_date = non_empty(params.ret).unwrap_or_else(|| {
            let back = today
                .checked_add_days(Days::new(DEFAULT_STAY_DAYS))
                .unwrap_or(today);
            iso_date(back)
        });

        Self {
            origin: origin.to_uppercase(),
            destination: destination.to_uppercase(),
            depart,
            return_date,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
