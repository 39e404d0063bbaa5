//! Borrowed views over the Kiwi `/flights` response.
//!
//! ## Observed shape
//!
//! ```json
//! { "currency": "GBP", "data": [ { "price": 87, "deep_link": "...",
//!   "duration": { "total": 9300 }, "route": [ { "airline": "FR", ... } ] } ] }
//! ```
//!
//! The payload is not contractually stable. Older responses spell leg times
//! `dTimeUTC`/`aTimeUTC` where newer ones use `utc_departure`/`utc_arrival`,
//! flight numbers show up as `flight_no` or `flightNo` (string or number), and
//! `duration` is sometimes a flat number of seconds instead of an object.
//! Each logical value therefore has a [`FieldNames`] table listing the
//! spellings in priority order.
//!
//! Nothing here fails: accessors return `Option` and the normalizer decides
//! the defaults.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Ordered spellings of one logical upstream field.
///
/// Lookup walks the names in order and skips values that are absent or
/// "falsy" (`null`, `false`, `0`, `""`), so a zeroed `utc_departure` still
/// falls through to `dTimeUTC`.
#[derive(Debug, Clone, Copy)]
pub struct FieldNames(pub &'static [&'static str]);

pub const DEEP_LINK: FieldNames = FieldNames(&["deep_link", "deepLink", "link"]);
pub const FLIGHT_NO: FieldNames = FieldNames(&["flight_no", "flightNo"]);
pub const DEPARTURE: FieldNames = FieldNames(&["utc_departure", "dTimeUTC"]);
pub const ARRIVAL: FieldNames = FieldNames(&["utc_arrival", "aTimeUTC"]);

impl FieldNames {
    /// First truthy value among the variants.
    #[cfg(test)]
    #[must_use]
    pub fn resolve<'a>(&self, object: &'a Value) -> Option<&'a Value> {
        self.resolve_with(object, Some)
    }

    /// First truthy value among the variants that `convert` accepts.
    pub fn resolve_with<'a, T>(
        &self,
        object: &'a Value,
        convert: impl Fn(&'a Value) -> Option<T>,
    ) -> Option<T> {
        self.0
            .iter()
            .filter_map(|name| object.get(name))
            .filter(|value| is_truthy(value))
            .find_map(convert)
    }
}

#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads a JSON number, or a string holding one.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Epoch seconds (number or numeric string), or an RFC 3339 string.
#[allow(clippy::cast_possible_truncation)]
fn as_instant(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(secs) = as_number(value) {
        return DateTime::from_timestamp_millis((secs * 1000.0).round() as i64);
    }
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Top-level search payload: `{ "data": [...], "currency": "GBP" }`.
#[derive(Debug, Clone, Copy)]
pub struct UpstreamPayload<'a>(&'a Value);

impl<'a> UpstreamPayload<'a> {
    #[must_use]
    pub fn new(body: &'a Value) -> Self {
        Self(body)
    }

    #[must_use]
    pub fn currency(&self) -> Option<&'a str> {
        self.0.get("currency").and_then(as_non_empty_str)
    }

    /// Offers in upstream order. A missing or non-array `data` yields nothing.
    pub fn offers(&self) -> impl Iterator<Item = UpstreamOffer<'a>> {
        let body: &'a Value = self.0;
        body.get("data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(UpstreamOffer)
    }
}

/// One itinerary from `data[]`.
#[derive(Debug, Clone, Copy)]
pub struct UpstreamOffer<'a>(&'a Value);

impl<'a> UpstreamOffer<'a> {
    #[cfg(test)]
    #[must_use]
    pub fn new(offer: &'a Value) -> Self {
        Self(offer)
    }

    #[must_use]
    pub fn price(&self) -> Option<f64> {
        self.0.get("price").and_then(as_number)
    }

    #[must_use]
    pub fn deep_link(&self) -> Option<&'a str> {
        DEEP_LINK.resolve_with(self.0, as_non_empty_str)
    }

    /// Route legs in flight order. A missing or non-array `route` yields nothing.
    pub fn legs(&self) -> impl Iterator<Item = UpstreamLeg<'a>> {
        let offer: &'a Value = self.0;
        offer
            .get("route")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(UpstreamLeg)
    }

    /// Total trip duration in seconds: `duration.total`, else a flat
    /// numeric `duration`.
    #[must_use]
    pub fn duration_secs(&self) -> Option<f64> {
        let duration = self.0.get("duration")?;
        duration
            .get("total")
            .filter(|total| is_truthy(total))
            .and_then(as_number)
            .or_else(|| as_number(duration))
    }
}

/// One flight segment from `route[]`.
#[derive(Debug, Clone, Copy)]
pub struct UpstreamLeg<'a>(&'a Value);

impl<'a> UpstreamLeg<'a> {
    #[cfg(test)]
    #[must_use]
    pub fn new(leg: &'a Value) -> Self {
        Self(leg)
    }

    #[must_use]
    pub fn airline(&self) -> Option<&'a str> {
        self.0.get("airline").and_then(as_non_empty_str)
    }

    /// Flight number as text. Numeric values render without a fractional part
    /// when they are whole.
    #[must_use]
    pub fn flight_no(&self) -> Option<String> {
        FLIGHT_NO.resolve_with(self.0, |value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(render_number(n)),
            _ => None,
        })
    }

    #[must_use]
    pub fn fly_from(&self) -> Option<&'a str> {
        self.0.get("flyFrom").and_then(Value::as_str)
    }

    #[must_use]
    pub fn fly_to(&self) -> Option<&'a str> {
        self.0.get("flyTo").and_then(Value::as_str)
    }

    #[must_use]
    pub fn departure(&self) -> Option<DateTime<Utc>> {
        DEPARTURE.resolve_with(self.0, as_instant)
    }

    #[must_use]
    pub fn arrival(&self) -> Option<DateTime<Utc>> {
        ARRIVAL.resolve_with(self.0, as_instant)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn render_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
        Some(f) => format!("{f}"),
        None => n.to_string(),
    }
}
