//! Normalization of the Kiwi search payload into the offer list served to
//! clients.
//!
//! Every missing or malformed upstream field degrades to a default (`0`,
//! `""`, an empty list, or `null` for an instant that cannot be read); a bad
//! offer never fails the whole search.

use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use skyfare_core::TripQuery;

use crate::types::{UpstreamLeg, UpstreamOffer, UpstreamPayload};

/// An itinerary ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOffer {
    pub price: f64,
    pub currency: String,
    pub deep_link: String,
    /// Carrier codes in first-seen order, without duplicates.
    pub airlines: Vec<String>,
    pub route: Vec<NormalizedLeg>,
    pub duration_hours: f64,
    pub num_stops: usize,
}

/// One flight segment of a [`NormalizedOffer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLeg {
    pub airline: String,
    pub flight_no: String,
    pub from: String,
    pub to: String,
    /// ISO-8601 UTC with millisecond precision, e.g. `2025-12-18T06:00:00.000Z`.
    pub departure_utc: Option<String>,
    pub arrival_utc: Option<String>,
}

/// Booking-site results page used when an offer carries no deep link.
#[must_use]
pub fn fallback_deep_link(trip: &TripQuery) -> String {
    format!(
        "https://www.kiwi.com/en/search/results/{}/{}/{}/{}",
        trip.origin, trip.destination, trip.depart, trip.return_date
    )
}

/// Converts the upstream body into offers sorted by ascending price.
///
/// `default_currency` applies when the payload has no `currency`. The trip is
/// only used to build [`fallback_deep_link`]. Offers with equal prices keep
/// their upstream order.
#[must_use]
pub fn normalize_offers(
    body: &Value,
    trip: &TripQuery,
    default_currency: &str,
) -> Vec<NormalizedOffer> {
    let payload = UpstreamPayload::new(body);
    let currency = payload.currency().unwrap_or(default_currency);

    let mut offers: Vec<NormalizedOffer> = payload
        .offers()
        .map(|offer| normalize_offer(offer, currency, trip))
        .collect();

    // `sort_by` is stable, which keeps upstream order among equal prices.
    // `partial_cmp` treats `-0.0` and `0.0` as equal, unlike `total_cmp`.
    offers.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal));
    offers
}

fn normalize_offer(offer: UpstreamOffer<'_>, currency: &str, trip: &TripQuery) -> NormalizedOffer {
    let legs: Vec<UpstreamLeg<'_>> = offer.legs().collect();

    let mut airlines: Vec<String> = Vec::new();
    for code in legs.iter().filter_map(UpstreamLeg::airline) {
        if !airlines.iter().any(|seen| seen == code) {
            airlines.push(code.to_string());
        }
    }

    let route = legs.iter().map(normalize_leg).collect();
    let duration_hours = round_2dp(offer.duration_secs().unwrap_or(0.0) / 3600.0);

    NormalizedOffer {
        price: offer.price().unwrap_or(0.0),
        currency: currency.to_string(),
        deep_link: offer
            .deep_link()
            .map_or_else(|| fallback_deep_link(trip), str::to_string),
        airlines,
        route,
        duration_hours,
        // A missing route counts as one implicit leg, so zero stops either way.
        num_stops: legs.len().saturating_sub(1),
    }
}

fn normalize_leg(leg: &UpstreamLeg<'_>) -> NormalizedLeg {
    NormalizedLeg {
        airline: leg.airline().unwrap_or_default().to_string(),
        flight_no: leg.flight_no().unwrap_or_default(),
        from: leg.fly_from().unwrap_or_default().to_string(),
        to: leg.fly_to().unwrap_or_default().to_string(),
        departure_utc: leg.departure().map(iso_utc),
        arrival_utc: leg.arrival().map(iso_utc),
    }
}

fn iso_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn round_2dp(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn trip() -> TripQuery {
        TripQuery {
            origin: "MAN".to_string(),
            destination: "LIS".to_string(),
            depart: "2025-12-18".to_string(),
            return_date: "2025-12-31".to_string(),
        }
    }

    fn prices(offers: &[NormalizedOffer]) -> Vec<f64> {
        offers.iter().map(|o| o.price).collect()
    }

    #[test]
    fn empty_data_yields_empty_list() {
        let offers = normalize_offers(&json!({ "data": [] }), &trip(), "GBP");
        assert!(offers.is_empty());
    }

    #[test]
    fn missing_data_yields_empty_list() {
        assert!(normalize_offers(&json!({}), &trip(), "GBP").is_empty());
        assert!(normalize_offers(&json!(null), &trip(), "GBP").is_empty());
    }

    #[test]
    fn offers_are_sorted_by_ascending_price() {
        let body = json!({ "data": [ { "price": 300 }, { "price": 100 }, { "price": 200 } ] });
        let offers = normalize_offers(&body, &trip(), "GBP");
        assert_eq!(prices(&offers), vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn equal_prices_keep_upstream_order() {
        let body = json!({ "data": [
            { "price": 150, "deep_link": "https://a.test" },
            { "price": 90,  "deep_link": "https://b.test" },
            { "price": 150, "deep_link": "https://c.test" },
            { "price": 150, "deep_link": "https://d.test" }
        ] });
        let links: Vec<String> = normalize_offers(&body, &trip(), "GBP")
            .into_iter()
            .map(|o| o.deep_link)
            .collect();
        assert_eq!(
            links,
            vec![
                "https://b.test",
                "https://a.test",
                "https://c.test",
                "https://d.test"
            ]
        );
    }

    #[test]
    fn signed_zero_prices_tie_and_keep_upstream_order() {
        let body = json!({ "data": [
            { "price": 0, "deep_link": "https://a.test" },
            { "price": -0.0, "deep_link": "https://b.test" }
        ] });
        let links: Vec<String> = normalize_offers(&body, &trip(), "GBP")
            .into_iter()
            .map(|o| o.deep_link)
            .collect();
        assert_eq!(links, vec!["https://a.test", "https://b.test"]);
    }

    #[test]
    fn currency_comes_from_payload_or_default() {
        let with = json!({ "currency": "EUR", "data": [ { "price": 1 } ] });
        assert_eq!(normalize_offers(&with, &trip(), "GBP")[0].currency, "EUR");

        let without = json!({ "data": [ { "price": 1 } ] });
        assert_eq!(normalize_offers(&without, &trip(), "GBP")[0].currency, "GBP");
    }

    #[test]
    fn deep_link_tries_variants_in_order() {
        let body = json!({ "data": [
            { "price": 1, "deep_link": "https://one.test", "link": "https://x.test" },
            { "price": 2, "deepLink": "https://two.test", "link": "https://x.test" },
            { "price": 3, "link": "https://three.test" }
        ] });
        let links: Vec<String> = normalize_offers(&body, &trip(), "GBP")
            .into_iter()
            .map(|o| o.deep_link)
            .collect();
        assert_eq!(
            links,
            vec!["https://one.test", "https://two.test", "https://three.test"]
        );
    }

    #[test]
    fn missing_deep_link_falls_back_to_results_page() {
        let body = json!({ "data": [ { "price": 50 } ] });
        let offers = normalize_offers(&body, &trip(), "GBP");
        assert_eq!(
            offers[0].deep_link,
            "https://www.kiwi.com/en/search/results/MAN/LIS/2025-12-18/2025-12-31"
        );
    }

    #[test]
    fn airlines_are_deduplicated_in_first_seen_order() {
        let body = json!({ "data": [ { "price": 1, "route": [
            { "airline": "TP" }, { "airline": "" }, { "airline": "FR" },
            { "airline": "TP" }, { "airline": null }, {}
        ] } ] });
        let offers = normalize_offers(&body, &trip(), "GBP");
        assert_eq!(offers[0].airlines, vec!["TP", "FR"]);
        assert_eq!(offers[0].route.len(), 6);
    }

    #[test]
    fn empty_route_has_zero_stops() {
        let body = json!({ "data": [ { "price": 1, "route": [] }, { "price": 2 } ] });
        let offers = normalize_offers(&body, &trip(), "GBP");
        assert_eq!(offers[0].num_stops, 0);
        assert_eq!(offers[1].num_stops, 0);
        assert!(offers[1].route.is_empty());
    }

    #[test]
    fn stops_are_legs_minus_one() {
        let body = json!({ "data": [ { "price": 1, "route": [ {}, {}, {} ] } ] });
        assert_eq!(normalize_offers(&body, &trip(), "GBP")[0].num_stops, 2);
    }

    #[test]
    fn legs_resolve_legacy_time_fields() {
        let body = json!({ "data": [ { "price": 120, "route": [
            {
                "airline": "TP", "flightNo": 1331, "flyFrom": "MAN", "flyTo": "LIS",
                "dTimeUTC": 1_766_044_800, "aTimeUTC": 1_766_054_100
            },
            {
                "airline": "TP", "flight_no": "1330", "flyFrom": "LIS", "flyTo": "MAN",
                "dTimeUTC": 1_767_175_200, "aTimeUTC": 1_767_184_500
            }
        ] } ] });
        let offer = &normalize_offers(&body, &trip(), "GBP")[0];
        assert_eq!(offer.num_stops, 1);

        let outbound = &offer.route[0];
        assert_eq!(outbound.flight_no, "1331");
        assert_eq!(outbound.from, "MAN");
        assert_eq!(outbound.to, "LIS");
        assert_eq!(
            outbound.departure_utc.as_deref(),
            Some("2025-12-18T08:00:00.000Z")
        );
        assert_eq!(
            outbound.arrival_utc.as_deref(),
            Some("2025-12-18T10:35:00.000Z")
        );

        let inbound = &offer.route[1];
        assert_eq!(inbound.flight_no, "1330");
        assert_eq!(
            inbound.departure_utc.as_deref(),
            Some("2025-12-31T10:00:00.000Z")
        );
    }

    #[test]
    fn legs_prefer_current_time_fields() {
        let body = json!({ "data": [ { "price": 1, "route": [ {
            "utc_departure": 1_766_044_800, "dTimeUTC": 1,
            "utc_arrival": 1_766_054_100, "aTimeUTC": 1
        } ] } ] });
        let leg = &normalize_offers(&body, &trip(), "GBP")[0].route[0];
        assert_eq!(leg.departure_utc.as_deref(), Some("2025-12-18T08:00:00.000Z"));
        assert_eq!(leg.arrival_utc.as_deref(), Some("2025-12-18T10:35:00.000Z"));
    }

    #[test]
    fn leg_without_any_fields_uses_defaults() {
        let body = json!({ "data": [ { "price": 1, "route": [ {} ] } ] });
        let leg = &normalize_offers(&body, &trip(), "GBP")[0].route[0];
        assert_eq!(leg.airline, "");
        assert_eq!(leg.flight_no, "");
        assert_eq!(leg.from, "");
        assert!(leg.departure_utc.is_none());
        assert!(leg.arrival_utc.is_none());
    }

    #[test]
    fn duration_is_converted_to_hours_with_two_decimals() {
        let body = json!({ "data": [
            { "price": 1, "duration": { "total": 9300 } },
            { "price": 2, "duration": 10_000 },
            { "price": 3 }
        ] });
        let offers = normalize_offers(&body, &trip(), "GBP");
        assert!((offers[0].duration_hours - 2.58).abs() < f64::EPSILON);
        assert!((offers[1].duration_hours - 2.78).abs() < f64::EPSILON);
        assert!(offers[2].duration_hours.abs() < f64::EPSILON);
    }

    #[test]
    fn missing_price_defaults_to_zero() {
        let body = json!({ "data": [ { "price": 40 }, { "deep_link": "https://free.test" } ] });
        let offers = normalize_offers(&body, &trip(), "GBP");
        assert_eq!(prices(&offers), vec![0.0, 40.0]);
        assert_eq!(offers[0].deep_link, "https://free.test");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let body = json!({ "data": [ { "price": 10, "route": [ { "airline": "U2" } ] } ] });
        let offers = normalize_offers(&body, &trip(), "GBP");
        let json = serde_json::to_value(&offers[0]).expect("serialize");
        assert!(json.get("deepLink").is_some());
        assert!(json.get("durationHours").is_some());
        assert!(json.get("numStops").is_some());
        assert!(json["route"][0].get("flightNo").is_some());
        assert!(json["route"][0].get("departureUtc").is_some());
    }
}
