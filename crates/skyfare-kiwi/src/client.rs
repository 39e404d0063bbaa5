//! HTTP client for the Kiwi (Skypicker) flight-search API.
//!
//! One search is one `GET /flights` request. Responses are never cached and
//! failures are never retried: a non-success status surfaces as
//! [`KiwiError::Upstream`] with the status preserved.

use reqwest::{header, Client, Url};
use skyfare_core::TripQuery;

use crate::error::KiwiError;
use crate::normalize::{normalize_offers, NormalizedOffer};
use crate::query::{search_params, UPSTREAM_CURRENCY};

const DEFAULT_BASE_URL: &str = "https://api.skypicker.com/";

/// Client for the Kiwi `/flights` endpoint.
///
/// Use [`KiwiClient::new`] for production or [`KiwiClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct KiwiClient {
    client: Client,
    partner: String,
    endpoint: Url,
}

impl KiwiClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`KiwiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(partner: &str, user_agent: &str) -> Result<Self, KiwiError> {
        Self::with_base_url(partner, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// No request timeout is set; transport defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`KiwiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`KiwiError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        partner: &str,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, KiwiError> {
        let client = Client::builder().user_agent(user_agent).build()?;

        // Exactly one trailing slash, so joining `flights` appends a segment
        // instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("flights"))
            .map_err(|e| KiwiError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            partner: partner.to_owned(),
            endpoint,
        })
    }

    /// Runs a search and returns the normalized, price-sorted offers.
    ///
    /// # Errors
    ///
    /// See [`KiwiClient::fetch_flights`]. Normalization itself never fails.
    pub async fn search_offers(
        &self,
        trip: &TripQuery,
    ) -> Result<Vec<NormalizedOffer>, KiwiError> {
        let body = self.fetch_flights(trip).await?;
        let offers = normalize_offers(&body, trip, UPSTREAM_CURRENCY);
        tracing::info!(
            origin = %trip.origin,
            destination = %trip.destination,
            offers = offers.len(),
            "flight search complete"
        );
        Ok(offers)
    }

    /// Fetches the raw `/flights` payload for a trip.
    ///
    /// # Errors
    ///
    /// - [`KiwiError::Upstream`] if upstream answers with a non-success status.
    /// - [`KiwiError::Http`] on network failure.
    /// - [`KiwiError::Deserialize`] if the body is not valid JSON.
    pub async fn fetch_flights(&self, trip: &TripQuery) -> Result<serde_json::Value, KiwiError> {
        let url = self.build_url(trip);
        tracing::debug!(url = %url, "requesting upstream flight search");

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "upstream request failed"))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "upstream returned non-success status");
            return Err(KiwiError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| KiwiError::Deserialize {
            context: format!("flight search {}", url.path()),
            source: e,
        })
    }

    /// Builds the `/flights` URL with percent-encoded query parameters.
    fn build_url(&self, trip: &TripQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in search_params(trip, &self.partner) {
                pairs.append_pair(key, &value);
            }
        }
        url
    }
}
