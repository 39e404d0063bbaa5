use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use skyfare_core::{SearchParams, TripQuery};
use skyfare_kiwi::{KiwiError, NormalizedOffer};

use crate::middleware::RequestId;

use super::AppState;

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    pub results: Vec<NormalizedOffer>,
}

/// Client-visible search failure: `{ "error": "..." }`.
///
/// Upstream status failures map to 502; transport and parse failures to 500.
#[derive(Debug, Serialize)]
pub(super) struct SearchError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
}

impl From<KiwiError> for SearchError {
    fn from(err: KiwiError) -> Self {
        let status = if err.upstream_status().is_some() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            error: err.to_string(),
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

pub(super) async fn search_flights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>, SearchError> {
    let params = SearchParams::from_pairs(pairs);
    let trip = TripQuery::resolve(params, Utc::now().date_naive());
    tracing::debug!(
        request_id = %req_id.0,
        origin = %trip.origin,
        destination = %trip.destination,
        depart = %trip.depart,
        ret = %trip.return_date,
        "flight search requested"
    );

    let results = state.kiwi.search_offers(&trip).await.map_err(|e| {
        tracing::warn!(request_id = %req_id.0, error = %e, "flight search failed");
        SearchError::from(e)
    })?;

    Ok(Json(SearchResponse { results }))
}
