//! Request handlers for the listing endpoints

use crate::api::{AppState, error::ApiError};
use crate::core::types::Direction;
use crate::database::models::{BookingStatus, BookingWithCustomer, Customer};
use crate::database::repository::{BookingFilter, BookingSort};
use crate::pagination::{Page, PageRequest};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;

/// Query string shared by every listing.
///
/// Kept as raw strings so it can be flattened into other parameter sets;
/// values are parsed by hand into typed errors.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub cursor: Option<String>,
    pub limit: Option<String>,
    pub direction: Option<String>,
}

impl ListParams {
    fn page_request(&self) -> Result<PageRequest, ApiError> {
        let direction = match self.direction.as_deref() {
            Some(raw) => raw.parse::<Direction>().map_err(ApiError::InvalidParameter)?,
            None => Direction::default(),
        };
        let limit = self
            .limit
            .as_deref()
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| ApiError::InvalidParameter(format!("invalid limit: {}", raw)))
            })
            .transpose()?;
        Ok(PageRequest { cursor: self.cursor.clone(), limit, direction })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingListParams {
    #[serde(flatten)]
    pub page: ListParams,
    pub sort: Option<String>,
    pub status: Option<String>,
    pub customer_id: Option<String>,
}

impl BookingListParams {
    fn sort(&self) -> Result<BookingSort, ApiError> {
        self.sort
            .as_deref()
            .map(str::parse::<BookingSort>)
            .transpose()
            .map(Option::unwrap_or_default)
            .map_err(ApiError::InvalidParameter)
    }

    fn filter(&self) -> Result<BookingFilter, ApiError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<BookingStatus>)
            .transpose()
            .map_err(ApiError::InvalidParameter)?;
        let customer_id = self
            .customer_id
            .as_deref()
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| ApiError::InvalidParameter(format!("invalid customer_id: {}", raw)))
            })
            .transpose()?;
        Ok(BookingFilter { status, customer_id })
    }
}

/// `GET /bookings`
pub async fn list_bookings(
    State(state): State<AppState>,
    params: Result<Query<BookingListParams>, QueryRejection>,
) -> Result<Json<Page<BookingWithCustomer>>, ApiError> {
    let Query(params) = params?;
    let request = params.page.page_request()?;
    let page = state.repository.list_bookings(&params.filter()?, params.sort()?, &request).await?;
    Ok(Json(page))
}

/// `GET /customers`
pub async fn list_customers(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page<Customer>>, ApiError> {
    let Query(params) = params?;
    let page = state.repository.list_customers(&params.page_request()?).await?;
    Ok(Json(page))
}

/// `GET /customers/{id}`
pub async fn get_customer(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Customer>, ApiError> {
    let Path(id) = path?;
    state
        .repository
        .get_customer(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("customer {}", id)))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: Option<bool>,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Response {
    if state.stopping.load(Ordering::SeqCst) {
        let body = HealthResponse { status: "shutting_down", database: None };
        return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
    }

    let database = match &state.database {
        Some(db) => Some(db.check_connection().await),
        None => None,
    };

    match database {
        Some(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "degraded", database }),
        )
            .into_response(),
        _ => (StatusCode::OK, Json(HealthResponse { status: "healthy", database })).into_response(),
    }
}
