use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Extension, Json, Router,
};
use futures_util::{Stream, StreamExt};
use puv_catalog::{
    BookingDecision, BookingRequest, BookingResult, BookingStatus, CatalogError, Category, Trip,
    TripId, TripQuery, Vehicle,
};
use puv_shared::models::events::BookingConfirmedEvent;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;

use crate::{
    error::AppError,
    middleware::{customer_auth_middleware, CustomerClaims},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct TripListParams {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TripDetail {
    #[serde(flatten)]
    pub trip: Trip,
    pub vehicle: Option<Vehicle>,
}

#[derive(Debug, Deserialize)]
pub struct BookingBody {
    #[serde(default)]
    pub decision: BookingDecision,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/v1/trips/{id}/bookings", post(book_trip))
        .route_layer(axum::middleware::from_fn_with_state(state, customer_auth_middleware));

    Router::new()
        .route("/v1/categories", get(list_categories))
        .route("/v1/trips", get(list_trips))
        .route("/v1/trips/{id}", get(get_trip))
        .route("/v1/trips/{id}/stream", get(stream_bookings))
        .merge(protected)
}

async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.catalog.categories().to_vec())
}

async fn list_trips(
    State(state): State<AppState>,
    Query(params): Query<TripListParams>,
) -> Result<Json<Vec<Trip>>, AppError> {
    let query = TripQuery::parse(
        params.category.as_deref(),
        params.q.as_deref(),
        state.catalog.settings(),
    )?;
    Ok(Json(state.catalog.query_trips(&query)))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TripDetail>, AppError> {
    let trip = state
        .catalog
        .trip(TripId(id))
        .ok_or(CatalogError::NotFound(TripId(id)))?;
    let vehicle = state.catalog.vehicle_for(&trip).cloned();

    Ok(Json(TripDetail { trip, vehicle }))
}

async fn book_trip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Extension(claims): Extension<CustomerClaims>,
    Json(body): Json<BookingBody>,
) -> Result<(StatusCode, Json<BookingResult>), AppError> {
    let request = BookingRequest {
        trip_id: TripId(id),
        decision: body.decision,
    };
    let result = state.catalog.submit(&request)?;

    let status = match result.status {
        BookingStatus::Confirmed => {
            tracing::info!("User {} booked trip {}", claims.sub, id);
            StatusCode::CREATED
        }
        BookingStatus::Cancelled => StatusCode::OK,
    };

    Ok((status, Json(result)))
}

fn booking_event(trip_id: TripId, event: &BookingConfirmedEvent) -> Option<Event> {
    if event.trip_id != trip_id.0 {
        return None;
    }
    Event::default()
        .event("booking_confirmed")
        .id(event.sequence.to_string())
        .json_data(event)
        .ok()
}

/// Live feed of confirmed bookings for one trip.
async fn stream_bookings(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let trip_id = TripId(id);
    if state.catalog.trip(trip_id).is_none() {
        return Err(CatalogError::NotFound(trip_id).into());
    }

    let rx = state.catalog.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) => booking_event(trip_id, &event).map(Ok::<_, Infallible>),
            // Lagged receivers skip ahead
            _ => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
