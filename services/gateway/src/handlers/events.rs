use crate::error::AppError;
use crate::extract::QueryParams;
use crate::models::{EventsQuery, EventsResponse};
use crate::state::AppState;
use axum::{Json, extract::State};

/// Events logged after `since` (all retained events by default)
pub async fn list_events(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<EventsQuery>,
) -> Result<Json<EventsResponse>, AppError> {
    let response = state.read(|chain| EventsResponse {
        last_sequence: chain.last_event_sequence(),
        events: chain.events_since(query.since).to_vec(),
    })?;
    Ok(Json(response))
}
