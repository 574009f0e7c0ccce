use crate::auth::{AuthenticatedUser, Payment};
use crate::error::AppError;
use crate::extract::{JsonBody, PathParams};
use crate::models::{OrderAircraftRequest, PrepareStructureRequest};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use contracts::Call;
use contracts::ledger::AircraftRecord;
use types::ids::Serial;

pub async fn order_aircraft(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Payment(payment): Payment,
    JsonBody(payload): JsonBody<OrderAircraftRequest>,
) -> Result<(StatusCode, Json<AircraftRecord>), AppError> {
    let call = Call::paying(user.identity, payment);
    let aircraft = state
        .execute(move |chain| {
            chain.order_aircraft(&call, payload.equipment_id, payload.manufacturer)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(aircraft.as_record())))
}

pub async fn get_aircraft(
    State(state): State<AppState>,
    PathParams(serial): PathParams<Serial>,
) -> Result<Json<AircraftRecord>, AppError> {
    let aircraft = state.read(|chain| chain.fetch_aircraft(serial))??;
    Ok(Json(aircraft.as_record()))
}

pub async fn prepare_structure(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Payment(payment): Payment,
    PathParams(serial): PathParams<Serial>,
    JsonBody(payload): JsonBody<PrepareStructureRequest>,
) -> Result<Json<AircraftRecord>, AppError> {
    let call = Call::paying(user.identity, payment);
    let aircraft = state
        .execute(move |chain| {
            chain.prepare_structure(&call, serial, &payload.origin_plant, &payload.notes)
        })
        .await?;
    Ok(Json(aircraft.as_record()))
}

pub async fn receive_aircraft(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Payment(payment): Payment,
    PathParams(serial): PathParams<Serial>,
) -> Result<Json<AircraftRecord>, AppError> {
    let call = Call::paying(user.identity, payment);
    let aircraft = state
        .execute(move |chain| chain.receive_aircraft(&call, serial))
        .await?;
    Ok(Json(aircraft.as_record()))
}
