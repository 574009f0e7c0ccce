use crate::auth::{AuthenticatedUser, Payment};
use crate::error::AppError;
use crate::extract::{JsonBody, PathParams};
use crate::models::{ProcessComponentRequest, ReceiveComponentRequest};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use contracts::Call;
use contracts::ledger::ComponentRecord;
use types::ids::Upc;

pub async fn receive_component(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Payment(payment): Payment,
    JsonBody(payload): JsonBody<ReceiveComponentRequest>,
) -> Result<(StatusCode, Json<ComponentRecord>), AppError> {
    let call = Call::paying(user.identity, payment);
    let component = state
        .execute(move |chain| {
            chain.receive_component(
                &call,
                payload.upc,
                &payload.origin_manufacturer,
                &payload.origin_plant,
                payload.equipment_id,
            )
        })
        .await?;
    Ok((StatusCode::CREATED, Json(component.as_record())))
}

pub async fn get_component(
    State(state): State<AppState>,
    PathParams(upc): PathParams<Upc>,
) -> Result<Json<ComponentRecord>, AppError> {
    let component = state.read(|chain| chain.fetch_component(upc))??;
    Ok(Json(component.as_record()))
}

pub async fn process_component(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Payment(payment): Payment,
    PathParams(upc): PathParams<Upc>,
    JsonBody(payload): JsonBody<ProcessComponentRequest>,
) -> Result<Json<ComponentRecord>, AppError> {
    let call = Call::paying(user.identity, payment);
    let component = state
        .execute(move |chain| {
            chain.process_component(&call, upc, &payload.origin_plant, &payload.notes)
        })
        .await?;
    Ok(Json(component.as_record()))
}
