use crate::auth::{AuthenticatedUser, Payment};
use crate::error::AppError;
use crate::extract::{JsonBody, PathParams};
use crate::models::{OrderEquipmentRequest, PackEquipmentRequest, ProcessEquipmentRequest};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use contracts::Call;
use contracts::ledger::EquipmentRecord;
use types::ids::Upc;

pub async fn order_equipment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Payment(payment): Payment,
    JsonBody(payload): JsonBody<OrderEquipmentRequest>,
) -> Result<(StatusCode, Json<EquipmentRecord>), AppError> {
    let call = Call::paying(user.identity, payment);
    let equipment = state
        .execute(move |chain| {
            chain.order_equipment(&call, payload.upc, payload.supplier, payload.serial)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(equipment.as_record())))
}

pub async fn get_equipment(
    State(state): State<AppState>,
    PathParams(upc): PathParams<Upc>,
) -> Result<Json<EquipmentRecord>, AppError> {
    let equipment = state.read(|chain| chain.fetch_equipment(upc))??;
    Ok(Json(equipment.as_record()))
}

pub async fn pack_equipment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Payment(payment): Payment,
    PathParams(upc): PathParams<Upc>,
    JsonBody(payload): JsonBody<PackEquipmentRequest>,
) -> Result<Json<EquipmentRecord>, AppError> {
    let call = Call::paying(user.identity, payment);
    let equipment = state
        .execute(move |chain| chain.pack_equipment(&call, upc, payload.transporter))
        .await?;
    Ok(Json(equipment.as_record()))
}

pub async fn transport_equipment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Payment(payment): Payment,
    PathParams(upc): PathParams<Upc>,
) -> Result<Json<EquipmentRecord>, AppError> {
    let call = Call::paying(user.identity, payment);
    let equipment = state
        .execute(move |chain| chain.transport_equipment(&call, upc))
        .await?;
    Ok(Json(equipment.as_record()))
}

pub async fn receive_equipment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Payment(payment): Payment,
    PathParams(upc): PathParams<Upc>,
) -> Result<Json<EquipmentRecord>, AppError> {
    let call = Call::paying(user.identity, payment);
    let equipment = state
        .execute(move |chain| chain.receive_equipment(&call, upc))
        .await?;
    Ok(Json(equipment.as_record()))
}

pub async fn process_equipment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Payment(payment): Payment,
    PathParams(upc): PathParams<Upc>,
    JsonBody(payload): JsonBody<ProcessEquipmentRequest>,
) -> Result<Json<EquipmentRecord>, AppError> {
    let call = Call::paying(user.identity, payment);
    let equipment = state
        .execute(move |chain| chain.process_equipment(&call, upc, &payload.notes))
        .await?;
    Ok(Json(equipment.as_record()))
}
