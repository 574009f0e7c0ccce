use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::extract::PathParams;
use crate::models::{EscrowBalanceResponse, WithdrawResponse};
use crate::state::AppState;
use axum::{Json, extract::State};
use types::ids::Identity;

pub async fn get_pending(
    State(state): State<AppState>,
    PathParams(identity): PathParams<Identity>,
) -> Result<Json<EscrowBalanceResponse>, AppError> {
    let pending = state.read(|chain| chain.pending_withdrawals(&identity))?;
    Ok(Json(EscrowBalanceResponse { identity, pending }))
}

pub async fn withdraw(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<WithdrawResponse>, AppError> {
    let identity = user.identity;
    let amount = state
        .execute_payout(move |chain| chain.withdraw(&identity))
        .await?;
    Ok(Json(WithdrawResponse { identity, amount }))
}
