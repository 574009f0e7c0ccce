use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::extract::{JsonBody, PathParams};
use crate::models::{GrantRoleRequest, RoleMembershipResponse};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use types::ids::Identity;
use types::role::Role;

pub async fn grant_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(role): PathParams<Role>,
    JsonBody(payload): JsonBody<GrantRoleRequest>,
) -> Result<StatusCode, AppError> {
    let caller = user.identity;
    state
        .execute(move |chain| chain.add_role(&caller, role, payload.identity, &payload.name))
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn renounce_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(role): PathParams<Role>,
) -> Result<StatusCode, AppError> {
    let caller = user.identity;
    state
        .execute(move |chain| chain.renounce_role(&caller, role))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_membership(
    State(state): State<AppState>,
    PathParams((role, identity)): PathParams<(Role, Identity)>,
) -> Result<Json<RoleMembershipResponse>, AppError> {
    let response = state.read(|chain| RoleMembershipResponse {
        role,
        identity,
        held: chain.has_role(role, &identity),
        name: chain.role_name(role, &identity).map(str::to_string),
    })?;
    Ok(Json(response))
}
