use std::collections::BTreeSet;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use pragmadic_core::{UserId, UserIdentity};
use pragmadic_domain::Role;
use uuid::Uuid;

use crate::dto::{AddRoleRequest, ReplaceRolesRequest, RoleAssignmentResponse, UserRolesResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_role_assignments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleAssignmentResponse>>> {
    let assignments = state
        .role_admin_service
        .list_assignments(&user)
        .await?
        .into_iter()
        .map(RoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn user_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserRolesResponse>> {
    let target = UserId::from_uuid(user_id);
    let roles = state.role_admin_service.roles_for_user(&user, target).await?;

    Ok(Json(UserRolesResponse {
        user_id: target.to_string(),
        roles: roles.iter().map(|role| role.as_str().to_owned()).collect(),
    }))
}

pub async fn replace_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ReplaceRolesRequest>,
) -> ApiResult<StatusCode> {
    let roles = payload
        .roles
        .iter()
        .map(|value| Role::from_transport(value.as_str()))
        .collect::<Result<BTreeSet<_>, _>>()?;

    state
        .role_admin_service
        .replace_roles(&user, UserId::from_uuid(user_id), roles)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AddRoleRequest>,
) -> ApiResult<StatusCode> {
    let role = Role::from_transport(payload.role.as_str())?;

    state
        .role_admin_service
        .add_role(&user, UserId::from_uuid(user_id), role)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
