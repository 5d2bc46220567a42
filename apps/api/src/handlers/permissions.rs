use axum::Json;
use axum::extract::{Extension, State};
use pragmadic_core::UserIdentity;

use crate::dto::EffectivePermissionsResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn my_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<EffectivePermissionsResponse>> {
    let roles = state
        .authorization_service
        .roles_for_user(user.user_id())
        .await?;
    let permissions = state
        .authorization_service
        .effective_permissions_for_user(user.user_id())
        .await?;

    Ok(Json(EffectivePermissionsResponse::new(roles, permissions)))
}
