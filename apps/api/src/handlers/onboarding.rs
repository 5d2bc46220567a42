use axum::extract::{Extension, State};
use axum::http::StatusCode;
use pragmadic_core::UserIdentity;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn complete_onboarding_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<StatusCode> {
    state.onboarding_service.complete_onboarding(&user).await?;

    Ok(StatusCode::NO_CONTENT)
}
