use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use pragmadic_core::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    // Admin area: coarse `admin` role gate in front of the services' own
    // permission checks.
    let admin_routes = Router::new()
        .route(
            "/api/admin/role-assignments",
            get(handlers::roles::list_role_assignments_handler),
        )
        .route(
            "/api/admin/users/{user_id}/roles",
            get(handlers::roles::user_roles_handler)
                .put(handlers::roles::replace_roles_handler)
                .post(handlers::roles::add_role_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_admin_area,
        ));

    let protected_routes = Router::new()
        .route(
            "/api/me/permissions",
            get(handlers::permissions::my_permissions_handler),
        )
        .route(
            "/api/onboarding/complete",
            post(handlers::onboarding::complete_onboarding_handler),
        )
        .route("/auth/me", get(auth::me_handler))
        .merge(admin_routes)
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
