use pragmadic_application::{AuthorizationService, OnboardingService, RoleAdminService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub role_admin_service: RoleAdminService,
    pub onboarding_service: OnboardingService,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
