pub mod health;
pub mod onboarding;
pub mod permissions;
pub mod roles;
