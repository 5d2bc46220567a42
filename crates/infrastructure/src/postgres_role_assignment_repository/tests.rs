use std::collections::BTreeSet;

use pragmadic_application::RoleAssignmentRepository;
use pragmadic_core::UserId;
use pragmadic_domain::Role;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresRoleAssignmentRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for role assignment tests: {error}");
    }

    Some(pool)
}

#[tokio::test]
async fn get_roles_returns_empty_set_without_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleAssignmentRepository::new(pool);
    let roles = repository.get_roles(UserId::new()).await;
    assert!(roles.is_ok());
    assert!(roles.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn add_role_is_idempotent() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleAssignmentRepository::new(pool);
    let user_id = UserId::new();

    let first = repository.add_role(user_id, Role::Owner).await;
    let second = repository.add_role(user_id, Role::Owner).await;
    assert!(first.is_ok());
    assert!(second.is_ok());

    let roles = repository.get_roles(user_id).await;
    assert_eq!(roles.unwrap_or_default(), BTreeSet::from([Role::Owner]));
}

#[tokio::test]
async fn set_roles_replaces_the_full_set() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleAssignmentRepository::new(pool);
    let user_id = UserId::new();

    let seeded = repository
        .set_roles(user_id, BTreeSet::from([Role::Regular, Role::Nomad]))
        .await;
    assert!(seeded.is_ok());

    let replaced = repository
        .set_roles(user_id, BTreeSet::from([Role::Owner]))
        .await;
    assert!(replaced.is_ok());

    let roles = repository.get_roles(user_id).await;
    assert_eq!(roles.unwrap_or_default(), BTreeSet::from([Role::Owner]));
}

#[tokio::test]
async fn unrecognized_stored_roles_are_skipped() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleAssignmentRepository::new(pool.clone());
    let user_id = UserId::new();

    let inserted = sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role)
        VALUES ($1, 'superuser'), ($1, 'nomad')
        "#,
    )
    .bind(user_id.as_uuid())
    .execute(&pool)
    .await;
    assert!(inserted.is_ok());

    let roles = repository.get_roles(user_id).await;
    assert_eq!(roles.unwrap_or_default(), BTreeSet::from([Role::Nomad]));
}
