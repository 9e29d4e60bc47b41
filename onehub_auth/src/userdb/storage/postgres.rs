use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::storage::validate_postgres_table_schema;
use crate::userdb::{
    errors::UserError,
    types::{User, UserProfile},
};

use super::config::DB_TABLE_USERS;

// PostgreSQL implementations
pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            name TEXT,
            avatar_url TEXT,
            provider TEXT NOT NULL,
            provider_id TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            UNIQUE (provider, provider_id)
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

/// Validates that the users table schema matches what we expect
pub(super) async fn validate_user_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let expected_columns = vec![
        ("id", "text"),
        ("email", "text"),
        ("name", "text"),
        ("avatar_url", "text"),
        ("provider", "text"),
        ("provider_id", "text"),
        ("created_at", "timestamp with time zone"),
        ("updated_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(pool, DB_TABLE_USERS, &expected_columns, UserError::Storage)
        .await
}

/// Insert-or-update keyed on `(provider, provider_id)` in a single statement.
///
/// `id` and `created_at` of an existing row are left untouched; `updated_at` is bumped
/// by at least one microsecond so it strictly increases on every upsert.
pub(super) async fn upsert_user_postgres(
    pool: &Pool<Postgres>,
    new_id: &str,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS;

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (id, email, name, avatar_url, provider, provider_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        ON CONFLICT (provider, provider_id) DO UPDATE SET
            email = EXCLUDED.email,
            name = EXCLUDED.name,
            avatar_url = EXCLUDED.avatar_url,
            updated_at = GREATEST(EXCLUDED.updated_at, {table_name}.updated_at + INTERVAL '1 microsecond')
        RETURNING id, email, name, avatar_url, provider, provider_id, created_at, updated_at
        "#
    ))
    .bind(new_id)
    .bind(&profile.email)
    .bind(&profile.name)
    .bind(&profile.avatar_url)
    .bind(&profile.provider)
    .bind(&profile.provider_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub(super) async fn get_user_postgres(
    pool: &Pool<Postgres>,
    id: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS;

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub(super) async fn get_user_by_provider_postgres(
    pool: &Pool<Postgres>,
    provider: &str,
    provider_id: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS;

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE provider = $1 AND provider_id = $2
        "#
    ))
    .bind(provider)
    .bind(provider_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub(super) async fn get_all_users_postgres(pool: &Pool<Postgres>) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS;

    let users = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} ORDER BY created_at ASC
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(users)
}
