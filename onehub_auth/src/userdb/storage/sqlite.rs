use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Sqlite};

use crate::storage::validate_sqlite_table_schema;
use crate::userdb::{
    errors::UserError,
    types::{User, UserProfile},
};

use super::config::DB_TABLE_USERS;

// SQLite implementations
pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
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
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL,
            UNIQUE (provider, provider_id)
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

/// Validates that the users table schema matches what we expect
pub(super) async fn validate_user_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let expected_columns = vec![
        ("id", "TEXT"),
        ("email", "TEXT"),
        ("name", "TEXT"),
        ("avatar_url", "TEXT"),
        ("provider", "TEXT"),
        ("provider_id", "TEXT"),
        ("created_at", "TIMESTAMP"),
        ("updated_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(pool, DB_TABLE_USERS, &expected_columns, UserError::Storage).await
}

/// Insert-or-update keyed on `(provider, provider_id)`.
///
/// The first statement of the transaction is a write, so the connection holds
/// SQLite's write lock before it reads the stored `updated_at`. The new value is
/// strictly later than the stored one even when the clock steps back.
pub(super) async fn upsert_user_sqlite(
    pool: &Pool<Sqlite>,
    new_id: &str,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS;

    let mut tx = pool.begin().await?;

    sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET updated_at = updated_at
        WHERE provider = ? AND provider_id = ?
        "#
    ))
    .bind(&profile.provider)
    .bind(&profile.provider_id)
    .execute(&mut *tx)
    .await?;

    let stored: Option<DateTime<Utc>> = sqlx::query_scalar(&format!(
        r#"
        SELECT updated_at FROM {table_name} WHERE provider = ? AND provider_id = ?
        "#
    ))
    .bind(&profile.provider)
    .bind(&profile.provider_id)
    .fetch_optional(&mut *tx)
    .await?;

    let updated_at = next_updated_at(stored, now);

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (id, email, name, avatar_url, provider, provider_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (provider, provider_id) DO UPDATE SET
            email = excluded.email,
            name = excluded.name,
            avatar_url = excluded.avatar_url,
            updated_at = excluded.updated_at
        RETURNING id, email, name, avatar_url, provider, provider_id, created_at, updated_at
        "#
    ))
    .bind(new_id)
    .bind(&profile.email)
    .bind(&profile.name)
    .bind(&profile.avatar_url)
    .bind(&profile.provider)
    .bind(&profile.provider_id)
    .bind(now) // created_at
    .bind(updated_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(user)
}

/// Later of `now` and one microsecond past the stored value.
fn next_updated_at(stored: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match stored {
        Some(prev) => now.max(prev + Duration::microseconds(1)),
        None => now,
    }
}

pub(super) async fn get_user_sqlite(
    pool: &Pool<Sqlite>,
    id: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS;

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub(super) async fn get_user_by_provider_sqlite(
    pool: &Pool<Sqlite>,
    provider: &str,
    provider_id: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS;

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE provider = ? AND provider_id = ?
        "#
    ))
    .bind(provider)
    .bind(provider_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub(super) async fn get_all_users_sqlite(pool: &Pool<Sqlite>) -> Result<Vec<User>, UserError> {
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
