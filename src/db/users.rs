use chrono::Utc;
use sqlx::SqlitePool;

use super::begin_immediate;
use crate::{
    errors::{Error, Result},
    models::user::{NewUser, ProfileChanges, User},
};

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Maps a UNIQUE violation on `users` back to the field that collided.
fn duplicate_user(err: sqlx::Error, new_user: &NewUser) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            if db.message().contains("users.username") {
                Error::UsernameExist(new_user.username.clone())
            } else {
                Error::EmailExist(new_user.email.clone())
            }
        }
        _ => Error::SqlxError(err),
    }
}

pub async fn insert_user(pool: &SqlitePool, new_user: NewUser) -> Result<User> {
    let mut tx = begin_immediate(pool).await?;

    let taken: Option<(String, String)> =
        sqlx::query_as("SELECT email, username FROM users WHERE email = ? OR username = ? LIMIT 1")
            .bind(&new_user.email)
            .bind(&new_user.username)
            .fetch_optional(&mut *tx)
            .await?;
    if let Some((email, _)) = taken {
        return Err(if email == new_user.email {
            Error::EmailExist(new_user.email)
        } else {
            Error::UsernameExist(new_user.username)
        });
    }

    let now = Utc::now();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash, role, organization_name, contact_number, address, is_approved, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING *",
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(new_user.role)
    .bind(&new_user.organization_name)
    .bind(&new_user.contact_number)
    .bind(&new_user.address)
    .bind(new_user.role.approved_on_signup())
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| duplicate_user(err, &new_user))?;

    tx.commit().await?;
    Ok(user)
}

pub async fn update_profile(pool: &SqlitePool, id: i64, changes: ProfileChanges) -> Result<User> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET
            organization_name = COALESCE(?, organization_name),
            contact_number = COALESCE(?, contact_number),
            address = COALESCE(?, address),
            updated_at = ?
         WHERE id = ?
         RETURNING *",
    )
    .bind(changes.organization_name)
    .bind(changes.contact_number)
    .bind(changes.address)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(Error::NotFound("user"))
}

pub async fn approve_user(pool: &SqlitePool, id: i64) -> Result<User> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET is_approved = 1, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(Error::NotFound("user"))
}

pub async fn list_pending(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE is_approved = 0 ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(users)
}
