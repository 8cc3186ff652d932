use sqlx::{Pool, Postgres};

use crate::{authentication::google::GoogleProfile, error::Error, error::QueryError, schema::User};

pub async fn get_user_by_id(user_id: &str, pool: &Pool<Postgres>) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

/// Returns the user signed in with `profile`, creating it on first sign-in.
/// Existing users are matched by email and only get their last login bumped.
pub async fn sign_in_user(profile: &GoogleProfile, pool: &Pool<Postgres>) -> Result<User, Error> {
    let user: User = sqlx::query_as(
        "
        INSERT INTO users (id, email, name, profile_image, last_login_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (email) DO UPDATE
        SET last_login_at = NOW()
        RETURNING *
    ",
    )
    .bind(&profile.id)
    .bind(&profile.email)
    .bind(&profile.name)
    .bind(&profile.picture)
    .fetch_one(pool)
    .await
    .map_err(QueryError::from)?;

    log::info!("User {} signed in", user.id);
    Ok(user)
}
