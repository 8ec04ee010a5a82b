use sqlx::SqlitePool;
use time::Duration;

use crate::app::{
    db,
    domain::{Email, GlobalRole, HashedPassword, Password, UserId},
    error::AppError,
};

/// Sign up a new user. Returns the user ID and session ID on success.
/// New accounts start at the `public` global tier.
pub async fn signup(
    pool: &SqlitePool,
    email: &Email,
    password: &Password,
    display_name: &str,
    session_days: i64,
) -> Result<(UserId, String), AppError> {
    // Check if email already exists
    if db::find_by_email(pool, email).await?.is_some() {
        return Err(AppError::Validation(
            "Unable to create account. If you already have an account, please log in.".to_string(),
        ));
    }

    // Hash the password
    let password_hash = HashedPassword::from_password(password)
        .map_err(|_| AppError::Internal)?;

    let user_id = UserId::new();

    let new_user = db::NewUser {
        id: user_id.clone(),
        email: email.clone(),
        password_hash,
        role: GlobalRole::Public,
        display_name: display_name.to_string(),
    };

    // User and session are created together or not at all
    let mut tx = pool.begin().await?;

    db::users::insert(&mut *tx, &new_user).await?;

    let expires_at = time::OffsetDateTime::now_utc() + Duration::days(session_days);
    let session_id = db::sessions::create(&mut *tx, &user_id, expires_at).await?;

    tx.commit().await?;

    Ok((user_id, session_id))
}

/// Log in a user. Returns the user ID and session ID on success.
pub async fn login(
    pool: &SqlitePool,
    email: &Email,
    password: &Password,
    session_days: i64,
) -> Result<(UserId, String), AppError> {
    let user = db::find_by_email(pool, email)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid email or password".to_string()))?;

    let stored_hash = HashedPassword::from_string(user.password_hash);
    stored_hash
        .verify(password)
        .map_err(|_| AppError::Validation("Invalid email or password".to_string()))?;

    let user_id = UserId::from_string(&user.id).map_err(|_| AppError::Internal)?;

    let expires_at = time::OffsetDateTime::now_utc() + Duration::days(session_days);
    let session_id = db::sessions::create(pool, &user_id, expires_at).await?;

    Ok((user_id, session_id))
}
