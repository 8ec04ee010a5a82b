use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{Email, GlobalRole, HashedPassword, UserId};

/// Database row for users table.
#[derive(Debug, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub display_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Parse the stored global role. Unknown values fall back to `public`.
    pub fn global_role(&self) -> GlobalRole {
        self.role.parse::<GlobalRole>().unwrap_or(GlobalRole::Public)
    }
}

/// Data structure for inserting a new user.
pub struct NewUser {
    pub id: UserId,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub role: GlobalRole,
    pub display_name: String,
}

/// Find a user by email address.
pub async fn find_by_email<'e, E>(
    executor: E,
    email: &Email,
) -> Result<Option<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, role, display_name, created_at, updated_at FROM users WHERE email = ?",
    )
    .bind(email.as_str())
    .fetch_optional(executor)
    .await
}

/// Find a user by ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    user_id: &str,
) -> Result<Option<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, role, display_name, created_at, updated_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Insert a new user into the database.
pub async fn insert<'e, E>(executor: E, user: &NewUser) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, role, display_name, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.id.as_str())
    .bind(user.email.as_str())
    .bind(user.password_hash.as_str())
    .bind(user.role.to_string())
    .bind(&user.display_name)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(())
}

/// Update a user's global role.
pub async fn update_role<'e, E>(
    executor: E,
    user_id: &str,
    role: GlobalRole,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role.to_string())
        .bind(now)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}
