use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::GuestCode;

/// Database row for guest_accounts table.
#[derive(Debug, FromRow)]
pub struct GuestAccount {
    pub id: String,
    pub organization_id: String,
    pub guest_code: String,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub expires_at: i64,
    pub last_accessed_at: Option<i64>,
    pub created_at: i64,
}

impl GuestAccount {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now.unix_timestamp()
    }
}

/// Data structure for issuing a new guest account.
pub struct NewGuestAccount {
    pub id: String,
    pub organization_id: String,
    pub guest_code: GuestCode,
    pub expires_at: i64,
}

/// Insert a newly issued guest account. The display name stays empty until
/// the first redemption fills it in.
pub async fn insert<'e, E>(executor: E, guest: &NewGuestAccount) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO guest_accounts (id, organization_id, guest_code, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&guest.id)
    .bind(&guest.organization_id)
    .bind(guest.guest_code.as_str())
    .bind(guest.expires_at)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Find a guest account by organization and normalized code.
/// Expiry is NOT filtered here: the caller distinguishes "invalid code"
/// from "expired" and they need different responses.
pub async fn find_by_org_and_code<'e, E>(
    executor: E,
    organization_id: &str,
    code: &GuestCode,
) -> Result<Option<GuestAccount>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, GuestAccount>(
        "SELECT * FROM guest_accounts WHERE organization_id = ? AND guest_code = ?",
    )
    .bind(organization_id)
    .bind(code.as_str())
    .fetch_optional(executor)
    .await
}

/// Record a redemption: store the presented identity and bump last_accessed_at.
pub async fn record_access<'e, E>(
    executor: E,
    guest_id: &str,
    display_name: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "UPDATE guest_accounts SET display_name = ?, email = ?, phone = ?, last_accessed_at = ? WHERE id = ?",
    )
    .bind(display_name)
    .bind(email)
    .bind(phone)
    .bind(now)
    .bind(guest_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// List guest accounts issued for an organization.
pub async fn list_for_org<'e, E>(
    executor: E,
    organization_id: &str,
) -> Result<Vec<GuestAccount>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, GuestAccount>(
        "SELECT * FROM guest_accounts WHERE organization_id = ? ORDER BY created_at",
    )
    .bind(organization_id)
    .fetch_all(executor)
    .await
}
