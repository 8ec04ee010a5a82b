use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{OrganizationId, UserId};

/// Database row for organizations table.
#[derive(Debug, FromRow)]
pub struct Organization {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data structure for inserting a new organization.
pub struct NewOrganization {
    pub id: OrganizationId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
}

/// Find an organization by ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    organization_id: &str,
) -> Result<Option<Organization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(
        "SELECT id, slug, name, description, owner_id, created_at, updated_at FROM organizations WHERE id = ?",
    )
    .bind(organization_id)
    .fetch_optional(executor)
    .await
}

/// Find an organization by slug.
pub async fn find_by_slug<'e, E>(
    executor: E,
    slug: &str,
) -> Result<Option<Organization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(
        "SELECT id, slug, name, description, owner_id, created_at, updated_at FROM organizations WHERE slug = ?",
    )
    .bind(slug)
    .fetch_optional(executor)
    .await
}

/// Insert a new organization.
pub async fn insert<'e, E>(
    executor: E,
    organization: &NewOrganization,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO organizations (id, slug, name, description, owner_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(organization.id.as_str())
    .bind(&organization.slug)
    .bind(&organization.name)
    .bind(&organization.description)
    .bind(organization.owner_id.as_str())
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Update name/description. Slug and owner are immutable after creation.
pub async fn update<'e, E>(
    executor: E,
    organization_id: &str,
    name: &str,
    description: Option<&str>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE organizations SET name = ?, description = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(organization_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Count organizations owned by a user (for plan-based creation limits).
pub async fn count_owned_by<'e, E>(
    executor: E,
    user_id: &UserId,
) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar("SELECT count(*) FROM organizations WHERE owner_id = ?")
        .bind(user_id.as_str())
        .fetch_one(executor)
        .await
}
