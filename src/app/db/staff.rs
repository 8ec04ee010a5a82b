use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{AccessLevel, StaffStatus};

/// Database row for organization_staff table.
///
/// `reports_to` is a reporting-hierarchy edge to another staff row, not an
/// ownership relation. Nothing in the schema prevents cycles; writers must
/// go through `access::ensure_no_reporting_cycle`.
#[derive(Debug, FromRow)]
pub struct StaffMember {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub access_level: i64,
    pub role: String,
    pub status: String,
    pub position: Option<String>,
    pub department: Option<String>,
    pub reports_to: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data structure for inserting a new staff member.
pub struct NewStaffMember {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub access_level: AccessLevel,
    pub role: String,
    pub status: StaffStatus,
    pub position: Option<String>,
    pub department: Option<String>,
    pub reports_to: Option<String>,
}

/// Find the staff row binding a user to an organization.
pub async fn find_by_org_and_user<'e, E>(
    executor: E,
    organization_id: &str,
    user_id: &str,
) -> Result<Option<StaffMember>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, StaffMember>(
        "SELECT * FROM organization_staff WHERE organization_id = ? AND user_id = ?",
    )
    .bind(organization_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Find a staff row by its own ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    staff_id: &str,
) -> Result<Option<StaffMember>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, StaffMember>("SELECT * FROM organization_staff WHERE id = ?")
        .bind(staff_id)
        .fetch_optional(executor)
        .await
}

/// List the full roster for an organization.
pub async fn list_for_org<'e, E>(
    executor: E,
    organization_id: &str,
) -> Result<Vec<StaffMember>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, StaffMember>(
        "SELECT * FROM organization_staff WHERE organization_id = ? ORDER BY created_at",
    )
    .bind(organization_id)
    .fetch_all(executor)
    .await
}

/// Insert a new staff member.
pub async fn insert<'e, E>(executor: E, member: &NewStaffMember) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO organization_staff (id, organization_id, user_id, access_level, role, status, position, department, reports_to, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&member.id)
    .bind(&member.organization_id)
    .bind(&member.user_id)
    .bind(member.access_level.get() as i64)
    .bind(&member.role)
    .bind(member.status.to_string())
    .bind(&member.position)
    .bind(&member.department)
    .bind(&member.reports_to)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Fields an admin may change on an existing staff row.
pub struct StaffUpdate {
    pub access_level: AccessLevel,
    pub role: String,
    pub status: StaffStatus,
    pub position: Option<String>,
    pub department: Option<String>,
    pub reports_to: Option<String>,
}

/// Update a staff row.
pub async fn update<'e, E>(
    executor: E,
    staff_id: &str,
    fields: &StaffUpdate,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "UPDATE organization_staff SET access_level = ?, role = ?, status = ?, position = ?, department = ?, reports_to = ?, updated_at = ? WHERE id = ?",
    )
    .bind(fields.access_level.get() as i64)
    .bind(&fields.role)
    .bind(fields.status.to_string())
    .bind(&fields.position)
    .bind(&fields.department)
    .bind(&fields.reports_to)
    .bind(now)
    .bind(staff_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Remove a staff member. Reports pointing at the removed row are detached.
pub async fn delete(
    pool: &sqlx::SqlitePool,
    staff_id: &str,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE organization_staff SET reports_to = NULL WHERE reports_to = ?")
        .bind(staff_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM organization_staff WHERE id = ?")
        .bind(staff_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
