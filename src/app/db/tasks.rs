use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{TaskPriority, TaskStatus};

/// Database row for corporate_tasks table.
#[derive(Debug, FromRow)]
pub struct CorporateTask {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    pub category: Option<String>,
    /// JSON array of staff ids. Legacy rows may hold a bare single id.
    pub assigned_to: String,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CorporateTask {
    /// Parse the assignment list. A legacy bare string becomes a
    /// one-element list; garbage becomes empty.
    pub fn assignees(&self) -> Vec<String> {
        match serde_json::from_str::<Vec<String>>(&self.assigned_to) {
            Ok(ids) => ids,
            Err(_) if !self.assigned_to.is_empty() => vec![self.assigned_to.clone()],
            Err(_) => Vec::new(),
        }
    }
}

/// Data structure for inserting a new task.
pub struct NewCorporateTask {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub category: Option<String>,
    pub assigned_to: Vec<String>,
    pub created_by: String,
}

/// Insert a new task. `assigned_to` is serialized as a JSON array.
pub async fn insert<'e, E>(executor: E, task: &NewCorporateTask) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let assigned = serde_json::to_string(&task.assigned_to).unwrap_or_else(|_| "[]".to_string());
    sqlx::query(
        "INSERT INTO corporate_tasks (id, organization_id, title, description, priority, status, category, assigned_to, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&task.id)
    .bind(&task.organization_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.priority.to_string())
    .bind(task.status.to_string())
    .bind(&task.category)
    .bind(assigned)
    .bind(&task.created_by)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Find a task by ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    task_id: &str,
) -> Result<Option<CorporateTask>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, CorporateTask>("SELECT * FROM corporate_tasks WHERE id = ?")
        .bind(task_id)
        .fetch_optional(executor)
        .await
}

/// List tasks for an organization.
pub async fn list_for_org<'e, E>(
    executor: E,
    organization_id: &str,
) -> Result<Vec<CorporateTask>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, CorporateTask>(
        "SELECT * FROM corporate_tasks WHERE organization_id = ? ORDER BY created_at DESC",
    )
    .bind(organization_id)
    .fetch_all(executor)
    .await
}

/// Fields a manager may change on an existing task.
pub struct TaskUpdate {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub category: Option<String>,
    pub assigned_to: Vec<String>,
}

/// Update a task.
pub async fn update<'e, E>(
    executor: E,
    task_id: &str,
    fields: &TaskUpdate,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let assigned = serde_json::to_string(&fields.assigned_to).unwrap_or_else(|_| "[]".to_string());
    sqlx::query(
        "UPDATE corporate_tasks SET title = ?, description = ?, priority = ?, status = ?, category = ?, assigned_to = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.priority.to_string())
    .bind(fields.status.to_string())
    .bind(&fields.category)
    .bind(assigned)
    .bind(now)
    .bind(task_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Delete a task.
pub async fn delete<'e, E>(executor: E, task_id: &str) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("DELETE FROM corporate_tasks WHERE id = ?")
        .bind(task_id)
        .execute(executor)
        .await?;
    Ok(())
}
