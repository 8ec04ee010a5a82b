use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{Confidentiality, DealStatus, ParticipantStatus};

/// Database row for deals table.
#[derive(Debug, FromRow)]
pub struct Deal {
    pub id: String,
    pub organization_id: String,
    pub initiator_id: String,
    pub title: String,
    pub description: Option<String>,
    pub confidentiality_level: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Deal {
    pub fn confidentiality(&self) -> Confidentiality {
        self.confidentiality_level
            .parse::<Confidentiality>()
            .unwrap_or(Confidentiality::Confidential)
    }

    pub fn deal_status(&self) -> DealStatus {
        self.status.parse::<DealStatus>().unwrap_or(DealStatus::Pending)
    }
}

/// Database row for deal_participants table.
#[derive(Debug, FromRow)]
pub struct DealParticipant {
    pub id: String,
    pub deal_id: String,
    pub user_id: String,
    pub role: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data structure for inserting a new deal.
pub struct NewDeal {
    pub id: String,
    pub organization_id: String,
    pub initiator_id: String,
    pub title: String,
    pub description: Option<String>,
    pub confidentiality_level: Confidentiality,
}

/// Insert a new deal with status `pending`.
pub async fn insert<'e, E>(executor: E, deal: &NewDeal) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO deals (id, organization_id, initiator_id, title, description, confidentiality_level, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 'pending', ?, ?)",
    )
    .bind(&deal.id)
    .bind(&deal.organization_id)
    .bind(&deal.initiator_id)
    .bind(&deal.title)
    .bind(&deal.description)
    .bind(deal.confidentiality_level.to_string())
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Find a deal by ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    deal_id: &str,
) -> Result<Option<Deal>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Deal>("SELECT * FROM deals WHERE id = ?")
        .bind(deal_id)
        .fetch_optional(executor)
        .await
}

/// List deals visible to a user: public deals, deals they initiated, and
/// deals where they participate with accepted status.
pub async fn list_visible_to<'e, E>(
    executor: E,
    user_id: &str,
) -> Result<Vec<Deal>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Deal>(
        "SELECT * FROM deals WHERE confidentiality_level = 'public' \
         OR initiator_id = ? \
         OR id IN (SELECT deal_id FROM deal_participants WHERE user_id = ? AND status = 'accepted') \
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// Update a deal's terms.
pub async fn update_terms<'e, E>(
    executor: E,
    deal_id: &str,
    title: &str,
    description: Option<&str>,
    confidentiality_level: Confidentiality,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "UPDATE deals SET title = ?, description = ?, confidentiality_level = ?, updated_at = ? WHERE id = ?",
    )
    .bind(title)
    .bind(description)
    .bind(confidentiality_level.to_string())
    .bind(now)
    .bind(deal_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Update a deal's status. Transition validity is checked by the caller.
pub async fn update_status<'e, E>(
    executor: E,
    deal_id: &str,
    status: DealStatus,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE deals SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(now)
        .bind(deal_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Data structure for adding a participant to a deal.
pub struct NewDealParticipant {
    pub id: String,
    pub deal_id: String,
    pub user_id: String,
    pub role: String,
}

/// Insert a participant with status `pending`.
pub async fn insert_participant<'e, E>(
    executor: E,
    participant: &NewDealParticipant,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO deal_participants (id, deal_id, user_id, role, status, created_at, updated_at) VALUES (?, ?, ?, ?, 'pending', ?, ?)",
    )
    .bind(&participant.id)
    .bind(&participant.deal_id)
    .bind(&participant.user_id)
    .bind(&participant.role)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Find a user's participant row on a deal.
pub async fn find_participant<'e, E>(
    executor: E,
    deal_id: &str,
    user_id: &str,
) -> Result<Option<DealParticipant>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, DealParticipant>(
        "SELECT * FROM deal_participants WHERE deal_id = ? AND user_id = ?",
    )
    .bind(deal_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// List all participants on a deal.
pub async fn list_participants<'e, E>(
    executor: E,
    deal_id: &str,
) -> Result<Vec<DealParticipant>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, DealParticipant>(
        "SELECT * FROM deal_participants WHERE deal_id = ? ORDER BY created_at",
    )
    .bind(deal_id)
    .fetch_all(executor)
    .await
}

/// Update one participant's own status.
pub async fn update_participant_status<'e, E>(
    executor: E,
    participant_id: &str,
    status: ParticipantStatus,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE deal_participants SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(now)
        .bind(participant_id)
        .execute(executor)
        .await?;
    Ok(())
}
