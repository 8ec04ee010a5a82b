use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::ContractStatus;

/// Database row for contracts table.
#[derive(Debug, FromRow)]
pub struct Contract {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub body: Option<String>,
    pub status: String,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Contract {
    pub fn contract_status(&self) -> ContractStatus {
        self.status.parse::<ContractStatus>().unwrap_or(ContractStatus::Draft)
    }
}

/// Database row for contract_signatures table. `signer_id` is NULL for
/// signatures recorded on behalf of counterparties without accounts.
#[derive(Debug, FromRow)]
pub struct ContractSignature {
    pub id: String,
    pub contract_id: String,
    pub signer_id: Option<String>,
    pub signer_name: String,
    pub signed_at: i64,
}

/// Data structure for inserting a new contract.
pub struct NewContract {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub body: Option<String>,
    pub created_by: String,
}

/// Insert a new contract with status `draft`.
pub async fn insert<'e, E>(executor: E, contract: &NewContract) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO contracts (id, organization_id, title, body, status, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, 'draft', ?, ?, ?)",
    )
    .bind(&contract.id)
    .bind(&contract.organization_id)
    .bind(&contract.title)
    .bind(&contract.body)
    .bind(&contract.created_by)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Find a contract by ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    contract_id: &str,
) -> Result<Option<Contract>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = ?")
        .bind(contract_id)
        .fetch_optional(executor)
        .await
}

/// List contracts for an organization.
pub async fn list_for_org<'e, E>(
    executor: E,
    organization_id: &str,
) -> Result<Vec<Contract>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Contract>(
        "SELECT * FROM contracts WHERE organization_id = ? ORDER BY created_at DESC",
    )
    .bind(organization_id)
    .fetch_all(executor)
    .await
}

/// Update a contract's status. Transition validity is checked by the caller.
pub async fn update_status<'e, E>(
    executor: E,
    contract_id: &str,
    status: ContractStatus,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE contracts SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(now)
        .bind(contract_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Data structure for inserting a signature.
pub struct NewContractSignature {
    pub id: String,
    pub contract_id: String,
    pub signer_id: Option<String>,
    pub signer_name: String,
}

/// Insert a signature. Multiple signatures may accumulate (counter-signing).
pub async fn insert_signature<'e, E>(
    executor: E,
    signature: &NewContractSignature,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO contract_signatures (id, contract_id, signer_id, signer_name, signed_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&signature.id)
    .bind(&signature.contract_id)
    .bind(&signature.signer_id)
    .bind(&signature.signer_name)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Find a signature by ID.
pub async fn find_signature<'e, E>(
    executor: E,
    signature_id: &str,
) -> Result<Option<ContractSignature>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ContractSignature>("SELECT * FROM contract_signatures WHERE id = ?")
        .bind(signature_id)
        .fetch_optional(executor)
        .await
}

/// List signatures on a contract.
pub async fn list_signatures<'e, E>(
    executor: E,
    contract_id: &str,
) -> Result<Vec<ContractSignature>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ContractSignature>(
        "SELECT * FROM contract_signatures WHERE contract_id = ? ORDER BY signed_at",
    )
    .bind(contract_id)
    .fetch_all(executor)
    .await
}

/// Delete a signature. Authorization is checked by the caller.
pub async fn delete_signature<'e, E>(
    executor: E,
    signature_id: &str,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("DELETE FROM contract_signatures WHERE id = ?")
        .bind(signature_id)
        .execute(executor)
        .await?;
    Ok(())
}
