//! Organization access resolution.
//!
//! **Rule**: owners bypass every level check; everyone else needs an active
//! staff row at or above the required level. Thresholds compare with `>=`
//! only — nothing anywhere checks a level with `=`.

use std::collections::HashSet;

use crate::app::{
    db,
    domain::{AccessLevel, StaffStatus},
    error::AppError,
};

/// Level required to manage org content (tasks, contract authoring).
pub const LEVEL_MANAGE_CONTENT: u8 = 4;

/// Level required to manage the staff roster and issue guest codes.
pub const LEVEL_MANAGE_STAFF: u8 = 5;

/// What an action requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any active membership (or ownership).
    Member,
    /// Active membership with access_level >= the given threshold.
    Level(u8),
    /// The organization owner, nobody else.
    OwnerOnly,
}

/// How the caller qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Owner,
    Staff { level: u8 },
}

/// Decide whether `user_id` may act on `organization_id` at the given
/// requirement. Unauthenticated callers never reach this point: the session
/// extractor rejects them with 401 first, so every denial here is a 403
/// (except an unknown organization, which is a 404).
pub async fn resolve(
    pool: &sqlx::SqlitePool,
    user_id: &str,
    organization_id: &str,
    requirement: Requirement,
) -> Result<Grant, AppError> {
    let org = db::organizations::find_by_id(pool, organization_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    if org.owner_id == user_id {
        return Ok(Grant::Owner);
    }

    if requirement == Requirement::OwnerOnly {
        return Err(AppError::Forbidden("Owner access required".to_string()));
    }

    let staff = db::staff::find_by_org_and_user(pool, organization_id, user_id)
        .await?
        .ok_or_else(|| AppError::Forbidden("Not a member of this organization".to_string()))?;

    if staff.status != StaffStatus::Active.to_string() {
        return Err(AppError::Forbidden("Membership is not active".to_string()));
    }

    // The CHECK constraint keeps stored levels in 1..=5.
    let level = AccessLevel::new(staff.access_level).map_err(|_| AppError::Internal)?;

    if let Requirement::Level(required) = requirement {
        if !level.satisfies(required) {
            return Err(AppError::Forbidden("Insufficient access level".to_string()));
        }
    }

    Ok(Grant::Staff { level: level.get() })
}

/// Validate a proposed `reports_to` edge before writing it.
///
/// Walks the parent chain from the proposed manager with a visited set and
/// rejects the write if the chain reaches `staff_id` (the row being written)
/// or the manager is missing / in another organization. A visited-set hit
/// that does not involve `staff_id` means the stored chain was already
/// looping; the walk stops rather than spinning.
pub async fn ensure_no_reporting_cycle(
    pool: &sqlx::SqlitePool,
    organization_id: &str,
    staff_id: &str,
    new_reports_to: Option<&str>,
) -> Result<(), AppError> {
    let mut current = match new_reports_to {
        Some(id) => id.to_string(),
        None => return Ok(()),
    };

    let mut visited: HashSet<String> = HashSet::new();

    loop {
        if current == staff_id {
            return Err(AppError::Validation(
                "Reporting chain would form a cycle".to_string(),
            ));
        }
        if !visited.insert(current.clone()) {
            return Ok(());
        }

        let manager = db::staff::find_by_id(pool, &current)
            .await?
            .ok_or_else(|| AppError::Validation("Unknown reports_to staff id".to_string()))?;

        if manager.organization_id != organization_id {
            return Err(AppError::Validation(
                "reports_to must reference staff in the same organization".to_string(),
            ));
        }

        match manager.reports_to {
            Some(next) => current = next,
            None => return Ok(()),
        }
    }
}
