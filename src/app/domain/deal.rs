use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Per-deal visibility tier, independent of organization membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Confidentiality {
    Public,
    Private,
    Confidential,
}

/// Deal lifecycle. Transitions are enforced forward-only:
/// pending → accepted | rejected, accepted → completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DealStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl DealStatus {
    pub fn can_transition_to(&self, next: DealStatus) -> bool {
        matches!(
            (self, next),
            (DealStatus::Pending, DealStatus::Accepted)
                | (DealStatus::Pending, DealStatus::Rejected)
                | (DealStatus::Accepted, DealStatus::Completed)
        )
    }
}

/// Status of one participant on a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParticipantStatus {
    Pending,
    Accepted,
    Rejected,
}
