use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Global user tier, distinct from per-organization staff roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")] // Serialize as lowercase string
#[strum(serialize_all = "lowercase")] // Display/FromStr as lowercase string
pub enum GlobalRole {
    Public,
    Partner,
    Investor,
    Viewer,
    Admin,
    Ceo,
}

impl GlobalRole {
    /// Admin-tier roles may edit any deal and change global roles.
    pub fn is_admin_tier(&self) -> bool {
        matches!(self, GlobalRole::Admin | GlobalRole::Ceo)
    }

    /// Public-tier users are limited to owning a single organization.
    pub fn owned_organization_limit(&self) -> Option<i64> {
        match self {
            GlobalRole::Public => Some(1),
            _ => None,
        }
    }
}
