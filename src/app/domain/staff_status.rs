use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Staff membership status. Only `active` rows grant access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StaffStatus {
    Active,
    Pending,
}
