use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Contract lifecycle: draft → pending → sent → signed.
/// Transitions only move forward; any backward move is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContractStatus {
    Draft,
    Pending,
    Sent,
    Signed,
}

impl ContractStatus {
    fn order(&self) -> u8 {
        match self {
            ContractStatus::Draft => 0,
            ContractStatus::Pending => 1,
            ContractStatus::Sent => 2,
            ContractStatus::Signed => 3,
        }
    }

    pub fn can_transition_to(&self, next: ContractStatus) -> bool {
        next.order() > self.order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_only() {
        assert!(ContractStatus::Draft.can_transition_to(ContractStatus::Pending));
        assert!(ContractStatus::Draft.can_transition_to(ContractStatus::Sent));
        assert!(ContractStatus::Pending.can_transition_to(ContractStatus::Signed));
        assert!(!ContractStatus::Signed.can_transition_to(ContractStatus::Draft));
        assert!(!ContractStatus::Sent.can_transition_to(ContractStatus::Pending));
        assert!(!ContractStatus::Draft.can_transition_to(ContractStatus::Draft));
    }
}
