pub mod access_level;
pub mod contract_status;
pub mod deal;
pub mod email;
pub mod global_role;
pub mod guest_code;
pub mod organization_id;
pub mod password;
pub mod staff_status;
pub mod task;
pub mod user_id;

pub use access_level::AccessLevel;
pub use contract_status::ContractStatus;
pub use deal::{Confidentiality, DealStatus, ParticipantStatus};
pub use email::Email;
pub use global_role::GlobalRole;
pub use guest_code::GuestCode;
pub use organization_id::OrganizationId;
pub use password::{HashedPassword, Password};
pub use staff_status::StaffStatus;
pub use task::{TaskPriority, TaskStatus};
pub use user_id::UserId;
