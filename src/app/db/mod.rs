pub mod contracts;
pub mod deals;
pub mod guest_accounts;
pub mod organizations;
pub mod sessions;
pub mod staff;
pub mod tasks;
pub mod users;

pub use users::{find_by_email, NewUser, User};
