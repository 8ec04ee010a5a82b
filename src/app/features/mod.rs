pub mod auth;
pub mod contracts;
pub mod deals;
pub mod guests;
pub mod organizations;
pub mod staff;
pub mod tasks;
pub mod users;
