pub mod donation;
pub mod permission;
pub mod report;
pub mod request;
pub mod role;
pub mod user;
