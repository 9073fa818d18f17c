pub mod core;
pub mod issue;
pub mod user;
pub mod worklog;
