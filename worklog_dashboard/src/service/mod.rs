pub mod assignee_service;
pub mod dashboard_service;
pub mod worklog_service;
