pub mod common;
pub mod fixtures;
pub mod task_source;
