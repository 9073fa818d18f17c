use std::sync::Arc;
use worklog_dashboard::config::AppConfiguration;
use worklog_dashboard::source::TaskSource;
use worklog_dashboard::{error::WorklogError, ApplicationRuntime, ApplicationRuntimeBuilder};

/// Creates a test runtime with the default roster, kept in memory, using the supplied source
pub fn create_test_runtime(
    source: Arc<dyn TaskSource>,
) -> Result<Arc<ApplicationRuntime>, WorklogError> {
    let _ = env_logger::builder().is_test(true).try_init();

    let runtime = ApplicationRuntimeBuilder::new()
        .with_config(AppConfiguration::default())
        .use_in_memory_db()
        .with_task_source(source)
        .build()?;
    Ok(Arc::new(runtime))
}

/// Creates a test runtime without any Jira client
pub fn create_unconfigured_runtime() -> Result<Arc<ApplicationRuntime>, WorklogError> {
    let _ = env_logger::builder().is_test(true).try_init();

    let runtime = ApplicationRuntimeBuilder::new()
        .with_config(AppConfiguration::default())
        .use_in_memory_db()
        .without_task_source()
        .build()?;
    Ok(Arc::new(runtime))
}
