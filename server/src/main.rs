use anyhow::Context;
use clap::{Parser, ValueEnum};
use dashboard_server::build_router;
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use worklog_dashboard::{config, ApplicationRuntimeBuilder};

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Serves the worklog dashboard API and fetches the worklogs from Jira once a day
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Configuration file, overrides the WORKLOG_DASHBOARD_CONFIG environment variable
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the configuration
    #[arg(short, long)]
    bind: Option<String>,

    #[arg(short, long)]
    verbosity: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(opts.verbosity.map_or(
        "info",
        |lvl| match lvl {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        },
    )))
    .init();

    let config = config::load(opts.config.as_deref())?;
    let bind = opts.bind.unwrap_or_else(|| config.server.bind.clone());
    let runtime = Arc::new(ApplicationRuntimeBuilder::new().with_config(config).build()?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = {
        let runtime = runtime.clone();
        tokio::spawn(async move { runtime.run_schedule(shutdown_rx).await })
    };

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Unable to listen on {bind}"))?;
    info!("Listening on {bind}");

    axum::serve(listener, build_router(runtime))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    scheduler.await?;
    Ok(())
}
