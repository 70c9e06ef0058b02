use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::HttpServerClient;
use crate::app::App;
use crate::config::KeyResolver;

mod api;
mod app;
mod cli;
mod commands;
mod config;
mod form;
mod modal;
mod search;
mod servers;
mod theme;
mod tui;
mod ui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting lazyserver");

    let args = cli::Args::parse();

    let mut config = config::load()?;
    if let Some(url) = &args.api_url {
        config.api.base_url.clone_from(url);
    }
    if let Some(name) = &args.theme {
        config.theme.name.clone_from(name);
    }
    info!(base_url = %config.api.base_url, "Using server backend");

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme = theme::theme_from_name(&config.theme.name);
    let api = Arc::new(HttpServerClient::new(&config.api)?);

    let mut app = App::new(api, &config, resolver, theme);
    app.apply_cli_args(&args);
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("lazyserver").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "lazyserver.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
