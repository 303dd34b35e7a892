mod args;
mod config;
mod dirs;

use std::io;
use std::net::SocketAddr;

use http_api::HttpState;
use tracing_subscriber::EnvFilter;
use tracker_app::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;
    if args.help {
        args::print_help();
        return Ok(());
    }

    init_logging();

    let loaded = config::load_or_create().map_err(io::Error::other)?;
    if loaded.created {
        tracing::info!(file = %loaded.file.display(), "created default config");
    }
    let mut app_config = loaded.config.app_config();
    app_config
        .apply_env_overrides()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
    tracing::info!(
        claude_data_path = %app_config.claude_data_path.display(),
        db_path = %app_config.db_path.display(),
        "configuration loaded"
    );

    let app_state = AppState::new(app_config);
    app_state
        .setup_db()
        .map_err(|err| io::Error::other(format!("failed to initialize database: {err}")))?;

    if args.once {
        let ingest = app_state.services.ingest.clone();
        let stats = tokio::task::spawn_blocking(move || ingest.run()).await??;
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let import_state = app_state.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(err) = import_state.services.ingest.background_import() {
            tracing::error!(error = %err, "startup import failed");
        }
    });

    let watch_state = app_state.clone();
    match tokio::task::spawn_blocking(move || watch_state.services.ingest.start_watcher()).await? {
        Ok(true) => {}
        Ok(false) => tracing::warn!("watcher not running; /api/refresh will retry"),
        Err(err) => tracing::error!(error = %err, "failed to start watcher"),
    }

    let port = args.port.unwrap_or(loaded.config.port);
    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    if used_fallback {
        tracing::warn!(port, actual_port, "configured port unavailable, using fallback");
    }
    println!("TokenBoard is running at http://127.0.0.1:{actual_port}");
    println!("Press Ctrl+C to stop.");

    let router = http_api::router(HttpState::new(app_state.clone()));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let ingest = app_state.services.ingest.clone();
    tokio::task::spawn_blocking(move || ingest.stop_watcher()).await?;
    tracing::info!("shut down");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}
