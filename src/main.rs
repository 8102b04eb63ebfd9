use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use twin_onboard::cli::{run_repl, stdin_lines};
use twin_onboard::config::ServiceConfig;
use twin_onboard::onboarding::{OnboardingRouteState, onboarding_routes};
use twin_onboard::store::open_store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load().context("Invalid TWIN_ONBOARD_* configuration")?;
    let _log_guard = init_tracing(&config);
    let cli_mode = std::env::args().skip(1).any(|arg| arg == "--cli");

    eprintln!("🪞 Twin Onboard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/onboarding/twin", config.port);
    eprintln!("   Database: {}", config.db_path.display());

    // ── Draft store ─────────────────────────────────────────────────────
    let store = open_store(&config)
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;

    let state = OnboardingRouteState::open(store, &config.user_id).await;
    let app = onboarding_routes(state.clone());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, user_id = %config.user_id, "Onboarding API started");

    if cli_mode {
        eprintln!("   Type your answers. /status, /reset, /confirm, /quit\n");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP server stopped: {}", e);
            }
        });
        let mut stdout = std::io::stdout();
        run_repl(state.interview, stdin_lines(), &mut stdout).await?;
    } else {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c().await.ok();
                tracing::info!("Shutting down");
            })
            .await?;
    }

    Ok(())
}

/// Log to stderr, and additionally to a daily-rolling file when a log
/// directory is configured. The returned guard must outlive `main`'s work.
fn init_tracing(config: &ServiceConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(dir, "twin-onboard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}
