//! Horizon - An eye-rest reminder
//!
//! This is the main entry point for the horizon application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use horizon::{
    api::create_router,
    config::Config,
    overlay::{LogSurfaceFactory, OverlayCoordinator, StaticDisplays},
    scheduler::BreakScheduler,
    services::alerts::alert_sink,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("horizon={},tower_http=info", config.log_level()))
        .init();

    info!("Starting horizon v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: work={}s, break={}s, displays={}",
          config.work, config.break_seconds, config.displays.len());

    let scheduler = BreakScheduler::new(
        config.scheduler_config()?,
        alert_sink(config.alert_command.as_deref()),
    );
    let overlays = Arc::new(OverlayCoordinator::new(
        Arc::new(StaticDisplays::new(config.displays.clone())),
        Arc::new(LogSurfaceFactory),
    ));

    // Wires the overlays to break start/end
    let state = Arc::new(AppState::new(scheduler, overlays, config.host.clone(), config.port));

    if config.autostart {
        state.perform("autostart", |scheduler| scheduler.start());
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control API running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start   - Start the work timer");
    info!("  POST /stop    - Stop the timer");
    info!("  POST /toggle  - Start or stop the timer");
    info!("  POST /skip    - Skip the current break");
    info!("  POST /quit    - Shut down");
    info!("  PUT  /config  - Change durations while stopped");
    info!("  GET  /status  - Current phase and countdown");
    info!("  GET  /health  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
        _ = state.quit_requested() => {
            info!("Quit requested");
        }
    }

    // Ends any break in progress, which dismisses the overlays
    state.scheduler.stop();
    state.overlays.dismiss();

    info!("Shutdown complete");
    Ok(())
}
