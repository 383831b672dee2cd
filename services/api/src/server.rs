use crate::cli::ServeArgs;
use crate::infra::{ensure_super_user, open_desk, AppState};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use intern_desk::config::AppConfig;
use intern_desk::error::AppError;
use intern_desk::telemetry;
use intern_desk::workflows::desk_router;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let desk = open_desk(&config.storage);
    ensure_super_user(&desk, &config.storage.super_user)?;

    let app = with_operational_routes(desk_router(Arc::new(desk)))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        state_path = %config.storage.state_path.display(),
        "intern desk ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
