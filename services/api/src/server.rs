use crate::cli::ServeArgs;
use crate::infra::{policy_from, AppState};
use crate::routes::with_seller_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sea_merkado::config::AppConfig;
use sea_merkado::error::AppError;
use sea_merkado::telemetry;
use sea_merkado::workflows::sellers::MemorySellerStore;
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

    let policy = policy_from(&config);
    let store = MemorySellerStore::shared(policy);

    let app = with_seller_routes(store)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        deadline_days = policy.deadline_days(),
        "seller store api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
