use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use backend_application::AppState;

use crate::handlers::{governor_handlers, ingest_handlers, ops_handlers, report_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v2/ingest/records", post(ingest_handlers::ingest_records))
        .route(
            "/v2/governor/:id/pairings",
            get(governor_handlers::list_pairings),
        )
        .route(
            "/v2/governor/:id/pairings/trends",
            get(governor_handlers::pairing_trends),
        )
        .route(
            "/v2/governor/:id/pairings/enemies",
            get(governor_handlers::list_enemies),
        )
        .route(
            "/v2/governor/:id/pairings/loadouts",
            get(governor_handlers::list_loadouts),
        )
        .route("/v2/governor/:id/marches", get(governor_handlers::list_marches))
        .route("/v2/governor/:id/battle-log", get(governor_handlers::battle_log))
        .route("/v2/reports", get(report_handlers::list_reports))
        .route("/v2/ops/health/live", get(ops_handlers::health_live))
        .route("/v2/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v2/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .fallback(ops_handlers::not_found)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}
