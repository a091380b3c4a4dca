use std::sync::Arc;

use backend_domain::ports::{BattleReportRepository, HealthCheckService};
use backend_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub report_repo: Arc<dyn BattleReportRepository>,
    pub health: Arc<dyn HealthCheckService>,
    pub metrics: Arc<Metrics>,
}
