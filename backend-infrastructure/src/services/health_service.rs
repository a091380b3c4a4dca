use std::sync::Arc;

use async_trait::async_trait;
use backend_domain::ports::HealthCheckService;
use backend_domain::BattleReportRepository;

pub struct DefaultHealthService {
    report_repo: Arc<dyn BattleReportRepository>,
}

impl DefaultHealthService {
    pub fn new(report_repo: Arc<dyn BattleReportRepository>) -> Self {
        Self { report_repo }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_database(&self) -> anyhow::Result<bool> {
        self.report_repo.ping().await.map(|_| true)
    }
}
