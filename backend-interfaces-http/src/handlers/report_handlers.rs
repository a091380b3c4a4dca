use axum::extract::{Query, State};
use axum::Json;

use backend_application::dtos::ReportListItem;
use backend_application::queries::report_queries;
use backend_application::AppState;
use backend_domain::{CursorPage, ReportListQuery};

use crate::error::HttpError;

pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<CursorPage<ReportListItem>>, HttpError> {
    let page = report_queries::list_reports(&state, query).await?;
    Ok(Json(page))
}
