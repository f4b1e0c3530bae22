// handlers/protected/reports/list.rs - GET /reports/ handler

use axum::extract::{rejection::QueryRejection, Query, State};
use axum::Extension;

use crate::database::models::Report;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::reports::{ListReportsParams, ReportQuery};
use crate::state::AppState;

/// GET /reports/ - the caller's reports, filtered, sorted and paginated
pub async fn reports_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    params: Result<Query<ListReportsParams>, QueryRejection>,
) -> ApiResult<Vec<Report>> {
    let Query(params) = params?;
    let query = ReportQuery::from_params(params)?;
    let reports = state.reports().list(user.id, &query).await?;
    Ok(ApiResponse::success(reports))
}
