// handlers/protected/reports/record.rs - GET and DELETE /reports/:id handlers

use axum::extract::{rejection::PathRejection, Path, State};
use axum::Extension;
use tracing::info;

use crate::database::models::Report;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// GET /reports/:id - 404 unless the caller owns the report
pub async fn report_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Report> {
    let Path(id) = id?;
    let report = state.reports().find_owned(user.id, id).await?;
    Ok(ApiResponse::success(report))
}

/// DELETE /reports/:id - drop the row, then remove its files best-effort
pub async fn report_delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let report = state.reports().delete_owned(user.id, id).await?;

    state.media.remove(&report.media_path).await;
    if let Some(thumb) = &report.thumbnail_path {
        state.media.remove(thumb).await;
    }

    info!("User {} deleted report {}", user.id, report.id);
    Ok(ApiResponse::no_content())
}
