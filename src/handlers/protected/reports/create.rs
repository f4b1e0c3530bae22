// handlers/protected/reports/create.rs - POST /reports/ handler

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Extension;
use tracing::info;

use crate::database::models::{NewReport, Report};
use crate::error::ApiError;
use crate::media::{MediaError, MediaKind};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::reports::{ReportForm, ValidationError};
use crate::state::AppState;

const MEDIA_FIELD: &str = "media";

struct Upload {
    bytes: Bytes,
    content_type: String,
    filename: Option<String>,
}

/// POST /reports/ - multipart upload of one media file plus report fields
///
/// Every field is read and validated before anything touches the upload directory.
pub async fn report_post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Report> {
    let mut multipart = multipart?;
    let mut form = ReportForm::default();
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == MEDIA_FIELD {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| oversize_or_rejection(&state, &content_type, e))?;
            upload = Some(Upload { bytes, content_type, filename });
        } else {
            form.set(&name, field.text().await?);
        }
    }

    let submission = form.validate()?;
    let upload = upload.ok_or_else(|| ValidationError::new(MEDIA_FIELD, "field required"))?;

    let stored = state
        .media
        .ingest(upload.bytes, &upload.content_type, upload.filename.as_deref())
        .await?;

    let device_info = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("Unknown")
        .to_string();

    let new_report = NewReport {
        user_id: user.id,
        media_type: stored.kind.as_str().to_string(),
        media_path: stored.media_path.clone(),
        thumbnail_path: stored.thumbnail_path.clone(),
        description: submission.description,
        behavior_rating: submission.behavior_rating,
        severity_index: submission.severity_index,
        latitude: submission.latitude,
        longitude: submission.longitude,
        device_info: Some(device_info),
        camera_used: submission.camera_used.map(|c| c.as_str().to_string()),
    };

    let report = match state.reports().insert(new_report).await {
        Ok(report) => report,
        Err(e) => {
            // Don't leave files behind for a row that was never written
            state.media.remove(&stored.media_path).await;
            if let Some(thumb) = &stored.thumbnail_path {
                state.media.remove(thumb).await;
            }
            return Err(e.into());
        }
    };

    info!(
        "User {} created report {} ({}, thumbnail: {})",
        user.id,
        report.id,
        report.media_type,
        report.thumbnail_path.is_some()
    );
    Ok(ApiResponse::created(report))
}

/// A body cut off by the request limit is reported against the declared kind's ceiling.
fn oversize_or_rejection(state: &AppState, content_type: &str, err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let kind = MediaKind::classify(content_type);
        MediaError::PayloadTooLarge { kind, ceiling: state.media.ceiling(kind) }.into()
    } else {
        err.into()
    }
}
