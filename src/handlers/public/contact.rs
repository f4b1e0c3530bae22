// handlers/public/contact.rs - POST /contact/ handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::utils::validate_email;
use crate::middleware::{ApiResponse, ApiResult};
use crate::reports::ValidationError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactReceipt {
    pub message: &'static str,
    pub admin_email: String,
}

impl ContactMessage {
    fn validate(&self) -> Result<(), ValidationError> {
        check_length("name", &self.name, 1, 100)?;
        validate_email("email", &self.email)?;
        check_length("message", &self.message, 10, 1000)
    }
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::new(
            field,
            format!("must be between {} and {} characters", min, max),
        ));
    }
    Ok(())
}

/// POST /contact/ - record a message for the administrator. Nothing is delivered.
pub async fn contact_post(
    State(state): State<AppState>,
    payload: Result<Json<ContactMessage>, JsonRejection>,
) -> ApiResult<ContactReceipt> {
    let Json(message) = payload?;
    message.validate()?;

    info!(name = %message.name, email = %message.email, "Contact message: {}", message.message);
    Ok(ApiResponse::success(ContactReceipt {
        message: "Your message has been sent successfully",
        admin_email: state.config.contact.admin_email.clone(),
    }))
}
