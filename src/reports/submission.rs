use std::fmt;
use std::str::FromStr;

use super::ValidationError;

pub const MAX_DESCRIPTION_WORDS: usize = 150;

/// Where the media was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraSource {
    Front,
    Environment,
    Upload,
}

impl CameraSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraSource::Front => "front",
            CameraSource::Environment => "environment",
            CameraSource::Upload => "upload",
        }
    }
}

impl fmt::Display for CameraSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraSource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(CameraSource::Front),
            "environment" => Ok(CameraSource::Environment),
            "upload" => Ok(CameraSource::Upload),
            other => Err(ValidationError::new(
                "camera_used",
                format!("must be one of front, environment, upload (got '{}')", other),
            )),
        }
    }
}

/// Raw text fields of a report upload, as they arrive in the multipart body.
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    pub description: Option<String>,
    pub behavior_rating: Option<String>,
    pub severity_index: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub camera_used: Option<String>,
}

/// Validated report fields, ready for ingestion and insert.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSubmission {
    pub description: String,
    pub behavior_rating: i64,
    pub severity_index: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub camera_used: Option<CameraSource>,
}

impl ReportForm {
    /// Assign a multipart text field by name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "description" => &mut self.description,
            "behavior_rating" => &mut self.behavior_rating,
            "severity_index" => &mut self.severity_index,
            "latitude" => &mut self.latitude,
            "longitude" => &mut self.longitude,
            "camera_used" => &mut self.camera_used,
            _ => return,
        };
        *slot = Some(value);
    }

    pub fn validate(self) -> Result<ReportSubmission, ValidationError> {
        let description = self
            .description
            .ok_or_else(|| ValidationError::new("description", "field required"))?;
        if description.split_whitespace().count() > MAX_DESCRIPTION_WORDS {
            return Err(ValidationError::new(
                "description",
                format!("Description must not exceed {} words", MAX_DESCRIPTION_WORDS),
            ));
        }

        let behavior_rating = required_int("behavior_rating", self.behavior_rating, 1, 5)?;
        let severity_index = required_int("severity_index", self.severity_index, 0, 100)?;
        let latitude = optional_coordinate("latitude", self.latitude, 90.0)?;
        let longitude = optional_coordinate("longitude", self.longitude, 180.0)?;
        let camera_used = match non_blank(self.camera_used) {
            Some(raw) => Some(raw.parse::<CameraSource>()?),
            None => None,
        };

        Ok(ReportSubmission {
            description,
            behavior_rating,
            severity_index,
            latitude,
            longitude,
            camera_used,
        })
    }
}

// Browsers send empty strings for untouched optional inputs.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required_int(field: &str, raw: Option<String>, min: i64, max: i64) -> Result<i64, ValidationError> {
    let raw = non_blank(raw).ok_or_else(|| ValidationError::new(field, "field required"))?;
    let value: i64 = raw
        .parse()
        .map_err(|_| ValidationError::new(field, "must be an integer"))?;
    if value < min || value > max {
        return Err(ValidationError::new(field, format!("must be between {} and {}", min, max)));
    }
    Ok(value)
}

fn optional_coordinate(field: &str, raw: Option<String>, bound: f64) -> Result<Option<f64>, ValidationError> {
    let Some(raw) = non_blank(raw) else { return Ok(None) };
    let value: f64 = raw
        .parse()
        .map_err(|_| ValidationError::new(field, "must be a number"))?;
    if !value.is_finite() || value < -bound || value > bound {
        return Err(ValidationError::new(field, format!("must be between {} and {}", -bound, bound)));
    }
    Ok(Some(value))
}
