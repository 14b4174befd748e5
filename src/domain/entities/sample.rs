use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field '{0}' is required")]
    MissingField(&'static str),
    #[error("field '{0}' must be a finite number")]
    NonFinite(&'static str),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Inbound metric payload as it arrives on the wire.
///
/// Every field is optional here so that absence can be reported as a
/// validation failure instead of a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// A validated, immutable metric sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    name: String,
    value: f64,
    timestamp: i64,
}

impl MetricSample {
    /// Build a sample, applying the same rules as the ingestion endpoint.
    ///
    /// Zero values count as missing: the wire contract cannot distinguish an
    /// explicit `0` from an omitted field.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is empty, or if the value or
    /// timestamp is zero or not finite.
    pub fn new(name: impl Into<String>, value: f64, timestamp: i64) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if value.is_nan() || value.is_infinite() {
            return Err(ValidationError::NonFinite("value"));
        }
        if value == 0.0 {
            return Err(ValidationError::MissingField("value"));
        }
        if timestamp == 0 {
            return Err(ValidationError::MissingField("timestamp"));
        }
        Ok(Self {
            name,
            value,
            timestamp,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl TryFrom<IngestRequest> for MetricSample {
    type Error = ValidationError;

    fn try_from(request: IngestRequest) -> Result<Self, Self::Error> {
        let name = request.name.ok_or(ValidationError::MissingField("name"))?;
        let value = request.value.ok_or(ValidationError::MissingField("value"))?;
        let timestamp = request
            .timestamp
            .ok_or(ValidationError::MissingField("timestamp"))?;
        Self::new(name, value, timestamp)
    }
}
