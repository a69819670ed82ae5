// src/handlers/error.rs
use std::fmt;
use warp::http::StatusCode;
use warp::reject::Reject;

use crate::error::PolicyError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApiErrorKind {
    Configuration,
    DataUnavailable,
    Upstream,
    Internal,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        ApiError {
            kind: ApiErrorKind::Internal,
            message: message.into(),
        }
    }

    pub fn data_error(message: impl Into<String>) -> Self {
        ApiError {
            kind: ApiErrorKind::DataUnavailable,
            message: message.into(),
        }
    }

    pub fn external_error(message: impl Into<String>) -> Self {
        ApiError {
            kind: ApiErrorKind::Upstream,
            message: message.into(),
        }
    }

    pub fn configuration_error(message: impl Into<String>) -> Self {
        ApiError {
            kind: ApiErrorKind::Configuration,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ApiErrorKind::DataUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            ApiErrorKind::Configuration | ApiErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<&PolicyError> for ApiError {
    fn from(err: &PolicyError) -> Self {
        match err {
            PolicyError::Configuration(_) => ApiError::configuration_error(err.to_string()),
            PolicyError::DataUnavailable(_) => ApiError::data_error(err.to_string()),
            PolicyError::Source(_) => ApiError::external_error(err.to_string()),
            PolicyError::Cache(_) | PolicyError::Payload(_) => ApiError::new(err.to_string()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}
