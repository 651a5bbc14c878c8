//! Mapping of planning failures onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nofly_core::{InterchangeError, RouteError};
use serde_json::json;
use thiserror::Error;

use crate::runner::RunError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Interchange(#[from] InterchangeError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("malformed request body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("route computation exceeded the {0} ms deadline")]
    TimedOut(u128),

    #[error("zone '{0}' not found")]
    ZoneNotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl From<RunError> for ApiError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Route(err) => Self::Route(err),
            RunError::TimedOut(deadline) => Self::TimedOut(deadline.as_millis()),
            RunError::Worker(message) => Self::Internal(message),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Interchange(_) | Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::Route(err) => route_status(err),
            Self::TimedOut(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ZoneNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Interchange(_) | Self::Body(_) => "invalid_request",
            Self::Route(err) => err.code(),
            Self::TimedOut(_) => "timeout",
            Self::ZoneNotFound(_) => "zone_not_found",
            Self::Internal(_) => "internal",
        }
    }
}

fn route_status(err: &RouteError) -> StatusCode {
    match err {
        RouteError::GeometryInvalid(_)
        | RouteError::UnknownEllipsoid(_)
        | RouteError::InvalidBufferDistance(_)
        | RouteError::InvalidPosition { .. } => StatusCode::BAD_REQUEST,
        RouteError::PointBlocked
        | RouteError::EnclosedStart
        | RouteError::EnclosedFinish
        | RouteError::NoPathFound => StatusCode::UNPROCESSABLE_ENTITY,
        RouteError::VertexLimitExceeded { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        RouteError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(code = self.code(), "{}", self);
        } else {
            tracing::debug!(code = self.code(), "{}", self);
        }
        let body = json!({ "error": self.code(), "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}
