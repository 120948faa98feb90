//! Error Types
//!
//! `TeoError` is everything that can go wrong between building a client and
//! decoding the remote answer. `AppError` is its HTTP face: every failure is
//! a "remote call failed" and is rendered in the remote's own error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Errors raised while calling the EdgeOne API
#[derive(Debug, Error)]
pub enum TeoError {
    /// A required credential env var is absent
    #[error("{0} is not set")]
    MissingCredential(&'static str),

    /// An optional setting could not be parsed
    #[error("invalid value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },

    /// The configured endpoint is not a usable URL
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request never produced a response
    #[error("{action} request failed: {source}")]
    Transport {
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx status without a decodable response envelope
    #[error("{action} returned HTTP {status}: {body}")]
    HttpStatus {
        action: &'static str,
        status: u16,
        body: String,
    },

    /// The remote API answered with `Response.Error`
    #[error("[{code}] {message} (RequestId: {request_id})")]
    Api {
        code: String,
        message: String,
        request_id: String,
    },

    /// The remote answer was not the expected JSON
    #[error("failed to decode {action} response: {source}")]
    Decode {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The outbound payload could not be serialized
    #[error("failed to encode {action} request: {source}")]
    Encode {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl TeoError {
    /// Error code in the remote API's vocabulary.
    ///
    /// Remote errors keep their own code; local failures use `ClientError.*`.
    pub fn code(&self) -> &str {
        match self {
            TeoError::Api { code, .. } => code,
            TeoError::MissingCredential(_) => "AuthFailure.MissingCredential",
            TeoError::InvalidConfig { .. } | TeoError::InvalidEndpoint { .. } => {
                "ClientError.InvalidConfig"
            }
            TeoError::ClientBuild(_) | TeoError::Transport { .. } => "ClientError.NetworkError",
            TeoError::HttpStatus { .. } => "ClientError.HttpStatusCodeError",
            TeoError::Decode { .. } => "ClientError.DecodeError",
            TeoError::Encode { .. } => "ClientError.EncodeError",
        }
    }

    /// Remote request id, when the remote got far enough to assign one
    pub fn request_id(&self) -> Option<&str> {
        match self {
            TeoError::Api { request_id, .. } => Some(request_id),
            _ => None,
        }
    }

    /// Human-readable message; the remote's own text for remote errors
    pub fn message(&self) -> String {
        match self {
            TeoError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================
// HTTP boundary
// ============================================================

/// Handler error: a failed remote call
#[derive(Debug)]
pub struct AppError(pub TeoError);

impl From<TeoError> for AppError {
    fn from(err: TeoError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = self.0;
        warn!(code = err.code(), "Remote call failed: {}", err);

        let body = json!({
            "Error": {
                "Code": err.code(),
                "Message": err.message(),
            },
            "RequestId": err.request_id(),
        });

        (StatusCode::BAD_GATEWAY, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
