use crate::twilio_client::ClientError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed input on one of the JSON endpoints.
    #[error("{0}")]
    Validation(String),
    /// Twilio or Numverify failed; the adapter's message is passed through untouched.
    #[error(transparent)]
    Upstream(#[from] ClientError),
    /// Inbound webhook called without the fields Twilio always sends.
    #[error("{0}")]
    WebhookInput(String),
    /// Anything that went wrong while composing an inbound-message reply.
    #[error("{0}")]
    Webhook(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::WebhookInput(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::Webhook(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() {
            error!(error = %message, "request failed");
        } else {
            warn!(error = %message, "rejected request");
        }

        // Webhook failures use Twilio-facing status/message bodies, never TwiML.
        let body = match self {
            AppError::WebhookInput(_) | AppError::Webhook(_) => {
                json!({ "status": "error", "message": message })
            }
            AppError::Validation(_) | AppError::Upstream(_) => json!({ "error": message }),
        };
        (status, Json(body)).into_response()
    }
}
