use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Missing credential: {0} is not configured")]
    MissingCredential(&'static str),

    #[error("Upstream error{}: {message}", status_suffix(.status))]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("Local photo source unavailable: {0}")]
    LocalSourceUnavailable(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

impl AppError {
    /// Builds an upstream error from a non-success HTTP status
    pub fn upstream(status: reqwest::StatusCode, message: impl Into<String>) -> Self {
        AppError::Upstream {
            status: Some(status.as_u16()),
            message: message.into(),
        }
    }

    /// Upstream error for a call that did not finish within its deadline
    pub fn timed_out(what: &str, after: std::time::Duration) -> Self {
        AppError::Upstream {
            status: None,
            message: format!("{} timed out after {:?}", what, after),
        }
    }

    /// HTTP status the error maps to when it reaches a client
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::LocalSourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::MissingCredential(_)
            | AppError::HttpClient(_)
            | AppError::MalformedResponse(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
