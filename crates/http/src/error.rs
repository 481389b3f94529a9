//! Error handling for the libris HTTP layer

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use libris_db::StoreError;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::validation::escape_html;

/// Everything the error page shows about a failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    pub code: String,
    pub trace_id: String,
    pub timestamp: String,
}

impl ErrorBody {
    /// Render as a standalone HTML page. All values are escaped.
    pub fn to_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{status} {message}</title></head>\n<body>\n<h1>{message}</h1>\n<h2>{status}</h2>\n<p><small>{code} &middot; error id {trace_id} &middot; {timestamp}</small></p>\n<p><a href=\"/catalog\">Back to the catalog</a></p>\n</body>\n</html>\n",
            status = self.status,
            message = escape_html(&self.message),
            code = escape_html(&self.code),
            trace_id = escape_html(&self.trace_id),
            timestamp = escape_html(&self.timestamp),
        )
    }
}

/// Request failures that escape a handler
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc().to_string();
        let status = self.status();

        let (error_code, message) = match self {
            AppError::NotFound { message, code } | AppError::BadRequest { message, code } => {
                (code, message)
            }
            AppError::Store(e) => ("store_error".to_string(), e.to_string()),
            AppError::Internal(e) => ("internal_error".to_string(), format!("{e:#}")),
        };

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                error = %message,
                "Request error"
            );
        } else {
            tracing::info!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                "Request error"
            );
        }

        // Internal details stay in the log for release builds
        let message = if cfg!(not(debug_assertions)) && status.is_server_error() {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        let body = ErrorBody {
            status: status.as_u16(),
            message,
            code: error_code,
            trace_id: error_id.to_string(),
            timestamp,
        };

        (status, Html(body.to_html())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_db::RecordId;

    #[test]
    fn test_not_found_constructor() {
        match AppError::not_found("Book copy not found") {
            AppError::NotFound { code, message } => {
                assert_eq!(code, "not_found");
                assert_eq!(message, "Book copy not found");
            }
            other => panic!("Expected NotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_response_mapping() {
        let response = AppError::not_found("Resource not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::bad_request("bad form").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_error_mapping() {
        let error: AppError = StoreError::DuplicateId {
            collection: "genres",
            id: RecordId::from("abc"),
        }
        .into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_error_mapping() {
        let error = AppError::Internal(anyhow::anyhow!("template missing"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_page_escapes_message() {
        let body = ErrorBody {
            status: 404,
            message: "<script>".to_string(),
            code: "not_found".to_string(),
            trace_id: "id".to_string(),
            timestamp: "now".to_string(),
        };
        let html = body.to_html();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
