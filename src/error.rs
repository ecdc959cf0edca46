use opentelemetry_semantic_conventions::{attribute::OTEL_STATUS_CODE, trace::ERROR_TYPE};
use rocket::http::{Status, StatusClass};
use rocket::response::status::Custom;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Span, error, field, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> Status {
        match self {
            AppError::Database(_) | AppError::Internal(_) => Status::InternalServerError,
            AppError::Authentication(_) => Status::Unauthorized,
            AppError::Authorization(_) => Status::Forbidden,
            AppError::NotFound(_) => Status::NotFound,
            AppError::Validation(_) => Status::BadRequest,
            AppError::Conflict(_) => Status::Conflict,
        }
    }

    /// Value recorded as `error.type` on the request span.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Authentication(_) => "authentication_error",
            AppError::Authorization(_) => "authorization_error",
            AppError::NotFound(_) => "not_found_error",
            AppError::Validation(_) => "validation_error",
            AppError::Conflict(_) => "conflict_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Text a coach may see. Store and crypto failures stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => {
                "Something went wrong, please try again.".to_string()
            }
            AppError::Authentication(_) => "Please log in to continue.".to_string(),
            AppError::Authorization(_) => {
                "You do not have permission to view this page.".to_string()
            }
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::Conflict(msg) => {
                msg.clone()
            }
        }
    }

    fn is_server_error(&self) -> bool {
        self.status_code().class() == StatusClass::ServerError
    }

    pub fn log_and_record(&self, ctx: &str) {
        if self.is_server_error() {
            error!(error = %self, context = %ctx, kind = self.kind(), "Request failed");
        } else {
            warn!(error = %self, context = %ctx, kind = self.kind(), "Request rejected");
        }

        let span = Span::current();
        if span.is_none() {
            return;
        }

        span.record("error", field::display(true));
        span.record(ERROR_TYPE, field::display(self.kind()));
        span.record("error.message", field::display(self));
        if self.is_server_error() {
            span.record(OTEL_STATUS_CODE, field::display("ERROR"));
        }
    }
}

/// Body rendered for errors that do not end the session.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorView {
    pub error: String,
    pub message: String,
}

impl From<&AppError> for ErrorView {
    fn from(err: &AppError) -> Self {
        Self {
            error: err.status_code().reason_lossy().to_string(),
            message: err.public_message(),
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        self.log_and_record(&format!("{} {}", req.method(), req.uri()));

        match self {
            // Left to the 401/403 catchers, which end the session and render
            // the access-denied view.
            AppError::Authentication(_) | AppError::Authorization(_) => Err(self.status_code()),
            _ => Custom(self.status_code(), Json(ErrorView::from(&self))).respond_to(req),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("Password hashing failed: {}", error))
    }
}
