use crate::error::AppError;
use rocket::form::Form;
use rocket::Responder;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::status::Custom;
use rocket::response::{Flash, Redirect};
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ValidationResponse {
    pub status: String,
    pub errors: HashMap<String, Vec<String>>,
}

impl ValidationResponse {
    pub fn new(errors: HashMap<String, Vec<String>>) -> Self {
        Self {
            status: "error".to_string(),
            errors,
        }
    }

    pub fn with_error(field: &str, message: &str) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), vec![message.to_string()]);
        Self::new(errors)
    }
}

pub trait ToValidationResponse {
    fn to_validation_response(self) -> Custom<Json<ValidationResponse>>;
}

impl ToValidationResponse for AppError {
    #[instrument]
    fn to_validation_response(self) -> Custom<Json<ValidationResponse>> {
        self.log_and_record("Form Validation Error");
        let status = self.status_code();

        let field = match &self {
            AppError::Database(_) | AppError::Internal(_) => "server",
            AppError::Authentication(_) => "authentication",
            AppError::Authorization(_) => "authorization",
            AppError::NotFound(_) | AppError::Conflict(_) => "resource",
            AppError::Validation(_) => "validation",
        };

        Custom(
            status,
            Json(ValidationResponse::with_error(field, &self.public_message())),
        )
    }
}

#[derive(Debug)]
pub struct ValidationErrorWrapper(pub validator::ValidationErrors);

impl From<ValidationErrorWrapper> for Custom<Json<ValidationResponse>> {
    #[instrument]
    fn from(wrapper: ValidationErrorWrapper) -> Self {
        let errors = wrapper.0;
        let mut error_map = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let error_messages: Vec<String> = field_errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .clone()
                        .unwrap_or_else(|| "Invalid value".into())
                        .to_string()
                })
                .collect();

            error_map.insert(field.to_string(), error_messages);
        }

        Custom(
            Status::UnprocessableEntity,
            Json(ValidationResponse::new(error_map)),
        )
    }
}

pub trait FormValidateExt<T> {
    fn validate_custom(self) -> Result<T, Custom<Json<ValidationResponse>>>;
}

impl<T: Validate> FormValidateExt<T> for Form<T> {
    fn validate_custom(self) -> Result<T, Custom<Json<ValidationResponse>>> {
        let inner = self.into_inner();
        inner
            .validate()
            .map_err(|errors| Custom::from(ValidationErrorWrapper(errors)))?;
        Ok(inner)
    }
}

pub trait AppErrorExt<T> {
    fn validate_custom(self) -> Result<T, Custom<Json<ValidationResponse>>>;
}

impl<T> AppErrorExt<T> for Result<T, AppError> {
    fn validate_custom(self) -> Result<T, Custom<Json<ValidationResponse>>> {
        self.map_err(|e| e.to_validation_response())
    }
}

/// Ways a form submission can be turned away: a flashed message on the page
/// it came from, or field errors for the form to re-render.
#[derive(Responder)]
pub enum Rejection {
    Flashed(Flash<Redirect>),
    Invalid(Custom<Json<ValidationResponse>>),
}

impl Rejection {
    pub fn flashed(location: &'static str, message: &str) -> Self {
        Rejection::Flashed(Flash::error(Redirect::to(location), message))
    }
}

impl From<Custom<Json<ValidationResponse>>> for Rejection {
    fn from(response: Custom<Json<ValidationResponse>>) -> Self {
        Rejection::Invalid(response)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FlashView {
    pub kind: String,
    pub message: String,
}

impl FlashView {
    pub fn from_message(flash: Option<FlashMessage<'_>>) -> Option<Self> {
        flash.map(|flash| Self {
            kind: flash.kind().to_string(),
            message: flash.message().to_string(),
        })
    }
}
