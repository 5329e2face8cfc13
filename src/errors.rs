use argon2::password_hash::Error as ArError;
use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
};
use jsonwebtoken::errors::Error as JWError;
use serde_json::json;
use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;

use thiserror::Error;
use tracing::{error, warn};

use crate::models::{permission::Permission, request::RequestStatus};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Argon 2 Error: {0}")]
    Argon2Error(#[from] ArError),

    #[error("Jason web token Error: {0}")]
    JwTError(#[from] JWError),

    #[error("Sqlx Error: {0}")]
    SqlxError(#[from] SqlxError),

    #[error("Migration Error: {0}")]
    MigrateError(#[from] MigrateError),

    #[error("Io Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    // ! Validation
    #[error("Validator Error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Json Rejection Error: {0}")]
    AxumJsonRejection(#[from] axum::extract::rejection::JsonRejection),

    #[error("Multipart Rejection Error: {0}")]
    AxumMultipartRejection(#[from] MultipartRejection),

    #[error("Multipart Error: {0}")]
    AxumMultipartError(#[from] MultipartError),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid status `{0}`")]
    InvalidStatus(String),

    #[error("Cannot move a request from {from} to {to}")]
    IllegalTransition { from: RequestStatus, to: RequestStatus },

    #[error("Invalid expiry time `{0}`")]
    InvalidExpiry(String),

    // ! Auth
    #[error("Invalid login detail")]
    InvalidLoginDetails,
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Invalid authorization token")]
    InvalidToken,
    #[error("Invalid authorization scheme")]
    InvalidScheme,
    #[error("Token expired")]
    TokenExpired,

    // ! Access
    #[error("Access denied: missing {0:?} permission")]
    AccessDenied(Permission),
    #[error("Access denied: not the owner of this resource")]
    NotOwner,
    #[error("Account pending approval")]
    AccountNotApproved,

    #[error("{0} not found")]
    NotFound(&'static str),

    // ! Conflict
    #[error("User with email `{0}` already exists!")]
    EmailExist(String),
    #[error("Username `{0}` already taken!")]
    UsernameExist(String),
    #[error("Donation not available")]
    DonationNotAvailable,
    #[error("Request was modified concurrently")]
    StaleRequest,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let internal = || {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Error".to_string(),
            )
        };
        let (status, message) = match self {
            Error::Argon2Error(error) => {
                error!("Argon 2 Error:{:#?}", error);
                internal()
            }
            Error::JwTError(error) => {
                error!("JWT Error:{:#?}", error);
                internal()
            }
            Error::SqlxError(error) => {
                error!("Sqlx Error:{:#?}", error);
                internal()
            }
            Error::MigrateError(error) => {
                error!("Migration Error:{:#?}", error);
                internal()
            }
            Error::IoError(error) => {
                error!("Io Error:{:#?}", error);
                internal()
            }
            Error::Config(error) => {
                error!("Configuration Error: {}", error);
                internal()
            }
            Error::ValidationError(error) => {
                let message = format!("Input validation error: [{}]", error).replace('\n', ", ");
                warn!("Validation Error:{:#?}", error);
                (StatusCode::BAD_REQUEST, message)
            }
            Error::AxumJsonRejection(error) => {
                warn!("Axum Json Rejection Error:{:#?}", error);
                (StatusCode::BAD_REQUEST, error.body_text())
            }
            Error::AxumMultipartRejection(error) => {
                warn!("Axum Multipart Rejection Error:{:#?}", error);
                (StatusCode::BAD_REQUEST, error.body_text())
            }
            Error::AxumMultipartError(error) => {
                warn!("Axum Multipart Error:{:#?}", error);
                (StatusCode::BAD_REQUEST, error.body_text())
            }
            err @ (Error::Validation(_)
            | Error::InvalidStatus(_)
            | Error::IllegalTransition { .. }) => (StatusCode::BAD_REQUEST, err.to_string()),
            err @ Error::InvalidExpiry(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            Error::InvalidLoginDetails => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()),
            err @ (Error::MissingToken
            | Error::InvalidToken
            | Error::InvalidScheme
            | Error::TokenExpired) => (StatusCode::UNAUTHORIZED, err.to_string()),
            err @ (Error::AccessDenied(_) | Error::NotOwner | Error::AccountNotApproved) => {
                warn!("{}", err);
                (StatusCode::FORBIDDEN, err.to_string())
            }
            err @ Error::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
            err @ (Error::EmailExist(_)
            | Error::UsernameExist(_)
            | Error::DonationNotAvailable
            | Error::StaleRequest) => (StatusCode::CONFLICT, err.to_string()),
        };
        (status, Json(json!({ "message": message, "success": false }))).into_response()
    }
}
