use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bonushunt_core::{AuthError, DatabaseError, HuntError};
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource}:{identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("Bonus payout was already recorded")]
    AlreadyOpened,
    #[error("Caller does not own this hunt")]
    Forbidden,
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::AlreadyOpened => StatusCode::CONFLICT,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.as_status_code(), self.to_string()).into_response()
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Db(e) => e.into(),
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<HuntError> for ServerError {
    fn from(value: HuntError) -> Self {
        match value {
            HuntError::NotOwner => Self::Forbidden,
            HuntError::NothingToPlay => Self::InvalidInput("Hunt has no bonuses to play"),
            HuntError::NegativeWinAmount => Self::InvalidInput("Win amount cannot be negative"),
            HuntError::AlreadyOpened => Self::AlreadyOpened,
            HuntError::Db(e) => e.into(),
        }
    }
}
