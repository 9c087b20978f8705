use crate::{store::StoreError, workflow::TransitionError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::borrow::Cow;

pub enum AppError {
    InternalServerError(anyhow::Error),
    ResponseStatusError(StatusCode, Cow<'static, str>),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct AppErrorResponse {
            error: Cow<'static, str>,
        }

        match self {
            AppError::InternalServerError(err) => {
                tracing::error!(error = ?err, "request failed");
                AppError::from(StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
            AppError::ResponseStatusError(code, s) => {
                (code, Json(AppErrorResponse { error: s })).into_response()
            }
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(e: E) -> AppError {
        let err = e.into();
        match err.downcast::<StoreError>() {
            Ok(store) => AppError::from_store(store),
            Err(err) => match err.downcast::<TransitionError>() {
                Ok(transition) => AppError::from_transition(transition),
                Err(err) => AppError::InternalServerError(err),
            },
        }
    }
}

impl AppError {
    pub fn from(code: StatusCode, s: impl Into<Cow<'static, str>>) -> AppError {
        AppError::ResponseStatusError(code, s.into())
    }

    pub fn bad_request(s: impl Into<Cow<'static, str>>) -> AppError {
        AppError::from(StatusCode::BAD_REQUEST, s)
    }

    pub fn not_found(s: impl Into<Cow<'static, str>>) -> AppError {
        AppError::from(StatusCode::NOT_FOUND, s)
    }

    fn from_store(err: StoreError) -> AppError {
        match err {
            // duplicates are reported as bad requests to match the registration clients
            StoreError::Conflict(s) => AppError::from(StatusCode::BAD_REQUEST, s),
            StoreError::NotFound(s) => AppError::from(StatusCode::NOT_FOUND, s),
            StoreError::Transition(t) => AppError::from_transition(t),
            StoreError::Backend(e) => AppError::InternalServerError(e),
        }
    }

    fn from_transition(err: TransitionError) -> AppError {
        let code = match err {
            TransitionError::NoPendingRequest | TransitionError::NotAMember => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::BAD_REQUEST,
        };
        AppError::from(code, err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ResponseStatusError(code, _) => *code,
        }
    }
}
