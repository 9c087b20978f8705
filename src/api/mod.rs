use crate::error::AppError;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub mod admin;
pub mod auth;
pub mod club;
pub mod clubhead;
pub mod events;
pub mod faculty;
pub mod student;
pub mod views;

/// `Json` whose rejections use the `{error}` body like every other failure.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::from(rejection.status(), rejection.body_text())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn app() -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::app())
        .merge(club::app())
        .merge(events::app())
        .nest("/student", student::app())
        .nest("/clubhead", clubhead::app())
        .nest("/faculty", faculty::app())
        .nest("/admin", admin::app())
}
