use super::views::ClubSummary;
use crate::{
    coordinator::Coordinator,
    error::{AppError, AppResult},
};
use axum::{extract::Path, routing::get, Extension, Json, Router};

async fn list(Extension(coordinator): Extension<Coordinator>) -> AppResult<Json<Vec<ClubSummary>>> {
    let clubs = coordinator.store().list_clubs().await?;
    Ok(Json(clubs.iter().map(ClubSummary::from).collect()))
}

async fn info(
    Extension(coordinator): Extension<Coordinator>,
    Path(slug): Path<String>,
) -> AppResult<Json<ClubSummary>> {
    let club = coordinator
        .store()
        .find_club_by_slug(&slug.to_lowercase())
        .await?
        .ok_or_else(|| AppError::not_found("the club does not exist"))?;

    Ok(Json(ClubSummary::from(&club)))
}

pub fn app() -> Router {
    Router::new()
        .route("/clubs", get(list))
        .route("/clubs/:slug", get(info))
}
