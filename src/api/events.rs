use super::views::EventView;
use crate::{
    auth::ExtractAuth,
    coordinator::Coordinator,
    error::{AppError, AppResult},
    store::EventFilter,
    workflow::EventStatus,
};
use axum::{extract::Path, routing::get, Extension, Json, Router};

async fn approved(
    Extension(coordinator): Extension<Coordinator>,
) -> AppResult<Json<Vec<EventView>>> {
    let store = coordinator.store();
    let events = store
        .list_events(EventFilter {
            status: Some(EventStatus::Approved),
            ..Default::default()
        })
        .await?;
    let clubs = store.list_clubs().await?;

    Ok(Json(EventView::with_clubs(events, &clubs)))
}

async fn info(
    Extension(coordinator): Extension<Coordinator>,
    ExtractAuth(_): ExtractAuth,
    Path(id): Path<i32>,
) -> AppResult<Json<EventView>> {
    let store = coordinator.store();
    let event = store
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::not_found("event not found"))?;
    let club = store.get_club(event.club_id).await?;

    Ok(Json(EventView::new(event, club.as_ref())))
}

pub fn app() -> Router {
    Router::new()
        .route("/events/approved", get(approved))
        .route("/events/:id", get(info))
}
