use super::{
    views::{ClubDetail, EventMessageResponse, EventView, UserView},
    JsonBody,
};
use crate::{
    auth::{FacultyOnly, FacultyOrAdmin},
    coordinator::Coordinator,
    error::AppResult,
    store::EventFilter,
    workflow::{EventDecision, EventStatus},
};
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FacultyDashboard {
    pending_events: Vec<EventView>,
    clubs: Vec<ClubDetail>,
    all_users: Vec<UserView>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventResponseRequest {
    event_id: i32,
    action: String,
}

async fn dashboard(
    Extension(coordinator): Extension<Coordinator>,
    _auth: FacultyOnly,
) -> AppResult<Json<FacultyDashboard>> {
    let store = coordinator.store();
    let events = store
        .list_events(EventFilter {
            status: Some(EventStatus::Pending),
            ..Default::default()
        })
        .await?;
    let overviews = coordinator.clubs_overview().await?;
    let clubs: Vec<_> = overviews.iter().map(|o| o.club.clone()).collect();
    let users = store.list_users().await?;

    Ok(Json(FacultyDashboard {
        pending_events: EventView::with_clubs(events, &clubs),
        clubs: overviews.into_iter().map(ClubDetail::from).collect(),
        all_users: users.iter().map(UserView::from).collect(),
    }))
}

async fn respond(
    Extension(coordinator): Extension<Coordinator>,
    _auth: FacultyOrAdmin,
    JsonBody(req): JsonBody<EventResponseRequest>,
) -> AppResult<Json<EventMessageResponse>> {
    let decision: EventDecision = req.action.parse()?;
    let event = coordinator.decide_event(req.event_id, decision).await?;
    let club = coordinator.store().get_club(event.club_id).await?;

    Ok(Json(EventMessageResponse {
        message: format!("Event has been {}.", event.status),
        event: EventView::new(event, club.as_ref()),
    }))
}

pub fn app() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/events/respond", post(respond))
}
