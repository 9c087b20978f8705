use super::{
    views::{ClubDetail, EventMessageResponse, EventView, MessageResponse},
    JsonBody,
};
use crate::{
    auth::{Claims, ClubHeadOnly},
    coordinator::Coordinator,
    error::{AppError, AppResult},
    models::{NewEvent, Role},
    store::EventFilter,
    validation,
    workflow::JoinAction,
};
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RespondRequest {
    student_id: i32,
    action: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRequest {
    title: String,
    description: String,
    date: String,
    #[serde(default)]
    fund_request: i64,
}

/// The club managed by the calling head. Heads only ever act on this one.
async fn own_club_id(coordinator: &Coordinator, claims: &Claims) -> AppResult<i32> {
    coordinator
        .store()
        .get_user(claims.id)
        .await?
        .filter(|u| u.role == Role::ClubHead)
        .and_then(|u| u.club_id)
        .ok_or_else(|| AppError::not_found("Club head not found"))
}

async fn dashboard(
    Extension(coordinator): Extension<Coordinator>,
    auth: ClubHeadOnly,
) -> AppResult<Json<ClubDetail>> {
    let club_id = own_club_id(&coordinator, &auth.claims).await?;
    let overview = coordinator
        .club_overview(club_id)
        .await?
        .ok_or_else(|| AppError::not_found("Club data not found"))?;

    Ok(Json(overview.into()))
}

async fn respond(
    Extension(coordinator): Extension<Coordinator>,
    auth: ClubHeadOnly,
    JsonBody(req): JsonBody<RespondRequest>,
) -> AppResult<Json<MessageResponse>> {
    let action: JoinAction = req.action.parse()?;
    let club_id = own_club_id(&coordinator, &auth.claims).await?;

    coordinator.respond(club_id, req.student_id, action).await?;
    Ok(Json(MessageResponse::new(format!(
        "Request has been {}.",
        action.past_tense()
    ))))
}

async fn create_event(
    Extension(coordinator): Extension<Coordinator>,
    auth: ClubHeadOnly,
    JsonBody(req): JsonBody<EventRequest>,
) -> AppResult<Json<EventMessageResponse>> {
    let title = req.title.trim();
    let description = req.description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(AppError::bad_request("title and description are required"));
    }
    let date = validation::parse_event_date(&req.date)
        .ok_or_else(|| AppError::bad_request("Invalid date"))?;

    let club_id = own_club_id(&coordinator, &auth.claims).await?;
    let event = coordinator
        .propose_event(NewEvent {
            title: title.to_string(),
            description: description.to_string(),
            date,
            club_id,
            fund_request: req.fund_request,
        })
        .await?;
    let club = coordinator.store().get_club(club_id).await?;

    Ok(Json(EventMessageResponse {
        message: "Event submitted for approval.".to_string(),
        event: EventView::new(event, club.as_ref()),
    }))
}

async fn my_events(
    Extension(coordinator): Extension<Coordinator>,
    auth: ClubHeadOnly,
) -> AppResult<Json<Vec<EventView>>> {
    let club_id = own_club_id(&coordinator, &auth.claims).await?;
    let store = coordinator.store();
    let events = store
        .list_events(EventFilter {
            club_id: Some(club_id),
            ..Default::default()
        })
        .await?;
    let club = store.get_club(club_id).await?;

    Ok(Json(
        events
            .into_iter()
            .map(|e| EventView::new(e, club.as_ref()))
            .collect(),
    ))
}

pub fn app() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/respond", post(respond))
        .route("/events", post(create_event))
        .route("/my-events", get(my_events))
}
