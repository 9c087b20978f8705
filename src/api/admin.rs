use super::{
    views::{ClubDetail, EventMessageResponse, EventView, MessageResponse, UserView},
    JsonBody,
};
use crate::{
    auth::AdminOnly,
    coordinator::Coordinator,
    error::{AppError, AppResult},
    models::Event,
    store::EventFilter,
    workflow::EventDecision,
};
use axum::{
    extract::Path,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundRequest {
    approved_fund: i64,
}

async fn users(
    Extension(coordinator): Extension<Coordinator>,
    _auth: AdminOnly,
) -> AppResult<Json<Vec<UserView>>> {
    let users = coordinator.store().list_users().await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}

async fn list_events(coordinator: &Coordinator, filter: EventFilter) -> AppResult<Vec<EventView>> {
    let store = coordinator.store();
    let events = store.list_events(filter).await?;
    let clubs = store.list_clubs().await?;
    Ok(EventView::with_clubs(events, &clubs))
}

async fn events(
    Extension(coordinator): Extension<Coordinator>,
    _auth: AdminOnly,
) -> AppResult<Json<Vec<EventView>>> {
    Ok(Json(list_events(&coordinator, EventFilter::default()).await?))
}

async fn fund_requests(
    Extension(coordinator): Extension<Coordinator>,
    _auth: AdminOnly,
) -> AppResult<Json<Vec<EventView>>> {
    let filter = EventFilter {
        with_fund_request: true,
        ..Default::default()
    };
    Ok(Json(list_events(&coordinator, filter).await?))
}

async fn clubs_detailed(
    Extension(coordinator): Extension<Coordinator>,
    _auth: AdminOnly,
) -> AppResult<Json<Vec<ClubDetail>>> {
    let overviews = coordinator.clubs_overview().await?;
    Ok(Json(overviews.into_iter().map(ClubDetail::from).collect()))
}

async fn event_response(
    coordinator: &Coordinator,
    message: String,
    event: Event,
) -> AppResult<Json<EventMessageResponse>> {
    let club = coordinator.store().get_club(event.club_id).await?;
    Ok(Json(EventMessageResponse {
        message,
        event: EventView::new(event, club.as_ref()),
    }))
}

async fn decide(
    coordinator: &Coordinator,
    event_id: i32,
    decision: EventDecision,
) -> AppResult<Json<EventMessageResponse>> {
    let event = coordinator.decide_event(event_id, decision).await?;
    let message = format!("Event {}", event.status);
    event_response(coordinator, message, event).await
}

async fn approve_event(
    Extension(coordinator): Extension<Coordinator>,
    _auth: AdminOnly,
    Path(id): Path<i32>,
) -> AppResult<Json<EventMessageResponse>> {
    decide(&coordinator, id, EventDecision::Approve).await
}

async fn reject_event(
    Extension(coordinator): Extension<Coordinator>,
    _auth: AdminOnly,
    Path(id): Path<i32>,
) -> AppResult<Json<EventMessageResponse>> {
    decide(&coordinator, id, EventDecision::Reject).await
}

async fn update_funds(
    Extension(coordinator): Extension<Coordinator>,
    _auth: AdminOnly,
    Path(id): Path<i32>,
    JsonBody(req): JsonBody<FundRequest>,
) -> AppResult<Json<EventMessageResponse>> {
    let event = coordinator.approve_fund(id, req.approved_fund).await?;
    event_response(&coordinator, "Approved fund updated".to_string(), event).await
}

async fn set_active(
    coordinator: &Coordinator,
    caller: i32,
    id: i32,
    active: bool,
) -> AppResult<Json<MessageResponse>> {
    if !active && caller == id {
        return Err(AppError::bad_request("You cannot deactivate yourself"));
    }
    let user = coordinator
        .store()
        .set_user_active(id, active)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    info!(user_id = user.id, role = %user.role, active, "user activity changed");
    let verb = if active { "activated" } else { "deactivated" };
    Ok(Json(MessageResponse::new(format!("User {verb}"))))
}

async fn deactivate_user(
    Extension(coordinator): Extension<Coordinator>,
    auth: AdminOnly,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    set_active(&coordinator, auth.claims.id, id, false).await
}

async fn activate_user(
    Extension(coordinator): Extension<Coordinator>,
    auth: AdminOnly,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    set_active(&coordinator, auth.claims.id, id, true).await
}

async fn delete_user(
    Extension(coordinator): Extension<Coordinator>,
    auth: AdminOnly,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    if auth.claims.id == id {
        return Err(AppError::bad_request("You cannot delete yourself"));
    }
    if !coordinator.store().delete_user(id).await? {
        return Err(AppError::not_found("User not found"));
    }

    info!(user_id = id, "user deleted");
    Ok(Json(MessageResponse::new("User deleted")))
}

pub fn app() -> Router {
    Router::new()
        .route("/users", get(users))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/deactivate", post(deactivate_user))
        .route("/users/:id/activate", post(activate_user))
        .route("/events", get(events))
        .route("/events/:id/approve", post(approve_event))
        .route("/events/:id/reject", post(reject_event))
        .route("/events/:id/update-funds", post(update_funds))
        .route("/fund-requests", get(fund_requests))
        .route("/clubs-detailed", get(clubs_detailed))
}
