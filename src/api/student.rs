use super::{
    views::{ClubSummary, MessageResponse},
    JsonBody,
};
use crate::{
    auth::StudentOnly,
    coordinator::Coordinator,
    error::{AppError, AppResult},
    workflow::JoinOutcome,
};
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StudentDashboard {
    id: i32,
    username: String,
    name: String,
    roll_number: Option<String>,
    active: bool,
    joined_clubs: Vec<ClubSummary>,
    pending_requests: Vec<ClubSummary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClubRequest {
    club_id: i32,
}

async fn dashboard(
    Extension(coordinator): Extension<Coordinator>,
    auth: StudentOnly,
) -> AppResult<Json<StudentDashboard>> {
    let overview = coordinator
        .student_overview(auth.claims.id)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;

    let student = overview.student;
    Ok(Json(StudentDashboard {
        id: student.id,
        username: student.username,
        name: student.name,
        roll_number: student.roll_number,
        active: student.active,
        joined_clubs: overview.joined.iter().map(ClubSummary::from).collect(),
        pending_requests: overview.pending.iter().map(ClubSummary::from).collect(),
    }))
}

async fn join_club(
    Extension(coordinator): Extension<Coordinator>,
    auth: StudentOnly,
    JsonBody(req): JsonBody<ClubRequest>,
) -> AppResult<Json<MessageResponse>> {
    let message = match coordinator.request_join(auth.claims.id, req.club_id).await? {
        JoinOutcome::Requested => "Request sent successfully!",
        JoinOutcome::AlreadyPending => "Request already pending.",
    };
    Ok(Json(MessageResponse::new(message)))
}

async fn leave_club(
    Extension(coordinator): Extension<Coordinator>,
    auth: StudentOnly,
    JsonBody(req): JsonBody<ClubRequest>,
) -> AppResult<Json<MessageResponse>> {
    coordinator.leave(auth.claims.id, req.club_id).await?;
    Ok(Json(MessageResponse::new("Left the club.")))
}

pub fn app() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/join-club", post(join_club))
        .route("/leave-club", post(leave_club))
}
