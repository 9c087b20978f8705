//! Response bodies shared by several routers.

use crate::{
    coordinator::ClubOverview,
    models::{Club, Event, Role, User},
    workflow::EventStatus,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubSummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: String,
}

impl From<&Club> for ClubSummary {
    fn from(club: &Club) -> Self {
        Self {
            id: club.id,
            name: club.name.clone(),
            slug: club.slug.clone(),
            description: club.description.clone(),
            image: club.image.clone(),
        }
    }
}

/// A student as seen from a club.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub roll_number: Option<String>,
}

impl From<&User> for StudentSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            roll_number: user.roll_number.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i32,
    pub role: Role,
    pub username: String,
    pub name: String,
    pub roll_number: Option<String>,
    pub email: Option<String>,
    pub club_id: Option<i32>,
    pub active: bool,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            username: user.username.clone(),
            name: user.name.clone(),
            roll_number: user.roll_number.clone(),
            email: user.email.clone(),
            club_id: user.club_id,
            active: user.active,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubDetail {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub head_username: Option<String>,
    pub members: Vec<StudentSummary>,
    pub pending_requests: Vec<StudentSummary>,
}

impl From<ClubOverview> for ClubDetail {
    fn from(overview: ClubOverview) -> Self {
        let ClubOverview {
            club,
            members,
            pending,
        } = overview;
        Self {
            id: club.id,
            name: club.name,
            slug: club.slug,
            description: club.description,
            image: club.image,
            head_username: club.head_username,
            members: members.iter().map(StudentSummary::from).collect(),
            pending_requests: pending.iter().map(StudentSummary::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub status: EventStatus,
    pub fund_request: i64,
    pub approved_fund: i64,
    pub club: Option<ClubSummary>,
}

impl EventView {
    pub fn new(event: Event, club: Option<&Club>) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            date: event.date,
            status: event.status,
            fund_request: event.fund_request,
            approved_fund: event.approved_fund,
            club: club.map(ClubSummary::from),
        }
    }

    /// Attaches each event's club from `clubs`.
    pub fn with_clubs(events: Vec<Event>, clubs: &[Club]) -> Vec<Self> {
        let by_id: HashMap<i32, &Club> = clubs.iter().map(|c| (c.id, c)).collect();
        events
            .into_iter()
            .map(|e| {
                let club = by_id.get(&e.club_id).copied();
                EventView::new(e, club)
            })
            .collect()
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
pub struct EventMessageResponse {
    pub message: String,
    pub event: EventView,
}
