//! Persistence seam for accounts, clubs, memberships and events.
//!
//! Membership and event changes go through `transition_*`, which read the
//! current state, run the supplied rule and write the result as one atomic
//! step. Callers never update the two ends of a relation separately.

use crate::{
    models::{Club, Event, EventPatch, Membership, NewClub, NewEvent, NewUser, Role, User},
    workflow::{EventStatus, MembershipState, TransitionError},
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

pub type Db = Arc<dyn Store>;

pub type StoreResult<T> = Result<T, StoreError>;

/// The state a membership rule moves the relation to.
pub type NextState = Result<Option<MembershipState>, TransitionError>;

pub type MembershipRule<'a> = &'a (dyn Fn(Option<MembershipState>) -> NextState + Send + Sync);

pub type EventRule<'a> = &'a (dyn Fn(&Event) -> Result<EventPatch, TransitionError> + Send + Sync);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<diesel::result::Error> for StoreError {
    fn from(e: diesel::result::Error) -> Self {
        StoreError::Backend(e.into())
    }
}

/// Result of a membership transition, for logging and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipChange {
    pub before: Option<MembershipState>,
    pub after: Option<MembershipState>,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub club_id: Option<i32>,
    pub status: Option<EventStatus>,
    pub with_fund_request: bool,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        self.club_id.map_or(true, |id| event.club_id == id)
            && self.status.map_or(true, |status| event.status == status)
            && (!self.with_fund_request || event.fund_request > 0)
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `Conflict` when `(role, username)` is taken.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    /// `username` must already be normalized.
    async fn find_user(&self, role: Role, username: &str) -> StoreResult<Option<User>>;
    async fn get_user(&self, id: i32) -> StoreResult<Option<User>>;
    async fn users_by_ids(&self, ids: &[i32]) -> StoreResult<Vec<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn set_user_active(&self, id: i32, active: bool) -> StoreResult<Option<User>>;
    /// Removes the account and every membership record of it.
    async fn delete_user(&self, id: i32) -> StoreResult<bool>;

    /// Returns `None` when the slug or head username is already used.
    async fn insert_club(&self, club: NewClub) -> StoreResult<Option<Club>>;
    async fn get_club(&self, id: i32) -> StoreResult<Option<Club>>;
    async fn find_club_by_slug(&self, slug: &str) -> StoreResult<Option<Club>>;
    async fn find_club_by_head(&self, head_username: &str) -> StoreResult<Option<Club>>;
    async fn list_clubs(&self) -> StoreResult<Vec<Club>>;

    async fn memberships_of_student(&self, student_id: i32) -> StoreResult<Vec<Membership>>;
    async fn memberships_of_club(&self, club_id: i32) -> StoreResult<Vec<Membership>>;
    async fn list_memberships(&self) -> StoreResult<Vec<Membership>>;
    async fn transition_membership(
        &self,
        student_id: i32,
        club_id: i32,
        rule: MembershipRule<'_>,
    ) -> StoreResult<MembershipChange>;

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event>;
    async fn get_event(&self, id: i32) -> StoreResult<Option<Event>>;
    async fn list_events(&self, filter: EventFilter) -> StoreResult<Vec<Event>>;
    /// Fails with `NotFound` when the event does not exist.
    async fn transition_event(&self, id: i32, rule: EventRule<'_>) -> StoreResult<Event>;
}
