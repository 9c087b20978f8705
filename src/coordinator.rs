//! Membership and event workflows over a [`Store`].

use crate::{
    models::{Club, Event, EventPatch, Membership, NewEvent, Role, User},
    store::{Db, Store, StoreError, StoreResult},
    workflow::{self, EventDecision, JoinAction, JoinOutcome, MembershipState},
};
use diesel::associations::GroupedBy;
use itertools::{Either, Itertools};
use std::collections::HashMap;
use tracing::info;

#[derive(Clone)]
pub struct Coordinator {
    store: Db,
}

pub struct StudentOverview {
    pub student: User,
    pub joined: Vec<Club>,
    pub pending: Vec<Club>,
}

pub struct ClubOverview {
    pub club: Club,
    pub members: Vec<User>,
    pub pending: Vec<User>,
}

impl Coordinator {
    pub fn new(store: Db) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    async fn require_student(&self, student_id: i32) -> StoreResult<User> {
        self.store
            .get_user(student_id)
            .await?
            .filter(|u| u.role == Role::Student)
            .ok_or(StoreError::NotFound("student not found"))
    }

    async fn require_club(&self, club_id: i32) -> StoreResult<Club> {
        self.store
            .get_club(club_id)
            .await?
            .ok_or(StoreError::NotFound("club not found"))
    }

    pub async fn request_join(&self, student_id: i32, club_id: i32) -> StoreResult<JoinOutcome> {
        self.require_student(student_id).await?;
        self.require_club(club_id).await?;

        let change = self
            .store
            .transition_membership(student_id, club_id, &workflow::request_join)
            .await?;

        let outcome = match change.before {
            None => JoinOutcome::Requested,
            Some(_) => JoinOutcome::AlreadyPending,
        };
        info!(student_id, club_id, ?outcome, "join requested");
        Ok(outcome)
    }

    pub async fn respond(
        &self,
        club_id: i32,
        student_id: i32,
        action: JoinAction,
    ) -> StoreResult<()> {
        self.store
            .transition_membership(student_id, club_id, &|current| {
                workflow::respond(current, action)
            })
            .await?;

        info!(student_id, club_id, ?action, "join request answered");
        Ok(())
    }

    pub async fn leave(&self, student_id: i32, club_id: i32) -> StoreResult<()> {
        self.require_club(club_id).await?;
        self.store
            .transition_membership(student_id, club_id, &workflow::leave)
            .await?;

        info!(student_id, club_id, "student left club");
        Ok(())
    }

    pub async fn propose_event(&self, event: NewEvent) -> StoreResult<Event> {
        workflow::check_requested_fund(event.fund_request)?;
        self.require_club(event.club_id).await?;

        let event = self.store.insert_event(event).await?;
        info!(
            event_id = event.id,
            club_id = event.club_id,
            fund_request = event.fund_request,
            "event proposed"
        );
        Ok(event)
    }

    pub async fn decide_event(&self, event_id: i32, decision: EventDecision) -> StoreResult<Event> {
        let event = self
            .store
            .transition_event(event_id, &|event| {
                Ok(EventPatch {
                    status: Some(workflow::decide(event.status, decision)?),
                    approved_fund: None,
                })
            })
            .await?;

        info!(event_id, status = %event.status, "event decided");
        Ok(event)
    }

    pub async fn approve_fund(&self, event_id: i32, amount: i64) -> StoreResult<Event> {
        let event = self
            .store
            .transition_event(event_id, &|event| {
                Ok(EventPatch {
                    status: None,
                    approved_fund: Some(workflow::approve_fund(event.status, amount)?),
                })
            })
            .await?;

        info!(event_id, amount, "event fund approved");
        Ok(event)
    }

    pub async fn student_overview(&self, student_id: i32) -> StoreResult<Option<StudentOverview>> {
        let Some(student) = self
            .store
            .get_user(student_id)
            .await?
            .filter(|u| u.role == Role::Student)
        else {
            return Ok(None);
        };

        let memberships = self.store.memberships_of_student(student_id).await?;
        let clubs: HashMap<i32, Club> = self
            .store
            .list_clubs()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let (joined, pending) = memberships
            .into_iter()
            .filter_map(|m| clubs.get(&m.club_id).map(|c| (m.state, c.clone())))
            .partition_map(|(state, club)| match state {
                MembershipState::Member => Either::Left(club),
                MembershipState::Pending => Either::Right(club),
            });

        Ok(Some(StudentOverview {
            student,
            joined,
            pending,
        }))
    }

    pub async fn club_overview(&self, club_id: i32) -> StoreResult<Option<ClubOverview>> {
        let Some(club) = self.store.get_club(club_id).await? else {
            return Ok(None);
        };
        let memberships = self.store.memberships_of_club(club_id).await?;
        let students = self.students_of(&memberships).await?;

        Ok(Some(split_members(club, memberships, &students)))
    }

    pub async fn clubs_overview(&self) -> StoreResult<Vec<ClubOverview>> {
        let clubs = self.store.list_clubs().await?;
        let memberships = self.store.list_memberships().await?;
        let students = self.students_of(&memberships).await?;

        let grouped = memberships.grouped_by(&clubs);
        Ok(clubs
            .into_iter()
            .zip(grouped)
            .map(|(club, memberships)| split_members(club, memberships, &students))
            .collect())
    }

    async fn students_of(&self, memberships: &[Membership]) -> StoreResult<HashMap<i32, User>> {
        let ids: Vec<i32> = memberships.iter().map(|m| m.student_id).unique().collect();
        Ok(self
            .store
            .users_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect())
    }
}

fn split_members(
    club: Club,
    memberships: Vec<Membership>,
    students: &HashMap<i32, User>,
) -> ClubOverview {
    let (members, pending) = memberships
        .into_iter()
        .filter_map(|m| students.get(&m.student_id).map(|s| (m.state, s.clone())))
        .partition_map(|(state, student)| match state {
            MembershipState::Member => Either::Left(student),
            MembershipState::Pending => Either::Right(student),
        });

    ClubOverview {
        club,
        members,
        pending,
    }
}
