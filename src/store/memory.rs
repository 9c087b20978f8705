use super::{
    EventFilter, EventRule, MembershipChange, MembershipRule, Store, StoreError, StoreResult,
};
use crate::{
    models::{Club, Event, Membership, NewClub, NewEvent, NewUser, Role, User},
    workflow::{EventStatus, MembershipState},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// In-process store. Every operation holds the single lock for its whole
/// duration, which gives the same atomicity as the transactional backend.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    clubs: BTreeMap<i32, Club>,
    memberships: BTreeMap<(i32, i32), MembershipState>,
    events: BTreeMap<i32, Event>,
    last_user_id: i32,
    last_club_id: i32,
    last_event_id: i32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn membership(((student_id, club_id), state): (&(i32, i32), &MembershipState)) -> Membership {
    Membership {
        student_id: *student_id,
        club_id: *club_id,
        state: *state,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .values()
            .any(|u| u.role == user.role && u.username == user.username)
        {
            return Err(StoreError::Conflict("username is already registered"));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            role: user.role,
            username: user.username,
            name: user.name,
            password_hash: user.password_hash,
            roll_number: user.roll_number,
            email: user.email,
            club_id: user.club_id,
            active: user.active,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, role: Role, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.role == role && u.username == username)
            .cloned())
    }

    async fn get_user(&self, id: i32) -> StoreResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn users_by_ids(&self, ids: &[i32]) -> StoreResult<Vec<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.lock().await.users.values().cloned().collect())
    }

    async fn set_user_active(&self, id: i32, active: bool) -> StoreResult<Option<User>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.active = active;
            user.clone()
        }))
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        tables.memberships.retain(|(student_id, _), _| *student_id != id);
        Ok(tables.users.remove(&id).is_some())
    }

    async fn insert_club(&self, club: NewClub) -> StoreResult<Option<Club>> {
        let mut tables = self.tables.lock().await;
        let taken = tables.clubs.values().any(|c| {
            c.slug == club.slug
                || (club.head_username.is_some() && c.head_username == club.head_username)
        });
        if taken {
            return Ok(None);
        }

        tables.last_club_id += 1;
        let club = Club {
            id: tables.last_club_id,
            slug: club.slug,
            name: club.name,
            head_username: club.head_username,
            password_hash: club.password_hash,
            description: club.description,
            image: club.image,
        };
        tables.clubs.insert(club.id, club.clone());
        Ok(Some(club))
    }

    async fn get_club(&self, id: i32) -> StoreResult<Option<Club>> {
        Ok(self.tables.lock().await.clubs.get(&id).cloned())
    }

    async fn find_club_by_slug(&self, slug: &str) -> StoreResult<Option<Club>> {
        let tables = self.tables.lock().await;
        Ok(tables.clubs.values().find(|c| c.slug == slug).cloned())
    }

    async fn find_club_by_head(&self, head_username: &str) -> StoreResult<Option<Club>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .clubs
            .values()
            .find(|c| c.head_username.as_deref() == Some(head_username))
            .cloned())
    }

    async fn list_clubs(&self) -> StoreResult<Vec<Club>> {
        Ok(self.tables.lock().await.clubs.values().cloned().collect())
    }

    async fn memberships_of_student(&self, student_id: i32) -> StoreResult<Vec<Membership>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .memberships
            .iter()
            .filter(|((s, _), _)| *s == student_id)
            .map(membership)
            .collect())
    }

    async fn memberships_of_club(&self, club_id: i32) -> StoreResult<Vec<Membership>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .memberships
            .iter()
            .filter(|((_, c), _)| *c == club_id)
            .map(membership)
            .collect())
    }

    async fn list_memberships(&self) -> StoreResult<Vec<Membership>> {
        let tables = self.tables.lock().await;
        Ok(tables.memberships.iter().map(membership).collect())
    }

    async fn transition_membership(
        &self,
        student_id: i32,
        club_id: i32,
        rule: MembershipRule<'_>,
    ) -> StoreResult<MembershipChange> {
        let mut tables = self.tables.lock().await;
        let key = (student_id, club_id);
        let before = tables.memberships.get(&key).copied();
        let after = rule(before)?;

        match after {
            Some(state) => tables.memberships.insert(key, state),
            None => tables.memberships.remove(&key),
        };

        Ok(MembershipChange { before, after })
    }

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let mut tables = self.tables.lock().await;
        tables.last_event_id += 1;
        let event = Event {
            id: tables.last_event_id,
            title: event.title,
            description: event.description,
            date: event.date,
            club_id: event.club_id,
            status: EventStatus::Pending,
            fund_request: event.fund_request,
            approved_fund: 0,
        };
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: i32) -> StoreResult<Option<Event>> {
        Ok(self.tables.lock().await.events.get(&id).cloned())
    }

    async fn list_events(&self, filter: EventFilter) -> StoreResult<Vec<Event>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .events
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn transition_event(&self, id: i32, rule: EventRule<'_>) -> StoreResult<Event> {
        let mut tables = self.tables.lock().await;
        let event = tables
            .events
            .get_mut(&id)
            .ok_or(StoreError::NotFound("event not found"))?;
        let patch = rule(event)?;
        patch.apply(event);
        Ok(event.clone())
    }
}
