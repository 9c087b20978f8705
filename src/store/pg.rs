use super::{
    EventFilter, EventRule, MembershipChange, MembershipRule, Store, StoreError, StoreResult,
};
use crate::{
    models::{Club, Event, Membership, NewClub, NewEvent, NewUser, Role, User},
    schema::*,
    workflow::MembershipState,
    DbPool,
};
use async_trait::async_trait;
use deadpool::managed::Object;
use diesel::prelude::*;
use diesel_async::{
    pooled_connection::AsyncDieselConnectionManager, scoped_futures::ScopedFutureExt,
    AsyncConnection, AsyncPgConnection, RunQueryDsl,
};

/// Postgres backed store. Relationship and event transitions run in a
/// transaction with the affected row locked.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

type PooledConnection = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> StoreResult<PooledConnection> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Backend(anyhow::anyhow!("failed to get connection: {e}")))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        diesel::insert_into(users::table)
            .values(&user)
            .on_conflict((users::role, users::username))
            .do_nothing()
            .returning(User::as_returning())
            .get_result(conn)
            .await
            .optional()?
            .ok_or(StoreError::Conflict("username is already registered"))
    }

    async fn find_user(&self, role: Role, username: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(users::table
            .filter(users::role.eq(role))
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(conn)
            .await
            .optional()?)
    }

    async fn get_user(&self, id: i32) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(users::table
            .find(id)
            .select(User::as_select())
            .first(conn)
            .await
            .optional()?)
    }

    async fn users_by_ids(&self, ids: &[i32]) -> StoreResult<Vec<User>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(users::table
            .filter(users::id.eq_any(ids.to_vec()))
            .order(users::id)
            .select(User::as_select())
            .load(conn)
            .await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(users::table
            .order(users::id)
            .select(User::as_select())
            .load(conn)
            .await?)
    }

    async fn set_user_active(&self, id: i32, active: bool) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(diesel::update(users::table.find(id))
            .set(users::active.eq(active))
            .returning(User::as_returning())
            .get_result(conn)
            .await
            .optional()?)
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                diesel::delete(memberships::table.filter(memberships::student_id.eq(id)))
                    .execute(conn)
                    .await?;
                let deleted = diesel::delete(users::table.find(id)).execute(conn).await?;
                Ok(deleted > 0)
            }
            .scope_boxed()
        })
        .await
    }

    async fn insert_club(&self, club: NewClub) -> StoreResult<Option<Club>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(diesel::insert_into(clubs::table)
            .values(&club)
            .on_conflict_do_nothing()
            .returning(Club::as_returning())
            .get_result(conn)
            .await
            .optional()?)
    }

    async fn get_club(&self, id: i32) -> StoreResult<Option<Club>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(clubs::table
            .find(id)
            .select(Club::as_select())
            .first(conn)
            .await
            .optional()?)
    }

    async fn find_club_by_slug(&self, slug: &str) -> StoreResult<Option<Club>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(clubs::table
            .filter(clubs::slug.eq(slug))
            .select(Club::as_select())
            .first(conn)
            .await
            .optional()?)
    }

    async fn find_club_by_head(&self, head_username: &str) -> StoreResult<Option<Club>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(clubs::table
            .filter(clubs::head_username.eq(head_username))
            .select(Club::as_select())
            .first(conn)
            .await
            .optional()?)
    }

    async fn list_clubs(&self) -> StoreResult<Vec<Club>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(clubs::table
            .order(clubs::id)
            .select(Club::as_select())
            .load(conn)
            .await?)
    }

    async fn memberships_of_student(&self, student_id: i32) -> StoreResult<Vec<Membership>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(memberships::table
            .filter(memberships::student_id.eq(student_id))
            .order(memberships::club_id)
            .select(Membership::as_select())
            .load(conn)
            .await?)
    }

    async fn memberships_of_club(&self, club_id: i32) -> StoreResult<Vec<Membership>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(memberships::table
            .filter(memberships::club_id.eq(club_id))
            .order(memberships::student_id)
            .select(Membership::as_select())
            .load(conn)
            .await?)
    }

    async fn list_memberships(&self) -> StoreResult<Vec<Membership>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(memberships::table
            .order((memberships::club_id, memberships::student_id))
            .select(Membership::as_select())
            .load(conn)
            .await?)
    }

    async fn transition_membership(
        &self,
        student_id: i32,
        club_id: i32,
        rule: MembershipRule<'_>,
    ) -> StoreResult<MembershipChange> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let key = (student_id, club_id);
                loop {
                    let before = memberships::table
                        .find(key)
                        .select(memberships::state)
                        .for_update()
                        .first::<MembershipState>(conn)
                        .await
                        .optional()?;
                    let after = rule(before)?;

                    match (before, after) {
                        (Some(_), None) => {
                            diesel::delete(memberships::table.find(key))
                                .execute(conn)
                                .await?;
                        }
                        (None, Some(state)) => {
                            let inserted = diesel::insert_into(memberships::table)
                                .values(&Membership {
                                    student_id,
                                    club_id,
                                    state,
                                })
                                .on_conflict((memberships::student_id, memberships::club_id))
                                .do_nothing()
                                .execute(conn)
                                .await?;
                            // a missing row cannot be locked, so a concurrent first
                            // write may have won; decide again on its row
                            if inserted == 0 {
                                continue;
                            }
                        }
                        (Some(old), Some(new)) if old != new => {
                            diesel::update(memberships::table.find(key))
                                .set(memberships::state.eq(new))
                                .execute(conn)
                                .await?;
                        }
                        _ => {}
                    }

                    return Ok(MembershipChange { before, after });
                }
            }
            .scope_boxed()
        })
        .await
    }

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(diesel::insert_into(events::table)
            .values(&event)
            .returning(Event::as_returning())
            .get_result(conn)
            .await?)
    }

    async fn get_event(&self, id: i32) -> StoreResult<Option<Event>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        Ok(events::table
            .find(id)
            .select(Event::as_select())
            .first(conn)
            .await
            .optional()?)
    }

    async fn list_events(&self, filter: EventFilter) -> StoreResult<Vec<Event>> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        let mut query = events::table.into_boxed();
        if let Some(club_id) = filter.club_id {
            query = query.filter(events::club_id.eq(club_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(events::status.eq(status));
        }
        if filter.with_fund_request {
            query = query.filter(events::fund_request.gt(0));
        }

        Ok(query
            .order(events::id)
            .select(Event::as_select())
            .load(conn)
            .await?)
    }

    async fn transition_event(&self, id: i32, rule: EventRule<'_>) -> StoreResult<Event> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let event = events::table
                    .find(id)
                    .select(Event::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or(StoreError::NotFound("event not found"))?;

                let patch = rule(&event)?;
                if patch.is_empty() {
                    return Ok(event);
                }

                Ok(diesel::update(events::table.find(id))
                    .set(&patch)
                    .returning(Event::as_returning())
                    .get_result(conn)
                    .await?)
            }
            .scope_boxed()
        })
        .await
    }
}
