use crate::{
    schema::*,
    workflow::{EventStatus, MembershipState},
};
use chrono::NaiveDate;
use diesel::{
    deserialize::{self, FromSql},
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
    sql_types::Text,
    AsExpression, FromSqlRow,
};
use serde::{Deserialize, Serialize};
use std::{fmt, io::Write, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    ClubHead,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::ClubHead => "clubhead",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            "clubhead" => Ok(Role::ClubHead),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// enums are stored as their lowercase names in varchar columns
macro_rules! text_column {
    ($($ty:ty),* $(,)?) => {$(
        impl ToSql<Text, Pg> for $ty {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $ty {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                Ok(std::str::from_utf8(bytes.as_bytes())?.parse()?)
            }
        }
    )*};
}

text_column!(Role, EventStatus, MembershipState);

/// One account of any role. Role specific columns are `None` for the others.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub role: Role,
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub roll_number: Option<String>,
    pub email: Option<String>,
    pub club_id: Option<i32>,
    pub active: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub role: Role,
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub roll_number: Option<String>,
    pub email: Option<String>,
    pub club_id: Option<i32>,
    pub active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = clubs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Club {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub head_username: Option<String>,
    pub password_hash: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = clubs)]
pub struct NewClub {
    pub slug: String,
    pub name: String,
    pub head_username: Option<String>,
    pub password_hash: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Associations)]
#[diesel(belongs_to(Club))]
#[diesel(table_name = memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Membership {
    pub student_id: i32,
    pub club_id: i32,
    pub state: MembershipState,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(Club))]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub club_id: i32,
    pub status: EventStatus,
    pub fund_request: i64,
    pub approved_fund: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub club_id: i32,
    pub fund_request: i64,
}

/// Column updates produced by an event transition. `None` leaves a column alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = events)]
pub struct EventPatch {
    pub status: Option<EventStatus>,
    pub approved_fund: Option<i64>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.approved_fund.is_none()
    }

    pub fn apply(&self, event: &mut Event) {
        if let Some(status) = self.status {
            event.status = status;
        }
        if let Some(amount) = self.approved_fund {
            event.approved_fund = amount;
        }
    }
}
