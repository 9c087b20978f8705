//! Membership and event approval state machines.
//!
//! Nothing in here touches storage. The store applies these functions inside
//! whatever atomic section it provides, so the rules live in one place.

use crate::models::UnknownVariant;
use diesel::{sql_types::Text, AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// State of the single (student, club) record. Absence means no relation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum MembershipState {
    Pending,
    Member,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinAction {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDecision {
    Approve,
    Reject,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid action `{0}`")]
    InvalidAction(String),
    #[error("student is already a member of this club")]
    AlreadyMember,
    #[error("no pending request from this student")]
    NoPendingRequest,
    #[error("student is not a member of this club")]
    NotAMember,
    #[error("event has already been {0}")]
    AlreadyDecided(EventStatus),
    #[error("funds can only be approved for approved events (event is {0})")]
    FundOnUnapprovedEvent(EventStatus),
    #[error("amount must not be negative")]
    NegativeAmount,
}

/// What a join request did to the relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Requested,
    AlreadyPending,
}

impl MembershipState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipState::Pending => "pending",
            MembershipState::Member => "member",
        }
    }
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Approved => "approved",
            EventStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipState {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MembershipState::Pending),
            "member" => Ok(MembershipState::Member),
            other => Err(UnknownVariant::new("membership state", other)),
        }
    }
}

impl FromStr for EventStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EventStatus::Pending),
            "approved" => Ok(EventStatus::Approved),
            "rejected" => Ok(EventStatus::Rejected),
            other => Err(UnknownVariant::new("event status", other)),
        }
    }
}

impl FromStr for JoinAction {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(JoinAction::Accept),
            "reject" => Ok(JoinAction::Reject),
            other => Err(TransitionError::InvalidAction(other.to_string())),
        }
    }
}

impl FromStr for EventDecision {
    type Err = TransitionError;

    // faculty clients send the target status, admin routes use the verb
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" | "approve" => Ok(EventDecision::Approve),
            "rejected" | "reject" => Ok(EventDecision::Reject),
            other => Err(TransitionError::InvalidAction(other.to_string())),
        }
    }
}

impl JoinAction {
    pub fn past_tense(&self) -> &'static str {
        match self {
            JoinAction::Accept => "accepted",
            JoinAction::Reject => "rejected",
        }
    }
}

impl EventDecision {
    pub fn target(&self) -> EventStatus {
        match self {
            EventDecision::Approve => EventStatus::Approved,
            EventDecision::Reject => EventStatus::Rejected,
        }
    }
}

/// none -> pending. Repeating the request while pending changes nothing.
pub fn request_join(
    current: Option<MembershipState>,
) -> Result<Option<MembershipState>, TransitionError> {
    match current {
        None | Some(MembershipState::Pending) => Ok(Some(MembershipState::Pending)),
        Some(MembershipState::Member) => Err(TransitionError::AlreadyMember),
    }
}

/// Consumes a pending request. Accepting turns it into membership, rejecting
/// drops the relation entirely.
pub fn respond(
    current: Option<MembershipState>,
    action: JoinAction,
) -> Result<Option<MembershipState>, TransitionError> {
    match (current, action) {
        (Some(MembershipState::Pending), JoinAction::Accept) => Ok(Some(MembershipState::Member)),
        (Some(MembershipState::Pending), JoinAction::Reject) => Ok(None),
        _ => Err(TransitionError::NoPendingRequest),
    }
}

pub fn leave(current: Option<MembershipState>) -> Result<Option<MembershipState>, TransitionError> {
    match current {
        Some(MembershipState::Member) => Ok(None),
        _ => Err(TransitionError::NotAMember),
    }
}

/// pending -> approved | rejected. Both targets are terminal.
pub fn decide(
    current: EventStatus,
    decision: EventDecision,
) -> Result<EventStatus, TransitionError> {
    match current {
        EventStatus::Pending => Ok(decision.target()),
        decided => Err(TransitionError::AlreadyDecided(decided)),
    }
}

pub fn approve_fund(status: EventStatus, amount: i64) -> Result<i64, TransitionError> {
    if amount < 0 {
        return Err(TransitionError::NegativeAmount);
    }
    match status {
        EventStatus::Approved => Ok(amount),
        other => Err(TransitionError::FundOnUnapprovedEvent(other)),
    }
}

pub fn check_requested_fund(amount: i64) -> Result<i64, TransitionError> {
    if amount < 0 {
        Err(TransitionError::NegativeAmount)
    } else {
        Ok(amount)
    }
}
