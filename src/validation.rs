//! Field formats enforced at registration and event creation.

use chrono::NaiveDate;
use regex::Regex;

lazy_static::lazy_static! {
    // institution roll number, e.g. 23BD1A05C7
    static ref ROLL_NUMBER: Regex = Regex::new(r"(?i)^[0-9]{2}[a-z]{2}[0-9][a-z][0-9]{2}[a-z0-9]{2}$").unwrap();
    static ref CLUB_HEAD: Regex = Regex::new(r"(?i)^[a-z0-9]+(?:[-_][a-z0-9]+)*-head$").unwrap();
    static ref FACULTY_EMAIL: Regex = Regex::new(r"^[A-Za-z]{10}[0-9]{0,3}@gmail\.com$").unwrap();
    static ref FACULTY_NAME: Regex = Regex::new(r"^[A-Za-z]{1,20}$").unwrap();
    static ref FACULTY_PASSWORD: Regex = Regex::new(r"^[A-Z][A-Za-z0-9!@#$%^&*]{9,}$").unwrap();
    static ref ADMIN_ID: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap();
}

const SPECIAL_CHARACTERS: &str = "!@#$%^&*";

/// Lookup key for usernames. Everything is stored in this form.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

pub fn is_roll_number(s: &str) -> bool {
    ROLL_NUMBER.is_match(s)
}

pub fn is_club_head_username(s: &str) -> bool {
    CLUB_HEAD.is_match(s)
}

pub fn is_faculty_email(s: &str) -> bool {
    FACULTY_EMAIL.is_match(s)
}

pub fn is_faculty_name(s: &str) -> bool {
    FACULTY_NAME.is_match(s)
}

pub fn is_admin_id(s: &str) -> bool {
    ADMIN_ID.is_match(s)
}

/// Starts with an uppercase letter, at least ten characters from letters,
/// digits and `!@#$%^&*`, with eight or more letters, a digit and a special
/// character.
pub fn is_strong_password(s: &str) -> bool {
    FACULTY_PASSWORD.is_match(s)
        && s.chars().filter(|c| c.is_ascii_alphabetic()).count() >= 8
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
}

pub fn parse_event_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    // date pickers send YYYY-MM-DD, some clients send a full timestamp
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}
