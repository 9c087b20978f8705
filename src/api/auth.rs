use super::{views::MessageResponse, JsonBody};
use crate::{
    auth::{self, Keys, MaybeAuth},
    coordinator::Coordinator,
    error::{AppError, AppResult},
    models::{NewUser, Role},
    validation::{self, normalize_username},
};
use axum::{http::StatusCode, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Registration form. Which fields are required depends on `role`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    role: String,
    name: Option<String>,
    student_username: Option<String>,
    student_password: Option<String>,
    confirm_password: Option<String>,
    roll_number: Option<String>,
    faculty_email: Option<String>,
    faculty_password: Option<String>,
    club_username: Option<String>,
    club_password: Option<String>,
    admin_id: Option<String>,
    admin_password: Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    role: String,
    username: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    role: Role,
}

fn required(value: Option<String>, field: &'static str) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::bad_request(format!("{field} is required"))),
    }
}

fn parse_role(role: &str) -> AppResult<Role> {
    role.parse()
        .map_err(|_| AppError::bad_request("Invalid role"))
}

async fn register(
    Extension(coordinator): Extension<Coordinator>,
    MaybeAuth(caller): MaybeAuth,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> AppResult<Json<MessageResponse>> {
    let store = coordinator.store();

    let new_user = match parse_role(&req.role)? {
        Role::Student => {
            let username = required(req.student_username, "studentUsername")?;
            let username = username.trim();
            if !validation::is_roll_number(username) {
                return Err(AppError::bad_request("Invalid roll number format"));
            }
            if let Some(roll) = req.roll_number.as_deref().filter(|r| !r.trim().is_empty()) {
                if !roll.trim().eq_ignore_ascii_case(username) {
                    return Err(AppError::bad_request("Roll number must match username"));
                }
            }
            let password = required(req.student_password, "studentPassword")?;
            if req.confirm_password.is_some_and(|c| c != password) {
                return Err(AppError::bad_request("Passwords do not match"));
            }

            let roll_number = username.to_uppercase();
            NewUser {
                role: Role::Student,
                username: normalize_username(username),
                name: req
                    .name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| roll_number.clone()),
                password_hash: auth::hash_password(password)?,
                roll_number: Some(roll_number),
                email: None,
                club_id: None,
                active: true,
            }
        }
        Role::Faculty => {
            let email = required(req.faculty_email, "facultyEmail")?;
            let email = email.trim();
            if !validation::is_faculty_email(email) {
                return Err(AppError::bad_request("Invalid email format"));
            }
            let name = required(req.name, "name")?;
            if !validation::is_faculty_name(name.trim()) {
                return Err(AppError::bad_request("Invalid name format"));
            }
            let password = required(req.faculty_password, "facultyPassword")?;
            if !validation::is_strong_password(&password) {
                return Err(AppError::bad_request("Invalid password format"));
            }

            NewUser {
                role: Role::Faculty,
                username: normalize_username(email),
                name: name.trim().to_string(),
                password_hash: auth::hash_password(password)?,
                roll_number: None,
                email: Some(email.to_string()),
                club_id: None,
                active: true,
            }
        }
        Role::ClubHead => {
            let username = required(req.club_username, "clubUsername")?;
            if !validation::is_club_head_username(username.trim()) {
                return Err(AppError::bad_request("Invalid club username."));
            }
            let username = normalize_username(&username);
            let Some(club) = store.find_club_by_head(&username).await? else {
                return Err(AppError::bad_request("Invalid club username."));
            };
            if store.find_user(Role::ClubHead, &username).await?.is_some() {
                return Err(AppError::bad_request(
                    "This club already has a head assigned.",
                ));
            }
            let password = required(req.club_password, "clubPassword")?;

            NewUser {
                role: Role::ClubHead,
                username,
                name: req
                    .name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| format!("{} Head", club.name)),
                password_hash: auth::hash_password(password)?,
                roll_number: None,
                email: None,
                club_id: Some(club.id),
                active: true,
            }
        }
        Role::Admin => {
            if !caller.is_some_and(|c| c.role == Role::Admin) {
                return Err(AppError::from(
                    StatusCode::FORBIDDEN,
                    "Only an admin can register another admin",
                ));
            }
            let admin_id = required(req.admin_id, "adminId")?;
            if !validation::is_admin_id(admin_id.trim()) {
                return Err(AppError::bad_request("Invalid admin id format"));
            }
            let password = required(req.admin_password, "adminPassword")?;

            NewUser {
                role: Role::Admin,
                username: normalize_username(&admin_id),
                name: req.name.unwrap_or_default().trim().to_string(),
                password_hash: auth::hash_password(password)?,
                roll_number: None,
                email: None,
                club_id: None,
                active: true,
            }
        }
    };

    let user = store.insert_user(new_user).await?;
    info!(user_id = user.id, role = %user.role, username = %user.username, "account registered");

    let label = match user.role {
        Role::Student => "Student",
        Role::Faculty => "Faculty",
        Role::ClubHead => "Club Head",
        Role::Admin => "Admin",
    };
    Ok(Json(MessageResponse::new(format!(
        "{label} registration successful"
    ))))
}

async fn login(
    Extension(coordinator): Extension<Coordinator>,
    Extension(keys): Extension<Arc<Keys>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let role = parse_role(&req.role)?;
    let username = normalize_username(&req.username);

    let user = coordinator.store().find_user(role, &username).await?;
    let verified = match &user {
        Some(user) => auth::verify_password(&req.password, &user.password_hash)?,
        None => {
            auth::verify_nothing(&req.password);
            false
        }
    };

    match user {
        Some(user) if verified => {
            if !user.active {
                return Err(AppError::from(
                    StatusCode::FORBIDDEN,
                    "Account is deactivated",
                ));
            }
            info!(user_id = user.id, %role, "logged in");
            Ok(Json(LoginResponse {
                token: keys.generate_jwt(&user)?,
                role,
            }))
        }
        _ => Err(AppError::from(
            StatusCode::UNAUTHORIZED,
            "Invalid credentials",
        )),
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
