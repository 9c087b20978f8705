use crate::{
    coordinator::Coordinator,
    error::AppError,
    models::{Role, User},
};
use argon2::Argon2;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};
use jsonwebtoken::{errors::Result as JwtResult, DecodingKey, EncodingKey, Header, Validation};
use password_hash::{
    self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, marker::PhantomData, sync::Arc, time::Duration};

pub fn hash_password(password: impl AsRef<[u8]>) -> password_hash::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_ref(), &salt)
        .map(|h| h.to_string())
}

pub fn verify_password(
    password: impl AsRef<[u8]>,
    password_hash: impl AsRef<str>,
) -> password_hash::Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash.as_ref())?;
    Ok(Argon2::default()
        .verify_password(password.as_ref(), &parsed_hash)
        .is_ok())
}

lazy_static::lazy_static! {
    static ref DUMMY_HASH: Option<String> = hash_password(rand::random::<[u8; 32]>()).ok();
}

/// Spends the same work as [`verify_password`] when there is no stored hash
/// to check against, so unknown usernames answer as slowly as wrong passwords.
pub fn verify_nothing(password: impl AsRef<[u8]>) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub role: Role,
    pub username: String,
    pub name: String,
    pub exp: u64,
}

/// Signs and verifies session tokens. Installed as an `Extension` so the
/// role guards below can reach it.
pub struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Keys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn generate_jwt(&self, user: &User) -> JwtResult<String> {
        self.sign(&Claims {
            id: user.id,
            role: user.role,
            username: user.username.clone(),
            name: user.name.clone(),
            exp: jsonwebtoken::get_current_timestamp() + self.ttl.as_secs(),
        })
    }

    pub fn sign(&self, claims: &Claims) -> JwtResult<String> {
        jsonwebtoken::encode(&Header::default(), claims, &self.encoding)
    }

    pub fn validate_jwt(&self, token: &str) -> JwtResult<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

/// Validates the bearer token, then checks that the account behind it still
/// exists with the same role and has not been deactivated.
async fn authenticate(parts: &Parts) -> Result<Claims, AppError> {
    let keys = parts
        .extensions
        .get::<Arc<Keys>>()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("token keys are not installed"))?;
    let coordinator = parts
        .extensions
        .get::<Coordinator>()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("coordinator is not installed"))?;

    let Some(token) = bearer_token(parts) else {
        return Err(AppError::from(
            StatusCode::UNAUTHORIZED,
            "Access denied. No token provided.",
        ));
    };

    let claims = keys.validate_jwt(token).map_err(|e| {
        tracing::debug!(error = %e, "rejected token");
        AppError::from(StatusCode::UNAUTHORIZED, "Invalid token.")
    })?;

    match coordinator.store().get_user(claims.id).await? {
        Some(user) if user.role == claims.role => {
            if !user.active {
                return Err(AppError::from(
                    StatusCode::FORBIDDEN,
                    "Account is deactivated",
                ));
            }
            Ok(claims)
        }
        _ => {
            tracing::debug!(user_id = claims.id, "token for a removed account");
            Err(AppError::from(StatusCode::UNAUTHORIZED, "Invalid token."))
        }
    }
}

/// Any authenticated caller.
pub struct ExtractAuth(pub Claims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ExtractAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts).await.map(ExtractAuth)
    }
}

/// The caller, if the request carries a token for an active account. Public
/// routes use it to unlock extra behaviour; a stale or malformed token only
/// means the request is treated as anonymous.
pub struct MaybeAuth(pub Option<Claims>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeAuth {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if bearer_token(parts).is_none() {
            return Ok(MaybeAuth(None));
        }
        Ok(MaybeAuth(authenticate(parts).await.ok()))
    }
}

pub trait RequiredRoles {
    const ROLES: &'static [Role];
}

/// Authenticated caller whose role is one of `R::ROLES`.
pub struct Authorized<R> {
    pub claims: Claims,
    _role: PhantomData<R>,
}

#[async_trait]
impl<S: Send + Sync, R: RequiredRoles> FromRequestParts<S> for Authorized<R> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts).await?;
        if !R::ROLES.contains(&claims.role) {
            return Err(AppError::from(StatusCode::FORBIDDEN, "Unauthorized"));
        }
        Ok(Authorized {
            claims,
            _role: PhantomData,
        })
    }
}

macro_rules! role_guard {
    ($($alias:ident => $marker:ident [$($role:ident),+]),* $(,)?) => {$(
        pub struct $marker;

        impl RequiredRoles for $marker {
            const ROLES: &'static [Role] = &[$(Role::$role),+];
        }

        pub type $alias = Authorized<$marker>;
    )*};
}

role_guard! {
    StudentOnly => StudentRole [Student],
    ClubHeadOnly => ClubHeadRole [ClubHead],
    FacultyOnly => FacultyRole [Faculty],
    AdminOnly => AdminRole [Admin],
    FacultyOrAdmin => ReviewerRole [Faculty, Admin],
}
