use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, ProfileResponse, ProfileUpdatedResponse, SignupRequest,
            UpdateProfileRequest,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{ApiError, FieldError, StoreError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_signup(payload: &SignupRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let name_len = payload.name.chars().count();
    if name_len < 2 || name_len > 50 {
        errors.push(FieldError::new(
            "name",
            "Name must be between 2 and 50 characters",
        ));
    }
    if !is_valid_email(&payload.email) {
        errors.push(FieldError::new("email", "Please enter a valid email"));
    }
    if payload.password.chars().count() < 6 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    errors
}

fn validate_profile(payload: &UpdateProfileRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(name) = &payload.name {
        let len = name.chars().count();
        if len < 2 || len > 50 {
            errors.push(FieldError::new(
                "name",
                "Name must be between 2 and 50 characters",
            ));
        }
    }
    if let Some(email) = &payload.email {
        if !is_valid_email(email) {
            errors.push(FieldError::new("email", "Please enter a valid email"));
        }
    }
    errors
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.name = payload.name.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    let errors = validate_signup(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "signup with taken email");
        return Err(ApiError::Duplicate("User already exists with this email"));
    }

    let hash = hash_password(&payload.password)?;

    // The pre-check races with concurrent signups; the unique index has the
    // final word.
    let user = match User::create(&state.db, &payload.name, &payload.email, &hash).await {
        Ok(u) => u,
        Err(StoreError::DuplicateEmail) => {
            warn!(email = %payload.email, "signup lost duplicate-email race");
            return Err(ApiError::Duplicate("User already exists with this email"));
        }
        Err(e) => return Err(e.into()),
    };

    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully",
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if !is_valid_email(&payload.email) {
        errors.push(FieldError::new("email", "Please enter a valid email"));
    }
    if payload.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // Unknown email and wrong password answer identically, so the endpoint
    // cannot be used to probe which addresses have accounts.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!("login with unknown email");
            return Err(ApiError::Unauthenticated("Invalid email or password"));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::Unauthenticated("Invalid email or password"));
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful",
        token,
        user: user.into(),
    }))
}

#[instrument(skip_all)]
pub async fn get_profile(AuthUser(user): AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse { user: user.into() })
}

#[instrument(skip(state, user, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileUpdatedResponse>, ApiError> {
    payload.name = payload.name.map(|n| n.trim().to_string());
    payload.email = payload.email.map(|e| e.trim().to_lowercase());

    let errors = validate_profile(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let updated = match User::update_profile(
        &state.db,
        user.id,
        payload.name.as_deref(),
        payload.email.as_deref(),
    )
    .await
    {
        Ok(Some(u)) => u,
        Ok(None) => {
            // Accounts are never deleted, so the row must exist.
            return Err(anyhow::anyhow!("profile update matched no row").into());
        }
        Err(StoreError::DuplicateEmail) => {
            warn!(user_id = %user.id, "profile update to taken email");
            return Err(ApiError::Duplicate("Email already in use"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %updated.id, "profile updated");
    Ok(Json(ProfileUpdatedResponse {
        message: "Profile updated successfully",
        user: updated.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses_and_rejects_junk() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@at@signs.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn signup_validation_itemizes_every_bad_field() {
        let payload = SignupRequest {
            name: "A".into(),
            email: "nope".into(),
            password: "12345".into(),
        };
        let errors = validate_signup(&payload);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.field == "name"));
        assert!(errors.iter().any(|e| e.field == "email"));
        assert!(errors.iter().any(|e| e.field == "password"));
    }

    #[test]
    fn signup_validation_passes_good_input() {
        let payload = SignupRequest {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password: "secret-enough".into(),
        };
        assert!(validate_signup(&payload).is_empty());
    }

    #[test]
    fn name_bounds_are_inclusive() {
        let mut payload = SignupRequest {
            name: "Al".into(),
            email: "al@example.com".into(),
            password: "123456".into(),
        };
        assert!(validate_signup(&payload).is_empty());
        payload.name = "x".repeat(50);
        assert!(validate_signup(&payload).is_empty());
        payload.name = "x".repeat(51);
        assert_eq!(validate_signup(&payload).len(), 1);
    }

    #[test]
    fn profile_validation_ignores_absent_fields() {
        let payload = UpdateProfileRequest {
            name: None,
            email: None,
        };
        assert!(validate_profile(&payload).is_empty());

        let payload = UpdateProfileRequest {
            name: Some("A".into()),
            email: Some("bad".into()),
        };
        assert_eq!(validate_profile(&payload).len(), 2);
    }
}
