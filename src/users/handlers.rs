use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    crud::{self, UserCreate},
    db::DbSession,
    rejection::{bad_request, from_crud},
    state::AppState,
};

use super::dto::{PublicUser, UserLookup};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", post(create_user).get(find_user))
        .route("/users/:user_id", get(read_user))
}

#[instrument(skip(state, db, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    mut db: DbSession,
    Json(mut payload): Json<UserCreate>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    payload.username = payload.username.trim().to_string();
    if payload.username.is_empty() {
        return Err(bad_request("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(bad_request("Password is required"));
    }
    if let Some(email) = payload.email.take() {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(bad_request("Invalid email"));
        }
        payload.email = Some(email);
    }

    let user = crud::register_user(db.session(), &payload)
        .await
        .map_err(from_crud)?;
    // Give the connection back before any outbound call.
    drop(db);
    let public = PublicUser::from(user);
    info!(user_id = public.id, username = %public.username, "user registered");

    if let Some(notifier) = &state.notifier {
        if let Err(e) = notifier.user_registered(&public).await {
            warn!(error = %e, user_id = public.id, "registration notification failed");
        }
    }

    Ok(Json(public))
}

#[instrument(skip(db))]
pub async fn read_user(
    mut db: DbSession,
    Path(user_id): Path<i64>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    match crud::get_user(db.session(), user_id).await.map_err(from_crud)? {
        Some(user) => Ok(Json(user.into())),
        None => Err((StatusCode::NOT_FOUND, "User not found".into())),
    }
}

#[instrument(skip(db))]
pub async fn find_user(
    mut db: DbSession,
    Query(q): Query<UserLookup>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let found = match (q.username.as_deref(), q.email.as_deref()) {
        (Some(username), None) => crud::get_user_by_username(db.session(), username.trim()).await,
        (None, Some(email)) => {
            crud::get_user_by_email(db.session(), &email.trim().to_lowercase()).await
        }
        _ => return Err(bad_request("Exactly one of username or email is required")),
    }
    .map_err(from_crud)?;

    found
        .map(|u| Json(u.into()))
        .ok_or((StatusCode::NOT_FOUND, "User not found".into()))
}
