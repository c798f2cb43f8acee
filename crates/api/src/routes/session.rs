//! Session endpoints for the login and logout flows.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use cart::{SessionProvider, User};
use checkout::BookingService;
use serde::{Deserialize, Serialize};
use storage::KeyValueStore;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub user: User,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<User>,
    pub authenticated: bool,
}

impl SessionResponse {
    fn new(user: Option<User>) -> Self {
        Self {
            authenticated: user.is_some(),
            user,
        }
    }
}

/// GET /session: who is signed in.
pub async fn current<K, B>(State(state): State<Arc<AppState<K, B>>>) -> Json<SessionResponse>
where
    K: KeyValueStore + 'static,
    B: BookingService + 'static,
{
    Json(SessionResponse::new(state.session.current_user()))
}

/// PUT /session: record a login performed against the backend.
#[tracing::instrument(skip(state, req), fields(user_id = %req.user.id))]
pub async fn sign_in<K, B>(
    State(state): State<Arc<AppState<K, B>>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, ApiError>
where
    K: KeyValueStore + 'static,
    B: BookingService + 'static,
{
    state.session.sign_in(&req.user, req.token.as_deref())?;
    Ok(Json(SessionResponse::new(Some(req.user))))
}

/// DELETE /session: log out and drop the cart.
#[tracing::instrument(skip(state))]
pub async fn sign_out<K, B>(
    State(state): State<Arc<AppState<K, B>>>,
) -> Result<StatusCode, ApiError>
where
    K: KeyValueStore + 'static,
    B: BookingService + 'static,
{
    state.session.sign_out()?;
    state.cart().discard()?;
    state.notices.info("You have logged out successfully.");
    Ok(StatusCode::NO_CONTENT)
}
