use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tracing::error;

use crate::state::AppState;
use crate::store::StoreSession;

/// Request-scoped store session. Acquired before the handler runs and
/// released when the handler's future is dropped, however it ends.
pub struct DbSession(pub Box<dyn StoreSession>);

impl DbSession {
    pub fn session(&mut self) -> &mut dyn StoreSession {
        self.0.as_mut()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for DbSession {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = state.store.session().await.map_err(|e| {
            error!(error = %e, "failed to acquire store session");
            (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable".into())
        })?;
        Ok(DbSession(session))
    }
}
