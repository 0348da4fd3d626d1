use axum::http::StatusCode;
use tracing::{error, warn};

use crate::crud::CrudError;
use crate::store::StoreError;

/// Translates a CRUD failure into the status/body pair handlers return.
pub fn from_crud(err: CrudError) -> (StatusCode, String) {
    match err {
        CrudError::Store(StoreError::Conflict(msg)) => {
            warn!(%msg, "conflict");
            (StatusCode::CONFLICT, msg)
        }
        CrudError::Store(StoreError::ForeignKeyViolation(msg)) => {
            warn!(%msg, "foreign key violation");
            (StatusCode::NOT_FOUND, "User not found".into())
        }
        CrudError::Store(StoreError::Unavailable(msg)) => {
            error!(%msg, "store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable".into())
        }
        CrudError::Hash(e) => {
            error!(error = %e, "hash_password failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub fn bad_request(msg: &str) -> (StatusCode, String) {
    warn!(msg, "rejected request");
    (StatusCode::BAD_REQUEST, msg.to_string())
}
