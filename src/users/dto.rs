use serde::{Deserialize, Serialize};

use crate::store::User;

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
        }
    }
}

/// `GET /users/?username=..` or `?email=..`; exactly one must be given.
#[derive(Debug, Deserialize)]
pub struct UserLookup {
    pub username: Option<String>,
    pub email: Option<String>,
}
