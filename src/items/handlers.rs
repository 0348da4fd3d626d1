use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    crud::{self, ItemCreate},
    db::DbSession,
    rejection::{bad_request, from_crud},
    state::AppState,
    store::Item,
};

use super::dto::Pagination;

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/items/", get(read_items))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/users/:user_id/items/", post(create_item_for_user))
}

#[instrument(skip(db))]
pub async fn read_items(
    mut db: DbSession,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Item>>, (StatusCode, String)> {
    let items = crud::list_items(db.session(), p.skip, p.limit)
        .await
        .map_err(from_crud)?;
    Ok(Json(items))
}

#[instrument(skip(db, payload))]
pub async fn create_item_for_user(
    mut db: DbSession,
    Path(user_id): Path<i64>,
    Json(mut payload): Json<ItemCreate>,
) -> Result<Json<Item>, (StatusCode, String)> {
    payload.title = payload.title.trim().to_string();
    if payload.title.is_empty() {
        return Err(bad_request("Title is required"));
    }

    let item = crud::create_item_for_user(db.session(), &payload, user_id)
        .await
        .map_err(from_crud)?;
    info!(item_id = item.id, owner_id = item.owner_id, "item created");
    Ok(Json(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::UserCreate;
    use crate::test_support::CountingStore;

    async fn session(state: &AppState) -> DbSession {
        DbSession(state.store.session().await.unwrap())
    }

    async fn seed_user(state: &AppState, username: &str) -> i64 {
        let mut db = session(state).await;
        let user = crud::register_user(
            db.session(),
            &UserCreate {
                username: username.into(),
                password: "secret".into(),
                email: None,
            },
        )
        .await
        .unwrap();
        user.id
    }

    fn milk() -> Json<ItemCreate> {
        Json(ItemCreate {
            title: "Buy milk".into(),
            description: None,
        })
    }

    fn page(skip: u32, limit: u32) -> Query<Pagination> {
        Query(Pagination { skip, limit })
    }

    #[tokio::test]
    async fn create_item_for_existing_user() {
        let state = AppState::fake();
        let alice = seed_user(&state, "alice").await;

        let Json(item) = create_item_for_user(session(&state).await, Path(alice), milk())
            .await
            .unwrap();
        assert_eq!(item.owner_id, alice);
        assert_eq!(item.title, "Buy milk");
        assert!(item.description.is_none());
    }

    #[tokio::test]
    async fn create_item_for_missing_user_is_404_and_writes_nothing() {
        let state = AppState::fake();
        let (status, _) = create_item_for_user(session(&state).await, Path(77), milk())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let Json(items) = read_items(session(&state).await, page(0, 100)).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn blank_title_is_400() {
        let state = AppState::fake();
        let alice = seed_user(&state, "alice").await;
        let body = Json(ItemCreate {
            title: "   ".into(),
            description: Some("nothing".into()),
        });
        let (status, _) = create_item_for_user(session(&state).await, Path(alice), body)
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn skip_past_end_is_empty_not_error() {
        let state = AppState::fake();
        let alice = seed_user(&state, "alice").await;
        for _ in 0..5 {
            let Json(item) = create_item_for_user(session(&state).await, Path(alice), milk())
                .await
                .unwrap();
            assert_eq!(item.owner_id, alice);
        }

        let Json(all) = read_items(session(&state).await, page(0, 100)).await.unwrap();
        assert_eq!(all.len(), 5);

        let Json(none) = read_items(session(&state).await, page(1000, 10)).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn foreign_key_violation_still_releases_the_session() {
        let store = CountingStore::default();
        let state = store.state();

        let db = session(&state).await;
        assert_eq!(store.live(), 1);
        let (status, _) = create_item_for_user(db, Path(404), milk())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(store.live(), 0);
    }

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!((p.skip, p.limit), (0, 100));
        assert!(serde_json::from_str::<Pagination>(r#"{"skip": -1}"#).is_err());
    }
}
