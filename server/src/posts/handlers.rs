use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::models::{Post, POSTS};
use crate::db::{DocumentStore, Filter, InsertOneResult, StoreError};
use crate::error::ApiError;
use crate::state::AppState;

// --- Request types ---

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub caption: String,
    pub imgurl: String,
    pub uid: String,
}

// --- Handlers ---

/// POST /posts
/// Store a new post stamped with the current server time.
pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let post = Post {
        id: String::new(),
        caption: req.caption,
        imgurl: req.imgurl,
        time: Utc::now().to_rfc3339(),
        uid: req.uid,
    };
    let document = serde_json::to_value(&post).map_err(StoreError::from)?;

    let db = state.db.clone();
    let inserted = tokio::task::spawn_blocking(move || {
        let store = db.acquire();
        store.insert_one(POSTS, document)
    })
    .await??;

    tracing::info!("Post inserted successfully, ID: {}", inserted.inserted_id);
    Ok(Json(inserted))
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let db = state.db.clone();

    let found = tokio::task::spawn_blocking(move || {
        let store = db.acquire();
        store.find_one(POSTS, &Filter::new().eq("id", id))
    })
    .await??;

    let document = found.ok_or(ApiError::NotFound("Post"))?;
    let post: Post = serde_json::from_value(document).map_err(StoreError::from)?;
    Ok(Json(post))
}

/// GET /posts/users/{uid}/{page}
/// One page of a user's posts in insertion order. Pages start at 1.
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path((uid, page)): Path<(String, u32)>,
) -> Result<Json<Vec<Post>>, ApiError> {
    user_posts_page(state, uid, page).await.map(Json)
}

/// GET /posts/users/{uid}
/// Same as page 1.
pub async fn list_user_posts_first_page(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Vec<Post>>, ApiError> {
    user_posts_page(state, uid, 1).await.map(Json)
}

async fn user_posts_page(state: AppState, uid: String, page: u32) -> Result<Vec<Post>, ApiError> {
    let page_size = state.posts_page_size;
    let Some(range) = page_range(page, page_size) else {
        return Ok(Vec::new());
    };

    let db = state.db.clone();
    let posts = tokio::task::spawn_blocking(move || {
        let store = db.acquire();
        let cursor = store.find(POSTS, &Filter::new().eq("uid", uid))?;

        let mut posts = Vec::with_capacity(page_size);
        for (index, document) in cursor.enumerate() {
            if index >= range.end {
                break;
            }
            let document = document?;
            if index >= range.start {
                posts.push(serde_json::from_value::<Post>(document)?);
            }
        }
        Ok::<_, StoreError>(posts)
    })
    .await??;

    Ok(posts)
}

/// Index range of a 1-based page; `None` when the page cannot hold anything.
fn page_range(page: u32, page_size: usize) -> Option<std::ops::Range<usize>> {
    if page == 0 || page_size == 0 {
        return None;
    }
    let start = (page as usize - 1).checked_mul(page_size)?;
    let end = start.checked_add(page_size)?;
    Some(start..end)
}
