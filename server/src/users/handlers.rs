use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::crypto::cipher;
use crate::db::models::{User, USERS};
use crate::db::{DocumentStore, Filter, InsertOneResult, StoreError};
use crate::error::ApiError;
use crate::state::AppState;

// --- Request types ---

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    /// Plaintext password; only its envelope is persisted
    pub password: String,
}

// --- Handlers ---

/// POST /users
/// Store a new user. The password is sealed with a key derived from the
/// user's name and stored as a base64 envelope.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let password = cipher::seal_stored(req.password.as_bytes(), &req.name)?;
    let user = User {
        id: String::new(),
        name: req.name,
        email: req.email,
        password,
    };
    let document = serde_json::to_value(&user).map_err(StoreError::from)?;

    let db = state.db.clone();
    let inserted = tokio::task::spawn_blocking(move || {
        let store = db.acquire();
        store.insert_one(USERS, document)
    })
    .await??;

    tracing::info!("User created successfully, ID: {}", inserted.inserted_id);
    Ok(Json(inserted))
}

/// GET /users/{id}
/// Return the stored user document, password envelope included.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let db = state.db.clone();

    let found = tokio::task::spawn_blocking(move || {
        let store = db.acquire();
        store.find_one(USERS, &Filter::new().eq("id", id))
    })
    .await??;

    let document = found.ok_or(ApiError::NotFound("User"))?;
    let user: User = serde_json::from_value(document).map_err(StoreError::from)?;
    Ok(Json(user))
}
