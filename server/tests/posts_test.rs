//! Integration tests for posts: creation, lookup, and per-user pagination.

use serde_json::json;
use tokio::net::TcpListener;

use appointy_server::db::models::Post;

/// Helper: start the server on a random port and return the base URL.
async fn start_test_server() -> String {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = tmp_dir.path().to_str().unwrap().to_string();

    // Small batch size so listings cross cursor batch boundaries.
    let db = appointy_server::db::init_db(&data_dir, "appointy.db", 3)
        .expect("Failed to init DB");
    let state = appointy_server::state::AppState {
        db,
        posts_page_size: 2,
    };

    let app = appointy_server::routes::build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
        let _keep = tmp_dir;
    });

    format!("http://{}", addr)
}

/// Create a post and return its id.
async fn create_post(base_url: &str, uid: &str, caption: &str) -> String {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/posts", base_url))
        .json(&json!({
            "caption": caption,
            "imgurl": format!("https://img.example.com/{}.png", caption),
            "uid": uid,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200, "Post creation failed for {}", caption);
    let body: serde_json::Value = resp.json().await.unwrap();
    body["inserted_id"].as_str().unwrap().to_string()
}

async fn list_page(base_url: &str, path: &str) -> Vec<Post> {
    let resp = reqwest::get(format!("{}{}", base_url, path)).await.unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

fn captions(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.caption.as_str()).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_create_and_get_post() {
    let base_url = start_test_server().await;
    let id = create_post(&base_url, "u1", "sunset").await;

    let resp = reqwest::get(format!("{}/posts/{}", base_url, id))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let post: Post = resp.json().await.unwrap();
    assert_eq!(post.id, id);
    assert_eq!(post.caption, "sunset");
    assert_eq!(post.uid, "u1");
    assert!(chrono::DateTime::parse_from_rfc3339(&post.time).is_ok());
}

#[tokio::test]
async fn test_get_unknown_post_returns_404() {
    let base_url = start_test_server().await;
    let resp = reqwest::get(format!("{}/posts/nope", base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_user_posts_are_paginated_in_order() {
    let base_url = start_test_server().await;
    for caption in ["a", "b", "c", "d", "e"] {
        create_post(&base_url, "u1", caption).await;
        create_post(&base_url, "u2", &format!("other-{}", caption)).await;
    }

    let page1 = list_page(&base_url, "/posts/users/u1/1").await;
    let page2 = list_page(&base_url, "/posts/users/u1/2").await;
    let page3 = list_page(&base_url, "/posts/users/u1/3").await;
    let page4 = list_page(&base_url, "/posts/users/u1/4").await;

    assert_eq!(captions(&page1), vec!["a", "b"]);
    assert_eq!(captions(&page2), vec!["c", "d"]);
    assert_eq!(captions(&page3), vec!["e"]);
    assert!(page4.is_empty());
    assert!(page1.iter().all(|p| p.uid == "u1"));
}

#[tokio::test]
async fn test_user_posts_without_page_is_first_page() {
    let base_url = start_test_server().await;
    for caption in ["a", "b", "c"] {
        create_post(&base_url, "u1", caption).await;
    }

    let default_page = list_page(&base_url, "/posts/users/u1").await;
    assert_eq!(captions(&default_page), vec!["a", "b"]);
}

#[tokio::test]
async fn test_page_zero_and_unknown_user_are_empty() {
    let base_url = start_test_server().await;
    create_post(&base_url, "u1", "a").await;

    assert!(list_page(&base_url, "/posts/users/u1/0").await.is_empty());
    assert!(list_page(&base_url, "/posts/users/ghost/1").await.is_empty());
}

#[tokio::test]
async fn test_non_numeric_page_rejected() {
    let base_url = start_test_server().await;
    let resp = reqwest::get(format!("{}/posts/users/u1/first", base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
