//! Record shapes for the `users` and `posts` collections.
//! The store treats them as opaque JSON objects; only handlers interpret them.

use serde::{Deserialize, Serialize};

/// Collection holding user documents.
pub const USERS: &str = "users";

/// Collection holding post documents.
pub const POSTS: &str = "posts";

/// User document. `password` holds the base64-encoded credential envelope,
/// never the plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Assigned by the store on insert
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Post document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Assigned by the store on insert
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub caption: String,
    pub imgurl: String,
    /// RFC 3339 timestamp stamped by the server
    pub time: String,
    /// Owning user's id
    pub uid: String,
}
