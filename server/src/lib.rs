//! Appointy users and posts server library.
//! This crate exposes internal modules for integration testing.
//! The binary entry point is in main.rs.

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod posts;
pub mod routes;
pub mod state;
pub mod users;
