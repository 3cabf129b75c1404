//! Core data models for the photo-sharing service.
//!
//! These entities represent users, photos and the comments attached to them.
//! They map cleanly to database tables via `sqlx::FromRow` and serialize
//! naturally as JSON via `serde`.

pub mod comment;
pub mod photo;
pub mod user;
