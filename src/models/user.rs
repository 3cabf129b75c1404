//! Represents a user profile and its summary form.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A full user profile.
///
/// Profiles are read-only from this service's perspective; they are
/// provisioned and removed by an external process.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct User {
    /// Opaque unique identity token.
    pub id: Uuid,

    pub first_name: String,

    pub last_name: String,

    /// Free-text location, e.g. "Palo Alto, CA".
    pub location: String,

    /// Short self-description shown on the profile page.
    pub description: String,

    pub occupation: String,
}

/// The slim projection of a user used for directory listings and for the
/// denormalized author attached to each comment.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl UserSummary {
    /// Placeholder summary substituted when a comment's author record no
    /// longer exists. Aggregation must not fail on a dangling author id.
    pub fn unknown(id: Uuid) -> Self {
        Self {
            id,
            first_name: "Unknown".into(),
            last_name: "User".into(),
        }
    }
}
