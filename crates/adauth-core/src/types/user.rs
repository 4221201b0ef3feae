//! User types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Host-side user record handed to `authenticate_user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            display_name: None,
            created_at: Utc::now(),
        }
    }
}
