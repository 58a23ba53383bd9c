//! Post Entity
//!
//! Listings are managed elsewhere; this crate only enumerates the posts an
//! account owns and removes them together with the account.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{PostId, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub post_id: PostId,
    pub owner_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(owner_id: UserId, title: impl Into<String>) -> Self {
        Self {
            post_id: PostId::new(),
            owner_id,
            title: title.into(),
            created_at: super::user::now(),
        }
    }
}
