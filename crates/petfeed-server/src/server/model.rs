//! Records persisted by the [`Store`](crate::server::store::Store) and the
//! request payloads that create or modify them.
//!
//! Partial updates are explicit: every `*Patch` type lists the fields it may
//! touch as `Option`s and merges them with [`PostPatch::apply`] /
//! [`CommentPatch::apply`].

use crate::server::error::AppError;
use chrono::{DateTime, Utc};
use core::cmp::Ordering;
use petfeed::{Record, SequentialId};
use serde::{Deserialize, Serialize};

/// Longest accepted user id, in characters.
pub const UID_MAX_CHARS: usize = 50;
/// Longest accepted post title, in characters.
pub const TITLE_MAX_CHARS: usize = 300;
/// Longest accepted comment, in characters.
pub const MESSAGE_MAX_CHARS: usize = 3000;

/// Who may read a post.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    /// Readable by the author's friends. Friendship is not modelled here, so
    /// only the author sees these.
    Friends,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: SequentialId,
    pub uid: String,
    pub title: String,
    pub content: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub is_deleted: bool,
    pub post_likes: u32,
    pub post_shares: u32,
}

impl Post {
    /// Authors see all of their own posts; everybody else sees public ones.
    pub fn is_visible_to(&self, viewer: Option<&str>) -> bool {
        viewer == Some(self.uid.as_str()) || self.visibility == Visibility::Public
    }
}

impl Record for Post {
    type Id = SequentialId;
    const SORT_FIELDS: &'static [&'static str] = &[
        "post_id",
        "created_at",
        "last_updated",
        "post_likes",
        "post_shares",
        "title",
    ];

    fn id(&self) -> &SequentialId {
        &self.post_id
    }

    fn cmp_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "post_id" => self.post_id.cmp(&other.post_id),
            "created_at" => self.created_at.cmp(&other.created_at),
            "last_updated" => self.last_updated.cmp(&other.last_updated),
            "post_likes" => self.post_likes.cmp(&other.post_likes),
            "post_shares" => self.post_shares.cmp(&other.post_shares),
            "title" => self.title.cmp(&other.title),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: u64,
    pub post_id: SequentialId,
    pub uid: String,
    pub message: String,
    pub parent_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl Record for Comment {
    type Id = u64;
    const SORT_FIELDS: &'static [&'static str] = &["comment_id", "created_at"];

    fn id(&self) -> &u64 {
        &self.comment_id
    }

    fn cmp_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "comment_id" => self.comment_id.cmp(&other.comment_id),
            "created_at" => self.created_at.cmp(&other.created_at),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLike {
    pub like_id: u64,
    pub post_id: SequentialId,
    pub uid: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /posts`.
#[derive(Clone, Debug, Deserialize)]
pub struct NewPost {
    pub uid: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub visibility: Visibility,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), AppError> {
        check_text("uid", &self.uid, UID_MAX_CHARS)?;
        check_text("title", &self.title, TITLE_MAX_CHARS)?;
        check_text("content", &self.content, usize::MAX)
    }

    /// Materializes the post under a freshly generated id.
    pub fn into_post(self, post_id: SequentialId, now: DateTime<Utc>) -> Post {
        Post {
            post_id,
            uid: self.uid,
            title: self.title,
            content: self.content,
            visibility: self.visibility,
            created_at: now,
            last_updated: now,
            is_deleted: false,
            post_likes: 0,
            post_shares: 0,
        }
    }
}

/// Body of `PATCH /posts/{post_id}`. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub visibility: Option<Visibility>,
    pub is_deleted: Option<bool>,
}

impl PostPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            check_text("title", title, TITLE_MAX_CHARS)?;
        }
        if let Some(content) = &self.content {
            check_text("content", content, usize::MAX)?;
        }
        Ok(())
    }

    /// Merges the present fields into `post`, returning whether anything
    /// actually changed. `last_updated` is the caller's concern.
    pub fn apply(self, post: &mut Post) -> bool {
        let mut changed = false;
        changed |= merge(&mut post.title, self.title);
        changed |= merge(&mut post.content, self.content);
        changed |= merge(&mut post.visibility, self.visibility);
        changed |= merge(&mut post.is_deleted, self.is_deleted);
        changed
    }
}

/// Body of `POST /posts/{post_id}/comments`.
#[derive(Clone, Debug, Deserialize)]
pub struct NewComment {
    pub uid: String,
    pub message: String,
    #[serde(default)]
    pub parent_id: Option<u64>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), AppError> {
        check_text("uid", &self.uid, UID_MAX_CHARS)?;
        check_text("message", &self.message, MESSAGE_MAX_CHARS)
    }
}

/// Body of `PATCH /comments/{comment_id}`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentPatch {
    pub message: Option<String>,
}

impl CommentPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        match &self.message {
            Some(message) => check_text("message", message, MESSAGE_MAX_CHARS),
            None => Ok(()),
        }
    }

    pub fn apply(self, comment: &mut Comment) -> bool {
        merge(&mut comment.message, self.message)
    }
}

/// Body of `POST /posts/{post_id}/likes`.
#[derive(Clone, Debug, Deserialize)]
pub struct NewLike {
    pub uid: String,
}

impl NewLike {
    pub fn validate(&self) -> Result<(), AppError> {
        check_text("uid", &self.uid, UID_MAX_CHARS)
    }
}

fn merge<T: PartialEq>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(value) if *slot != value => {
            *slot = value;
            true
        }
        _ => false,
    }
}

fn check_text(field: &str, value: &str, max_chars: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidRequest {
            reason: format!("`{field}` must not be empty"),
        });
    }
    if value.chars().count() > max_chars {
        return Err(AppError::InvalidRequest {
            reason: format!("`{field}` exceeds {max_chars} characters"),
        });
    }
    Ok(())
}
