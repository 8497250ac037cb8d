use super::{AppState, ListQuery};
use crate::server::error::AppError;
use crate::server::model::{Comment, CommentPatch, NewComment, Post};
use petfeed::{Page, Paginator, SequentialId};
use serde::Serialize;

/// Newest first.
pub const DEFAULT_COMMENT_SORT: &str = "-comment_id";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub can_modify: bool,
}

pub fn parse_comment_id(raw: &str) -> Result<u64, AppError> {
    raw.parse().map_err(|_| AppError::comment_not_found(raw))
}

impl AppState {
    /// Adds a comment, optionally as a reply to another comment on the same
    /// post.
    pub fn create_comment(&self, post_id: &SequentialId, new: NewComment) -> Result<Comment, AppError> {
        new.validate()?;
        self.visible_post(post_id, Some(new.uid.as_str()))?;

        if let Some(parent_id) = new.parent_id {
            match self.store.comment(parent_id) {
                Some(parent) if parent.post_id == *post_id => {}
                Some(_) => {
                    return Err(AppError::invalid_request(format!(
                        "comment {parent_id} belongs to another post"
                    )));
                }
                None => return Err(AppError::comment_not_found(parent_id)),
            }
        }

        let now = self.now();
        let comment = self.store.insert_comment(|comment_id| Comment {
            comment_id,
            post_id: *post_id,
            uid: new.uid,
            message: new.message,
            parent_id: new.parent_id,
            created_at: now,
        })?;

        tracing::info!(%post_id, comment_id = comment.comment_id, "comment created");
        Ok(comment)
    }

    /// One page of a post's comments, each flagged with whether the viewer
    /// wrote it.
    pub fn list_comments(
        &self,
        post_id: &SequentialId,
        query: &ListQuery,
    ) -> Result<Page<CommentView, u64>, AppError> {
        let viewer = query.viewer_id.as_deref();
        self.visible_post(post_id, viewer)?;
        let request = query.to_request(&self.config, DEFAULT_COMMENT_SORT, "comment_id")?;

        let comments = self.store.comments(|comment| comment.post_id == *post_id);
        let page = Paginator::new(comments).paginate(&request)?;

        Ok(page.map(|comment| CommentView {
            can_modify: viewer == Some(comment.uid.as_str()),
            comment,
        }))
    }

    /// Edits a comment. Comments under a soft-deleted post are hidden and
    /// cannot be edited.
    pub fn update_comment(&self, comment_id: u64, patch: CommentPatch) -> Result<Comment, AppError> {
        patch.validate()?;
        let post_id = self
            .store
            .comment(comment_id)
            .ok_or_else(|| AppError::comment_not_found(comment_id))?
            .post_id;
        self.live_post(&post_id)
            .map_err(|_| AppError::comment_not_found(comment_id))?;

        self.store
            .update_comment(comment_id, |comment| {
                patch.apply(comment);
                comment.clone()
            })
            .ok_or_else(|| AppError::comment_not_found(comment_id))
    }

    /// Deletes a comment and every reply below it.
    pub fn delete_comment(&self, comment_id: u64) -> Result<(), AppError> {
        self.store
            .delete_comment(comment_id)
            .ok_or_else(|| AppError::comment_not_found(comment_id))?;
        tracing::info!(comment_id, "comment deleted");
        Ok(())
    }

    pub(super) fn live_post(&self, post_id: &SequentialId) -> Result<Post, AppError> {
        self.store
            .post(post_id)
            .filter(|post| !post.is_deleted)
            .ok_or_else(|| AppError::post_not_found(post_id))
    }

    /// A live post `uid` is allowed to see. Hidden posts are reported as
    /// missing.
    pub(super) fn visible_post(&self, post_id: &SequentialId, uid: Option<&str>) -> Result<Post, AppError> {
        self.live_post(post_id)
            .ok()
            .filter(|post| post.is_visible_to(uid))
            .ok_or_else(|| AppError::post_not_found(post_id))
    }
}
