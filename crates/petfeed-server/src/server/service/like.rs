use super::AppState;
use crate::server::error::AppError;
use crate::server::model::{NewLike, PostLike};
use crate::server::store::StoreError;
use petfeed::SequentialId;

impl AppState {
    /// Records a like and bumps the post's like counter.
    pub fn like_post(&self, post_id: &SequentialId, new: NewLike) -> Result<PostLike, AppError> {
        new.validate()?;
        self.visible_post(post_id, Some(new.uid.as_str()))?;

        let like = self
            .store
            .insert_like(post_id, &new.uid, self.now())
            .map_err(|err| match err {
                StoreError::UniqueViolation { .. } => AppError::AlreadyExists {
                    what: format!("like by `{}` on post `{post_id}`", new.uid),
                },
                StoreError::ForeignKeyViolation { .. } => AppError::post_not_found(post_id),
            })?;

        tracing::info!(%post_id, uid = %like.uid, "post liked");
        Ok(like)
    }

    /// Withdraws a like; the counter never drops below zero.
    pub fn unlike_post(&self, post_id: &SequentialId, uid: &str) -> Result<(), AppError> {
        self.store
            .delete_like(post_id, uid)
            .ok_or_else(|| AppError::LikeNotFound {
                post_id: post_id.to_string(),
                uid: uid.to_owned(),
            })?;
        tracing::info!(%post_id, uid, "post unliked");
        Ok(())
    }
}
