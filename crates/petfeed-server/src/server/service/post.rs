use super::{AppState, ListQuery};
use crate::server::error::AppError;
use crate::server::model::{NewPost, Post, PostPatch};
use crate::server::store::StoreError;
use chrono::{DateTime, NaiveDate, Utc};
use core::fmt;
use petfeed::{IdLookup, Page, Paginator, SequentialId, SequentialIdGenerator, TimeSource, local_seconds};
use serde::Serialize;

/// Newest first.
pub const DEFAULT_POST_SORT: &str = "-post_id";

/// A post as presented to a particular viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub comment_count: usize,
    pub liked: bool,
    pub can_modify: bool,
}

/// Parses a post id taken from a URL. Anything that is not a well-formed id
/// cannot name an existing post.
pub fn parse_post_id(raw: &str) -> Result<SequentialId, AppError> {
    raw.parse().map_err(|_| AppError::post_not_found(raw))
}

impl AppState {
    #[tracing::instrument(level = "debug", skip_all, fields(uid = %new.uid))]
    pub fn create_post(&self, new: NewPost) -> Result<Post, AppError> {
        new.validate()?;
        let now = self.now();

        let post = insert_with_fresh_id(
            &self.generator,
            self.store.as_ref(),
            now,
            self.config.id_insert_attempts,
            |post_id| self.store.insert_post(new.clone().into_post(post_id, now)),
        )?;

        tracing::info!(post_id = %post.post_id, "post created");
        Ok(post)
    }

    pub fn get_post(&self, post_id: &SequentialId, viewer: Option<&str>) -> Result<PostView, AppError> {
        self.store
            .post(post_id)
            .filter(|post| !post.is_deleted && post.is_visible_to(viewer))
            .map(|post| self.view_post(post, viewer))
            .ok_or_else(|| AppError::post_not_found(post_id))
    }

    /// One page of the posts `query.viewer_id` may see.
    pub fn list_posts(&self, query: &ListQuery) -> Result<Page<PostView, SequentialId>, AppError> {
        let request = query.to_request(&self.config, DEFAULT_POST_SORT, "post_id")?;
        let viewer = query.viewer_id.as_deref();

        let posts = self
            .store
            .posts(|post| !post.is_deleted && post.is_visible_to(viewer));
        let page = Paginator::new(posts).paginate(&request)?;

        tracing::debug!(returned = page.len(), has_more = page.has_more(), "posts listed");
        Ok(page.map(|post| self.view_post(post, viewer)))
    }

    /// Merges `patch` into the post. A soft-deleted post only accepts a patch
    /// that restores it (`is_deleted: false`).
    pub fn update_post(&self, post_id: &SequentialId, patch: PostPatch) -> Result<Post, AppError> {
        patch.validate()?;
        let now = self.now();

        self.store
            .update_post(post_id, |post| {
                if post.is_deleted && patch.is_deleted != Some(false) {
                    return Err(AppError::post_not_found(post_id));
                }
                if patch.apply(post) {
                    post.last_updated = now;
                }
                Ok(post.clone())
            })
            .ok_or_else(|| AppError::post_not_found(post_id))?
    }

    pub fn delete_post(&self, post_id: &SequentialId) -> Result<(), AppError> {
        self.store
            .delete_post(post_id)
            .ok_or_else(|| AppError::post_not_found(post_id))?;
        tracing::info!(%post_id, "post deleted");
        Ok(())
    }

    /// Posts `uid` created on `date` (`YYYYMMDD`, in the id timezone), oldest
    /// first.
    pub fn journey(&self, uid: &str, date: &str, viewer: Option<&str>) -> Result<Vec<Post>, AppError> {
        let day = parse_compact_date(date)?;
        let tz = self.config.timezone;

        let mut posts = self.store.posts(|post| {
            post.uid == uid
                && !post.is_deleted
                && post.is_visible_to(viewer)
                && local_seconds(post.created_at, tz).date() == day
        });
        posts.sort_by(|a, b| (a.created_at, a.post_id).cmp(&(b.created_at, b.post_id)));
        Ok(posts)
    }

    fn view_post(&self, post: Post, viewer: Option<&str>) -> PostView {
        let comment_count = self.store.comment_count(&post.post_id);
        let liked = viewer.is_some_and(|uid| self.store.is_liked_by(&post.post_id, uid));
        let can_modify = viewer == Some(post.uid.as_str());
        PostView {
            post,
            comment_count,
            liked,
            can_modify,
        }
    }
}

/// Inserts the post built for a freshly generated id, generating a new id
/// whenever the insert loses the race for the previous one.
///
/// The lookup only shows which ids were taken at the moment of the check; the
/// store's uniqueness constraint is what actually rejects a duplicate.
pub(crate) fn insert_with_fresh_id<T, P, F>(
    generator: &SequentialIdGenerator<T>,
    lookup: &P,
    now: DateTime<Utc>,
    attempts: usize,
    mut insert: F,
) -> Result<Post, AppError>
where
    T: TimeSource,
    P: IdLookup + ?Sized,
    P::Err: Into<AppError> + fmt::Debug,
    F: FnMut(SequentialId) -> Result<Post, StoreError>,
{
    for attempt in 1..=attempts {
        let post_id = generator.try_next_id_at(now, lookup)?;
        match insert(post_id) {
            Ok(post) => return Ok(post),
            Err(StoreError::UniqueViolation { .. }) => {
                tracing::warn!(%post_id, attempt, attempts, "post id taken before insert");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(AppError::IdContention { attempts })
}

fn parse_compact_date(raw: &str) -> Result<NaiveDate, AppError> {
    let invalid = || AppError::invalid_request(format!("`{raw}` is not a YYYYMMDD date"));

    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let year = raw[0..4].parse().map_err(|_| invalid())?;
    let month = raw[4..6].parse().map_err(|_| invalid())?;
    let day = raw[6..8].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}
