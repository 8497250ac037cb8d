//! In-memory relational store.
//!
//! Tables live behind one [`RwLock`], so every method is a single atomic
//! transaction. Constraints mirror what a relational backend would enforce:
//! post ids are unique, comments and likes must reference an existing post,
//! a user likes a post at most once and deleting a post cascades to its
//! comments and likes.

use crate::server::model::{Comment, Post, PostLike};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use petfeed::{IdLookup, SequentialId};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key `{key}` in `{table}`")]
    UniqueViolation { table: &'static str, key: String },

    #[error("`{table}` row `{key}` references a missing or mismatched parent")]
    ForeignKeyViolation { table: &'static str, key: String },
}

#[derive(Debug, Default)]
struct Tables {
    posts: BTreeMap<SequentialId, Post>,
    comments: BTreeMap<u64, Comment>,
    likes: BTreeMap<u64, PostLike>,
    last_comment_id: u64,
    last_like_id: u64,
}

/// Row counts, for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub posts: usize,
    pub comments: usize,
    pub likes: usize,
}

#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> StoreStats {
        let tables = self.tables.read();
        StoreStats {
            posts: tables.posts.len(),
            comments: tables.comments.len(),
            likes: tables.likes.len(),
        }
    }

    // --- posts ---

    pub fn insert_post(&self, post: Post) -> Result<Post, StoreError> {
        let mut tables = self.tables.write();
        if tables.posts.contains_key(&post.post_id) {
            return Err(StoreError::UniqueViolation {
                table: "posts",
                key: post.post_id.to_string(),
            });
        }
        tables.posts.insert(post.post_id, post.clone());
        Ok(post)
    }

    pub fn post(&self, post_id: &SequentialId) -> Option<Post> {
        self.tables.read().posts.get(post_id).cloned()
    }

    /// Owned copies of every post matching `predicate`.
    pub fn posts(&self, predicate: impl Fn(&Post) -> bool) -> Vec<Post> {
        self.tables
            .read()
            .posts
            .values()
            .filter(|post| predicate(post))
            .cloned()
            .collect()
    }

    /// Runs `f` against the stored post, returning its result, or `None` if
    /// the post does not exist.
    pub fn update_post<R>(&self, post_id: &SequentialId, f: impl FnOnce(&mut Post) -> R) -> Option<R> {
        self.tables.write().posts.get_mut(post_id).map(f)
    }

    /// Removes a post together with its comments and likes.
    pub fn delete_post(&self, post_id: &SequentialId) -> Option<Post> {
        let mut tables = self.tables.write();
        let post = tables.posts.remove(post_id)?;
        tables.comments.retain(|_, comment| comment.post_id != *post_id);
        tables.likes.retain(|_, like| like.post_id != *post_id);
        Some(post)
    }

    // --- comments ---

    /// Allocates the next comment id and stores the comment `build` makes
    /// from it.
    ///
    /// Fails if the post does not exist, or if the parent comment does not
    /// exist or belongs to a different post.
    pub fn insert_comment(
        &self,
        build: impl FnOnce(u64) -> Comment,
    ) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write();
        let comment = build(tables.last_comment_id + 1);

        let post_exists = tables.posts.contains_key(&comment.post_id);
        let parent_ok = comment.parent_id.is_none_or(|parent_id| {
            tables
                .comments
                .get(&parent_id)
                .is_some_and(|parent| parent.post_id == comment.post_id)
        });
        if !post_exists || !parent_ok {
            return Err(StoreError::ForeignKeyViolation {
                table: "comments",
                key: comment.comment_id.to_string(),
            });
        }

        tables.last_comment_id = comment.comment_id;
        tables.comments.insert(comment.comment_id, comment.clone());
        Ok(comment)
    }

    pub fn comment(&self, comment_id: u64) -> Option<Comment> {
        self.tables.read().comments.get(&comment_id).cloned()
    }

    pub fn comments(&self, predicate: impl Fn(&Comment) -> bool) -> Vec<Comment> {
        self.tables
            .read()
            .comments
            .values()
            .filter(|comment| predicate(comment))
            .cloned()
            .collect()
    }

    pub fn comment_count(&self, post_id: &SequentialId) -> usize {
        self.tables
            .read()
            .comments
            .values()
            .filter(|comment| comment.post_id == *post_id)
            .count()
    }

    pub fn update_comment<R>(&self, comment_id: u64, f: impl FnOnce(&mut Comment) -> R) -> Option<R> {
        self.tables.write().comments.get_mut(&comment_id).map(f)
    }

    /// Removes a comment and, transitively, every reply to it.
    pub fn delete_comment(&self, comment_id: u64) -> Option<Comment> {
        let mut tables = self.tables.write();
        let comment = tables.comments.remove(&comment_id)?;

        let mut orphaned = vec![comment_id];
        while let Some(parent_id) = orphaned.pop() {
            let replies: Vec<u64> = tables
                .comments
                .values()
                .filter(|reply| reply.parent_id == Some(parent_id))
                .map(|reply| reply.comment_id)
                .collect();
            for reply_id in replies {
                tables.comments.remove(&reply_id);
                orphaned.push(reply_id);
            }
        }
        Some(comment)
    }

    // --- likes ---

    /// Records that `uid` likes the post and bumps its like counter.
    pub fn insert_like(
        &self,
        post_id: &SequentialId,
        uid: &str,
        created_at: DateTime<Utc>,
    ) -> Result<PostLike, StoreError> {
        let mut tables = self.tables.write();
        let tables = &mut *tables;

        let Some(post) = tables.posts.get_mut(post_id) else {
            return Err(StoreError::ForeignKeyViolation {
                table: "post_likes",
                key: format!("{post_id}/{uid}"),
            });
        };
        if tables
            .likes
            .values()
            .any(|like| like.post_id == *post_id && like.uid == uid)
        {
            return Err(StoreError::UniqueViolation {
                table: "post_likes",
                key: format!("{post_id}/{uid}"),
            });
        }

        tables.last_like_id += 1;
        let like = PostLike {
            like_id: tables.last_like_id,
            post_id: *post_id,
            uid: uid.to_owned(),
            created_at,
        };
        post.post_likes = post.post_likes.saturating_add(1);
        tables.likes.insert(like.like_id, like.clone());
        Ok(like)
    }

    /// Removes the like and decrements the counter, never below zero.
    pub fn delete_like(&self, post_id: &SequentialId, uid: &str) -> Option<PostLike> {
        let mut tables = self.tables.write();
        let like_id = tables
            .likes
            .values()
            .find(|like| like.post_id == *post_id && like.uid == uid)?
            .like_id;
        let like = tables.likes.remove(&like_id)?;
        if let Some(post) = tables.posts.get_mut(post_id) {
            post.post_likes = post.post_likes.saturating_sub(1);
        }
        Some(like)
    }

    pub fn is_liked_by(&self, post_id: &SequentialId, uid: &str) -> bool {
        self.tables
            .read()
            .likes
            .values()
            .any(|like| like.post_id == *post_id && like.uid == uid)
    }
}

impl IdLookup for Store {
    type Err = StoreError;

    fn contains_id(&self, id: &SequentialId) -> Result<bool, StoreError> {
        Ok(self.tables.read().posts.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::model::{NewPost, Visibility};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 5, 1, 2, 3).unwrap()
    }

    fn post(id: &str, uid: &str) -> Post {
        NewPost {
            uid: uid.into(),
            title: format!("post {id}"),
            content: "content".into(),
            visibility: Visibility::Public,
        }
        .into_post(id.parse().unwrap(), now())
    }

    fn comment(post_id: SequentialId, parent_id: Option<u64>) -> impl FnOnce(u64) -> Comment {
        move |comment_id| Comment {
            comment_id,
            post_id,
            uid: "biscuit".into(),
            message: "cute".into(),
            parent_id,
            created_at: now(),
        }
    }

    #[test]
    fn post_ids_are_unique() {
        let store = Store::new();
        let first = post("202505051002030001", "mochi");
        store.insert_post(first.clone()).unwrap();

        assert!(store.contains_id(&first.post_id).unwrap());
        assert_eq!(
            store.insert_post(first.clone()),
            Err(StoreError::UniqueViolation {
                table: "posts",
                key: "202505051002030001".into(),
            })
        );
        assert_eq!(store.stats().posts, 1);
    }

    #[test]
    fn comment_ids_increment_and_parents_are_checked() {
        let store = Store::new();
        let a = store.insert_post(post("202505051002030001", "mochi")).unwrap();
        let b = store.insert_post(post("202505051002030002", "mochi")).unwrap();

        let root = store.insert_comment(comment(a.post_id, None)).unwrap();
        let reply = store.insert_comment(comment(a.post_id, Some(root.comment_id))).unwrap();
        assert_eq!((root.comment_id, reply.comment_id), (1, 2));

        // Parent on another post, missing parent, missing post.
        assert!(store.insert_comment(comment(b.post_id, Some(root.comment_id))).is_err());
        assert!(store.insert_comment(comment(a.post_id, Some(99))).is_err());
        let missing = "209901010000000001".parse().unwrap();
        assert!(store.insert_comment(comment(missing, None)).is_err());

        // Failed inserts do not consume ids.
        let next = store.insert_comment(comment(b.post_id, None)).unwrap();
        assert_eq!(next.comment_id, 3);
        assert_eq!(store.comment_count(&a.post_id), 2);
    }

    #[test]
    fn deleting_a_comment_removes_its_replies() {
        let store = Store::new();
        let p = store.insert_post(post("202505051002030001", "mochi")).unwrap();
        let root = store.insert_comment(comment(p.post_id, None)).unwrap();
        let reply = store.insert_comment(comment(p.post_id, Some(root.comment_id))).unwrap();
        store.insert_comment(comment(p.post_id, Some(reply.comment_id))).unwrap();
        let other = store.insert_comment(comment(p.post_id, None)).unwrap();

        assert!(store.delete_comment(root.comment_id).is_some());
        let left: Vec<u64> = store.comments(|_| true).iter().map(|c| c.comment_id).collect();
        assert_eq!(left, vec![other.comment_id]);
        assert!(store.delete_comment(root.comment_id).is_none());
    }

    #[test]
    fn likes_are_unique_and_counted() {
        let store = Store::new();
        let p = store.insert_post(post("202505051002030001", "mochi")).unwrap();

        store.insert_like(&p.post_id, "biscuit", now()).unwrap();
        store.insert_like(&p.post_id, "mochi", now()).unwrap();
        assert!(matches!(
            store.insert_like(&p.post_id, "biscuit", now()),
            Err(StoreError::UniqueViolation { .. })
        ));
        assert_eq!(store.post(&p.post_id).unwrap().post_likes, 2);
        assert!(store.is_liked_by(&p.post_id, "biscuit"));

        assert!(store.delete_like(&p.post_id, "biscuit").is_some());
        assert!(store.delete_like(&p.post_id, "biscuit").is_none());
        assert_eq!(store.post(&p.post_id).unwrap().post_likes, 1);
        assert!(!store.is_liked_by(&p.post_id, "biscuit"));
    }

    #[test]
    fn unlike_never_underflows() {
        let store = Store::new();
        let p = store.insert_post(post("202505051002030001", "mochi")).unwrap();
        store.insert_like(&p.post_id, "biscuit", now()).unwrap();
        store.update_post(&p.post_id, |post| post.post_likes = 0);

        store.delete_like(&p.post_id, "biscuit").unwrap();
        assert_eq!(store.post(&p.post_id).unwrap().post_likes, 0);
    }

    #[test]
    fn deleting_a_post_cascades() {
        let store = Store::new();
        let keep = store.insert_post(post("202505051002030001", "mochi")).unwrap();
        let gone = store.insert_post(post("202505051002030002", "mochi")).unwrap();
        store.insert_comment(comment(keep.post_id, None)).unwrap();
        store.insert_comment(comment(gone.post_id, None)).unwrap();
        store.insert_like(&keep.post_id, "biscuit", now()).unwrap();
        store.insert_like(&gone.post_id, "biscuit", now()).unwrap();

        assert!(store.delete_post(&gone.post_id).is_some());
        assert_eq!(
            store.stats(),
            StoreStats {
                posts: 1,
                comments: 1,
                likes: 1,
            }
        );
        assert!(!store.contains_id(&gone.post_id).unwrap());
        assert!(store.delete_post(&gone.post_id).is_none());
    }
}
