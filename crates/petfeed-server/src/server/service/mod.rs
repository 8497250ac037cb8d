//! Request-level operations on posts, comments and likes.
//!
//! Services validate input, enforce visibility and ownership rules and turn
//! store and library errors into [`AppError`](crate::server::error::AppError)s.
//! They hold no state of their own beyond the shared handles in [`AppState`].
//!
//! ## Structure
//!
//! - [`post`] - post CRUD, listing and the per-day journey view.
//! - [`comment`] - comment CRUD and listing.
//! - [`like`] - like / unlike.

pub mod comment;
pub mod like;
pub mod post;

use crate::server::config::ServerConfig;
use crate::server::error::AppError;
use crate::server::store::Store;
use core::str::FromStr;
use petfeed::{Direction, PageRequest, SequentialIdGenerator, TimeSource};
use std::sync::Arc;

/// Clock shared by the generator and every timestamp the services write.
pub type SharedClock = Arc<dyn TimeSource + Send + Sync>;

/// Id generator for posts.
pub type PostIdGenerator = SequentialIdGenerator<SharedClock>;

/// Handles shared by every request, cloned into each axum handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub generator: PostIdGenerator,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Arc<Store>, clock: SharedClock) -> Self {
        let generator = SequentialIdGenerator::with_timezone(clock, config.timezone);
        Self {
            store,
            generator,
            config: Arc::new(config),
        }
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.generator.time_source().now()
    }
}

/// Listing parameters as received from a client, before validation.
#[derive(Clone, Debug, Default)]
pub struct ListQuery {
    pub viewer_id: Option<String>,
    pub cursor: Option<String>,
    pub direction: Direction,
    /// Comma-separated sort keys, e.g. `-post_likes,title`.
    pub sort: Option<String>,
    pub limit: Option<i64>,
}

impl ListQuery {
    /// Builds a [`PageRequest`], applying `default_sort` when the client did
    /// not ask for one and clamping the limit to the configured bounds.
    ///
    /// Cursors are compared against the record id, so a request that resumes
    /// from a cursor must have `id_field` as its primary sort key. Other keys
    /// are still accepted after it, or on a first page without a cursor.
    pub fn to_request<Id: FromStr>(
        &self,
        config: &ServerConfig,
        default_sort: &str,
        id_field: &str,
    ) -> Result<PageRequest<Id>, AppError> {
        let cursor = match self.cursor.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<Id>().map_err(|_| AppError::InvalidCursor {
                cursor: raw.to_owned(),
            })?),
        };

        let mut sorts: Vec<&str> = self
            .sort
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .collect();
        if sorts.is_empty() {
            sorts.push(default_sort);
        }

        let primary = sorts[0].strip_prefix('-').unwrap_or(sorts[0]);
        if cursor.is_some() && primary != id_field {
            return Err(AppError::InvalidSortField {
                field: primary.to_owned(),
            });
        }

        Ok(PageRequest::new(config.page_limit(self.limit))
            .with_cursor(cursor)
            .with_direction(self.direction)
            .with_sorts(sorts))
    }
}
