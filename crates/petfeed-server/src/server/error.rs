use crate::server::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core::convert::Infallible;
use core::fmt;
use serde::Serialize;

/// Every failure a request handler can report.
///
/// Each variant maps to a stable machine-readable `code` and an HTTP status;
/// the response body is `{"code": ..., "message": ...}` with the `Display`
/// text as the message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("post `{post_id}` not found")]
    PostNotFound { post_id: String },

    #[error("comment `{comment_id}` not found")]
    CommentNotFound { comment_id: String },

    #[error("`{uid}` has not liked post `{post_id}`")]
    LikeNotFound { post_id: String, uid: String },

    #[error("{what} already exists")]
    AlreadyExists { what: String },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("invalid sort field: `{field}`")]
    InvalidSortField { field: String },

    #[error("invalid limit: {limit} (must be greater than 0)")]
    InvalidLimit { limit: i64 },

    #[error("invalid cursor: `{cursor}`")]
    InvalidCursor { cursor: String },

    #[error("post id space exhausted for {timestamp}, retry in a second")]
    IdExhausted { timestamp: String },

    #[error("could not allocate a post id after {attempts} attempts")]
    IdContention { attempts: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PostNotFound { .. } => "POST_NOT_FOUND",
            Self::CommentNotFound { .. } => "COMMENT_NOT_FOUND",
            Self::LikeNotFound { .. } => "LIKE_NOT_FOUND",
            Self::AlreadyExists { .. } | Self::Store(StoreError::UniqueViolation { .. }) => {
                "ALREADY_EXISTS"
            }
            Self::InvalidRequest { .. } | Self::Store(StoreError::ForeignKeyViolation { .. }) => {
                "INVALID_REQUEST"
            }
            Self::InvalidSortField { .. } => "INVALID_SORT_FIELD",
            Self::InvalidLimit { .. } => "INVALID_LIMIT",
            Self::InvalidCursor { .. } => "INVALID_CURSOR",
            Self::IdExhausted { .. } => "ID_EXHAUSTED",
            Self::IdContention { .. } => "ID_CONTENTION",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::PostNotFound { .. } | Self::CommentNotFound { .. } | Self::LikeNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::AlreadyExists { .. } | Self::Store(StoreError::UniqueViolation { .. }) => {
                StatusCode::CONFLICT
            }
            Self::InvalidRequest { .. }
            | Self::InvalidSortField { .. }
            | Self::InvalidLimit { .. }
            | Self::InvalidCursor { .. }
            | Self::Store(StoreError::ForeignKeyViolation { .. }) => StatusCode::BAD_REQUEST,
            Self::IdExhausted { .. } | Self::IdContention { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn post_not_found(post_id: impl fmt::Display) -> Self {
        Self::PostNotFound {
            post_id: post_id.to_string(),
        }
    }

    pub fn comment_not_found(comment_id: impl fmt::Display) -> Self {
        Self::CommentNotFound {
            comment_id: comment_id.to_string(),
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            tracing::error!(code, error = %self, "request failed");
        } else {
            tracing::debug!(code, error = %self, "request rejected");
        }

        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<Infallible> for AppError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl<E> From<petfeed::Error<E>> for AppError
where
    E: Into<AppError> + fmt::Debug,
{
    fn from(err: petfeed::Error<E>) -> Self {
        match err {
            petfeed::Error::InvalidSortField { field } => Self::InvalidSortField { field },
            petfeed::Error::InvalidLimit { limit } => Self::InvalidLimit { limit },
            petfeed::Error::ExhaustedSequence { timestamp } => Self::IdExhausted { timestamp },
            petfeed::Error::InvalidId { input } => Self::invalid_request(format!(
                "`{input}` is not a valid post id"
            )),
            petfeed::Error::Lookup(err) => err.into(),
            other => Self::Internal(format!("{other:?}")),
        }
    }
}
