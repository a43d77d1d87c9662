use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid site config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid site config {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("invalid front matter in {path}: {message}")]
    FrontMatter { path: PathBuf, message: String },

    #[error("duplicate slug `{slug}` ({first} and {second})")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("post not found: {0}")]
    NotFound(String),
}

impl BlogError {
    pub fn front_matter(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FrontMatter {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body used by the `/api` routes.
impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = BlogError::NotFound("missing".into());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "post not found: missing");
    }

    #[test]
    fn invalid_config_names_the_file() {
        let err = BlogError::InvalidConfig {
            path: "site.toml".into(),
            message: "blog route must start with `/`".into(),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "invalid site config site.toml: blog route must start with `/`"
        );
    }

    #[test]
    fn duplicate_slug_names_both_files() {
        let err = BlogError::DuplicateSlug {
            slug: "hello".into(),
            first: "a.md".into(),
            second: "b.md".into(),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("a.md and b.md"));
    }
}
