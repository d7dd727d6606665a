use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::SceneCount;

/// Error codes carried in JSON error bodies of the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Failure classes a generation attempt can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Transport,
    Service,
    MalformedResponse,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation error",
            ErrorKind::Transport => "transport error",
            ErrorKind::Service => "service error",
            ErrorKind::MalformedResponse => "malformed response",
        }
    }
}

/// Tagged failure description surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scene count must be between {} and {}, got {value}", SceneCount::MIN, SceneCount::MAX)]
pub struct InvalidSceneCount {
    pub value: i64,
}

/// A generation response whose shape cannot form a story.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseShapeError {
    #[error("response contains {images} images but {texts} story texts")]
    LengthMismatch { images: usize, texts: usize },
    #[error("response contains no scenes")]
    Empty,
}
