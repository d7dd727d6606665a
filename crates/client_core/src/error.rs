use shared::error::{ErrorInfo, ErrorKind, InvalidSceneCount, ResponseShapeError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(String),
    #[error("generation service unreachable: {0}")]
    Transport(String),
    #[error("generation service returned {status}: {message}")]
    Service { status: u16, message: String },
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Validation(_) => ErrorKind::Validation,
            GenerationError::Transport(_) => ErrorKind::Transport,
            GenerationError::Service { .. } => ErrorKind::Service,
            GenerationError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    /// Failures to send or to read the body. Bodies are parsed separately, so
    /// a `MalformedResponse` only ever comes from content that did arrive.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return GenerationError::Transport("request timed out".to_string());
        }
        GenerationError::Transport(error_chain(&err))
    }
}

impl From<InvalidSceneCount> for GenerationError {
    fn from(value: InvalidSceneCount) -> Self {
        GenerationError::Validation(value.to_string())
    }
}

impl From<ResponseShapeError> for GenerationError {
    fn from(value: ResponseShapeError) -> Self {
        GenerationError::MalformedResponse(value.to_string())
    }
}

impl From<GenerationError> for ErrorInfo {
    fn from(value: GenerationError) -> Self {
        ErrorInfo::new(value.kind(), value.to_string())
    }
}

// reqwest's Display stops at the outermost layer ("error sending request"),
// the useful part (connection refused, dns) sits in the source chain.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(
            GenerationError::Validation("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            GenerationError::Transport("x".into()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            GenerationError::Service {
                status: 502,
                message: "bad gateway".into()
            }
            .kind(),
            ErrorKind::Service
        );
        assert_eq!(
            GenerationError::MalformedResponse("x".into()).kind(),
            ErrorKind::MalformedResponse
        );
    }

    #[test]
    fn shape_errors_are_malformed_responses() {
        let err = GenerationError::from(ResponseShapeError::LengthMismatch { images: 3, texts: 2 });
        let info = ErrorInfo::from(err);
        assert_eq!(info.kind, ErrorKind::MalformedResponse);
        assert!(info.message.contains("3 images but 2 story texts"));
    }

    #[test]
    fn invalid_scene_count_is_validation() {
        let err = GenerationError::from(InvalidSceneCount { value: 12 });
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "scene count must be between 1 and 10, got 12");
    }
}
