use std::sync::Arc;

use futures::FutureExt;
use shared::{
    domain::{Scene, SceneCount, Story},
    error::ErrorInfo,
    protocol::{GenerateRequest, GenerateResponse},
};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::{error::GenerationError, generator::StoryGenerator, navigator::SceneNavigator};

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Idle,
    Generating,
    Ready,
    Failed,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Generating => "generating",
            SessionPhase::Ready => "ready",
            SessionPhase::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started { request_id: RequestId },
    AlreadyGenerating,
}

struct InflightRequest {
    id: RequestId,
    prompt: String,
    task: JoinHandle<Result<GenerateResponse, GenerationError>>,
}

// The story lives only in `Ready` and the error only in `Failed`, so the
// session can never expose both at once.
enum PhaseState {
    Idle,
    Generating(InflightRequest),
    Ready {
        story: Story,
        navigator: SceneNavigator,
    },
    Failed(ErrorInfo),
}

/// One prompt-to-story generation lifecycle plus the carousel over its
/// result.
///
/// `submit` starts the request on a tokio task and returns immediately; the
/// result is applied by [`GenerationSession::wait_for_completion`] or
/// [`GenerationSession::poll_completion`]. `reset` and dropping the session
/// abort an outstanding request, and its result is never applied.
pub struct GenerationSession {
    generator: Arc<dyn StoryGenerator>,
    prompt_draft: String,
    scene_count_draft: SceneCount,
    state: PhaseState,
    last_request_id: RequestId,
}

impl GenerationSession {
    pub fn new(generator: Arc<dyn StoryGenerator>, scene_count: SceneCount) -> Self {
        Self {
            generator,
            prompt_draft: String::new(),
            scene_count_draft: scene_count,
            state: PhaseState::Idle,
            last_request_id: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.state {
            PhaseState::Idle => SessionPhase::Idle,
            PhaseState::Generating(_) => SessionPhase::Generating,
            PhaseState::Ready { .. } => SessionPhase::Ready,
            PhaseState::Failed(_) => SessionPhase::Failed,
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.state, PhaseState::Generating(_))
    }

    pub fn prompt_draft(&self) -> &str {
        &self.prompt_draft
    }

    pub fn scene_count_draft(&self) -> SceneCount {
        self.scene_count_draft
    }

    pub fn story(&self) -> Option<&Story> {
        match &self.state {
            PhaseState::Ready { story, .. } => Some(story),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match &self.state {
            PhaseState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn navigator(&self) -> Option<&SceneNavigator> {
        match &self.state {
            PhaseState::Ready { navigator, .. } => Some(navigator),
            _ => None,
        }
    }

    pub fn navigator_mut(&mut self) -> Option<&mut SceneNavigator> {
        match &mut self.state {
            PhaseState::Ready { navigator, .. } => Some(navigator),
            _ => None,
        }
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        match &self.state {
            PhaseState::Ready { story, navigator } => story.scene(navigator.current_index()),
            _ => None,
        }
    }

    pub fn update_prompt_draft(&mut self, text: impl Into<String>) {
        self.prompt_draft = text.into();
    }

    /// Out-of-range counts are rejected; the previous draft is kept.
    pub fn update_scene_count_draft(&mut self, count: i64) -> Result<SceneCount, GenerationError> {
        let count = SceneCount::new(count)?;
        self.scene_count_draft = count;
        Ok(count)
    }

    pub fn submit(&mut self) -> Result<SubmitOutcome, GenerationError> {
        if let PhaseState::Generating(inflight) = &self.state {
            debug!(
                request_id = inflight.id,
                "submit ignored; a generation request is already in flight"
            );
            return Ok(SubmitOutcome::AlreadyGenerating);
        }

        let prompt = self.prompt_draft.trim();
        if prompt.is_empty() {
            return Err(GenerationError::Validation(
                "enter a story prompt before generating".to_string(),
            ));
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|err| {
            GenerationError::Transport(format!("cannot start generation request: {err}"))
        })?;

        self.last_request_id += 1;
        let request_id = self.last_request_id;
        let request = GenerateRequest {
            prompt: prompt.to_string(),
            count: self.scene_count_draft,
        };
        info!(
            request_id,
            scene_count = %request.count,
            "submitting story generation request"
        );

        let prompt = request.prompt.clone();
        let generator = Arc::clone(&self.generator);
        let task = runtime.spawn(async move { generator.generate(request).await });
        self.state = PhaseState::Generating(InflightRequest {
            id: request_id,
            prompt,
            task,
        });
        Ok(SubmitOutcome::Started { request_id })
    }

    /// Waits for the outstanding request and applies its outcome. Returns
    /// `None` when nothing is in flight. Cancel-safe: dropping the future
    /// leaves the request running.
    pub async fn wait_for_completion(&mut self) -> Option<SessionPhase> {
        let PhaseState::Generating(inflight) = &mut self.state else {
            return None;
        };
        let joined = (&mut inflight.task).await;
        self.finish(joined);
        Some(self.phase())
    }

    /// Applies the outcome of the outstanding request if it already finished.
    pub fn poll_completion(&mut self) -> bool {
        let PhaseState::Generating(inflight) = &mut self.state else {
            return false;
        };
        let Some(joined) = (&mut inflight.task).now_or_never() else {
            return false;
        };
        self.finish(joined);
        true
    }

    pub fn reset(&mut self) {
        if let PhaseState::Generating(inflight) =
            std::mem::replace(&mut self.state, PhaseState::Idle)
        {
            inflight.task.abort();
            info!(request_id = inflight.id, "cancelled in-flight generation request");
        }
        self.prompt_draft.clear();
    }

    fn finish(&mut self, joined: Result<Result<GenerateResponse, GenerationError>, JoinError>) {
        let PhaseState::Generating(inflight) =
            std::mem::replace(&mut self.state, PhaseState::Idle)
        else {
            return;
        };
        let request_id = inflight.id;

        let outcome = match joined {
            Ok(result) => result.and_then(|response| {
                response
                    .into_story(inflight.prompt)
                    .map_err(GenerationError::from)
            }),
            Err(err) => Err(GenerationError::Transport(format!(
                "generation task ended unexpectedly: {err}"
            ))),
        };

        self.state = match outcome {
            Ok(story) => {
                info!(request_id, scenes = story.len(), "story ready");
                let navigator = SceneNavigator::for_story(&story);
                PhaseState::Ready { story, navigator }
            }
            Err(err) => {
                warn!(request_id, kind = ?err.kind(), error = %err, "story generation failed");
                PhaseState::Failed(err.into())
            }
        };
    }
}

impl Drop for GenerationSession {
    fn drop(&mut self) {
        if let PhaseState::Generating(inflight) = &self.state {
            inflight.task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
