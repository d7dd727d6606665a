//! Client side of the story illustrator: the generation session state
//! machine, the scene carousel it feeds, and the HTTP collaborator that
//! produces stories.

pub mod config;
pub mod error;
pub mod generator;
pub mod navigator;
pub mod resolver;
pub mod session;

pub use config::{load_settings, ClientSettings};
pub use error::GenerationError;
pub use generator::{HttpStoryGenerator, MissingStoryGenerator, StoryGenerator};
pub use navigator::SceneNavigator;
pub use resolver::{image_identifier, service_base, ImageRefResolver};
pub use session::{GenerationSession, RequestId, SessionPhase, SubmitOutcome};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
