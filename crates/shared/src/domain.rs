use serde::{Deserialize, Serialize};

use crate::error::InvalidSceneCount;

/// Number of scenes requested from the generation service, always within
/// `[SceneCount::MIN, SceneCount::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct SceneCount(u8);

impl SceneCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, InvalidSceneCount> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InvalidSceneCount { value })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for SceneCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<i64> for SceneCount {
    type Error = InvalidSceneCount;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SceneCount> for u8 {
    fn from(value: SceneCount) -> Self {
        value.0
    }
}

impl std::fmt::Display for SceneCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    text: String,
    image_ref: String,
}

impl Scene {
    pub fn new(text: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_ref: image_ref.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Opaque identifier assigned by the generation service. Resolve it
    /// before fetching the image.
    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }
}

/// Ordered, non-empty sequence of scenes produced by one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    prompt: String,
    scenes: Vec<Scene>,
}

impl Story {
    /// Returns `None` when `scenes` is empty.
    pub fn new(prompt: impl Into<String>, scenes: Vec<Scene>) -> Option<Self> {
        if scenes.is_empty() {
            return None;
        }
        Some(Self {
            prompt: prompt.into(),
            scenes,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    // Always false; kept for clippy's len_without_is_empty.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
