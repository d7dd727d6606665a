use serde::{Deserialize, Serialize};

use crate::{
    domain::{Scene, SceneCount, Story},
    error::ResponseShapeError,
};

pub const GENERATE_ROUTE: &str = "generate";
pub const IMAGE_ROUTE: &str = "image";

pub const PROMPT_FIELD: &str = "prompt";
pub const COUNT_FIELD: &str = "count";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub count: SceneCount,
}

/// Body of a successful `POST /generate`. `images[i]` illustrates `story[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub images: Vec<String>,
    pub story: Vec<String>,
}

impl GenerateResponse {
    pub fn into_story(self, prompt: impl Into<String>) -> Result<Story, ResponseShapeError> {
        if self.images.len() != self.story.len() {
            return Err(ResponseShapeError::LengthMismatch {
                images: self.images.len(),
                texts: self.story.len(),
            });
        }

        let scenes = self
            .story
            .into_iter()
            .zip(self.images)
            .map(|(text, image_ref)| Scene::new(text, image_ref))
            .collect();
        Story::new(prompt, scenes).ok_or(ResponseShapeError::Empty)
    }
}
