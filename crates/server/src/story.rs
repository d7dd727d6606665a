//! Turns a prompt into per-scene narrative text and illustration prompts.

use shared::domain::SceneCount;

const STYLE_SUFFIX: &str = "consistent art style, cinematic lighting, same characters";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenePlan {
    pub text: String,
    pub illustration_prompt: String,
}

/// Sentences of `prompt`, split on runs of `.`, `!` and `?`. Falls back to
/// the whole trimmed prompt when no sentence survives.
pub fn split_sentences(prompt: &str) -> Vec<String> {
    let sentences: Vec<String> = prompt
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .map(str::to_string)
        .collect();

    if sentences.is_empty() {
        return vec![prompt.trim().to_string()];
    }
    sentences
}

/// One plan per requested scene. When the prompt has fewer sentences than
/// scenes, the last sentence carries the remaining scenes.
pub fn plan_scenes(prompt: &str, count: SceneCount) -> Vec<ScenePlan> {
    let sentences = split_sentences(prompt);
    let base_prompt = format!("{}, {STYLE_SUFFIX}", prompt.trim());

    (0..usize::from(count.get()))
        .map(|index| {
            let text = sentences
                .get(index)
                .or_else(|| sentences.last())
                .cloned()
                .unwrap_or_default();
            let scene = index + 1;
            ScenePlan {
                text,
                illustration_prompt: format!(
                    "{base_prompt}, scene {scene}, part {scene} of the story"
                ),
            }
        })
        .collect()
}
