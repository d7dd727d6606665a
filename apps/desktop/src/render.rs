//! Plain-text view of a generation session.

use client_core::{GenerationSession, ImageRefResolver, SceneNavigator, SessionPhase};
use shared::domain::Story;

pub fn render_session(session: &GenerationSession, resolver: &ImageRefResolver) -> String {
    match session.phase() {
        SessionPhase::Idle => format!(
            "[idle] prompt: {:?} | scenes: {}\n",
            session.prompt_draft(),
            session.scene_count_draft()
        ),
        SessionPhase::Generating => format!(
            "[generating] requesting {} scene(s)...\n",
            session.scene_count_draft()
        ),
        SessionPhase::Ready => match (session.story(), session.navigator()) {
            (Some(story), Some(navigator)) => render_scene(story, navigator, resolver),
            _ => String::new(),
        },
        SessionPhase::Failed => {
            let message = session
                .error()
                .map(ToString::to_string)
                .unwrap_or_default();
            format!("[failed] {message}\nedit the prompt and `generate` again, or `reset`\n")
        }
    }
}

fn render_scene(story: &Story, navigator: &SceneNavigator, resolver: &ImageRefResolver) -> String {
    let Some(scene) = story.scene(navigator.current_index()) else {
        return String::new();
    };

    let previous = if navigator.is_at_start() {
        "      "
    } else {
        "< prev"
    };
    let next = if navigator.is_at_end() {
        "      "
    } else {
        "next >"
    };

    format!(
        "Scene {}/{}\n{}\nimage: {}\n{previous}  {next}\n",
        navigator.position(),
        navigator.len(),
        scene.text(),
        resolver.resolve(scene.image_ref()),
    )
}

pub fn render_full_story(story: &Story, resolver: &ImageRefResolver) -> String {
    let mut out = format!("{}\n", story.prompt());
    for (index, scene) in story.scenes().iter().enumerate() {
        out.push_str(&format!(
            "\nScene {}/{}\n{}\nimage: {}\n",
            index + 1,
            story.len(),
            scene.text(),
            resolver.resolve(scene.image_ref()),
        ));
    }
    out
}
