use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::domain::SceneCount;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "story_client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub service_url: String,
    pub default_scene_count: SceneCount,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:8000".into(),
            default_scene_count: SceneCount::default(),
            request_timeout_secs: 300,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    service_url: Option<String>,
    default_scene_count: Option<i64>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `path` (or `story_client.toml`), then environment.
pub fn load_settings(path: Option<&Path>) -> ClientSettings {
    let mut settings = ClientSettings::default();

    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if let Ok(raw) = fs::read_to_string(path) {
        apply_file_overrides(&mut settings, &raw, path);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file_overrides(settings: &mut ClientSettings, raw: &str, path: &Path) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable client config");
            return;
        }
    };

    if let Some(v) = file_cfg.service_url {
        settings.service_url = v;
    }
    if let Some(v) = file_cfg.default_scene_count {
        match SceneCount::new(v) {
            Ok(count) => settings.default_scene_count = count,
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring default_scene_count"),
        }
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
}

fn apply_env_overrides(settings: &mut ClientSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("STORY_SERVICE_URL") {
        settings.service_url = v;
    }
    if let Some(v) = var("APP__SERVICE_URL") {
        settings.service_url = v;
    }

    if let Some(v) = var("APP__DEFAULT_SCENE_COUNT") {
        if let Ok(Ok(count)) = v.trim().parse::<i64>().map(SceneCount::new) {
            settings.default_scene_count = count;
        }
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn file_values_override_defaults() {
        let mut settings = ClientSettings::default();
        apply_file_overrides(
            &mut settings,
            "service_url = \"http://gpu-box:9000\"\ndefault_scene_count = 4\nrequest_timeout_secs = 30\n",
            Path::new("story_client.toml"),
        );
        assert_eq!(settings.service_url, "http://gpu-box:9000");
        assert_eq!(settings.default_scene_count.get(), 4);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn invalid_file_values_keep_defaults() {
        let mut settings = ClientSettings::default();
        apply_file_overrides(
            &mut settings,
            "default_scene_count = 40\n",
            Path::new("story_client.toml"),
        );
        assert_eq!(settings, ClientSettings::default());

        apply_file_overrides(&mut settings, "not toml at all [", Path::new("x.toml"));
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn app_prefixed_env_wins_over_plain_env() {
        let mut settings = ClientSettings::default();
        apply_env_overrides(
            &mut settings,
            env(&[
                ("STORY_SERVICE_URL", "http://plain:1"),
                ("APP__SERVICE_URL", "http://prefixed:2"),
                ("APP__DEFAULT_SCENE_COUNT", "7"),
                ("APP__REQUEST_TIMEOUT_SECS", "12"),
            ]),
        );
        assert_eq!(settings.service_url, "http://prefixed:2");
        assert_eq!(settings.default_scene_count.get(), 7);
        assert_eq!(settings.request_timeout_secs, 12);
    }

    #[test]
    fn unparsable_env_values_are_ignored() {
        let mut settings = ClientSettings::default();
        apply_env_overrides(
            &mut settings,
            env(&[
                ("APP__DEFAULT_SCENE_COUNT", "eleven"),
                ("APP__REQUEST_TIMEOUT_SECS", "-5"),
            ]),
        );
        assert_eq!(settings, ClientSettings::default());

        apply_env_overrides(&mut settings, env(&[("APP__DEFAULT_SCENE_COUNT", "0")]));
        assert_eq!(settings.default_scene_count.get(), 1);
    }

    #[test]
    fn missing_file_yields_defaults_plus_env() {
        let missing = std::env::temp_dir().join("story_client_missing_config_for_test.toml");
        let settings = load_settings(Some(&missing));
        assert_eq!(settings.request_timeout_secs, ClientSettings::default().request_timeout_secs);
    }
}
