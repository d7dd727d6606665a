use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

pub const CONFIG_FILE: &str = "server.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub static_dir: PathBuf,
    pub max_form_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            static_dir: PathBuf::from("static"),
            max_form_bytes: 64 * 1024,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    static_dir: Option<PathBuf>,
    max_form_bytes: Option<usize>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(CONFIG_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(path = CONFIG_FILE, error = %err, "ignoring unreadable server config");
            return;
        }
    };

    if let Some(v) = file_cfg.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file_cfg.static_dir {
        settings.static_dir = v;
    }
    if let Some(v) = file_cfg.max_form_bytes {
        settings.max_form_bytes = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("APP__STATIC_DIR") {
        settings.static_dir = PathBuf::from(v);
    }

    if let Some(v) = var("APP__MAX_FORM_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_form_bytes = parsed;
        }
    }
}

/// Creates the directory generated images are written to and served from.
pub fn prepare_static_dir(raw: &Path) -> anyhow::Result<PathBuf> {
    let static_dir = if raw.as_os_str().is_empty() {
        Settings::default().static_dir
    } else {
        raw.to_path_buf()
    };

    fs::create_dir_all(&static_dir).with_context(|| {
        format!(
            "failed to create static image directory '{}'",
            static_dir.display()
        )
    })?;

    Ok(static_dir)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
