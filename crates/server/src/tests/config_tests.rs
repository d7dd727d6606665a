use super::{apply_env_overrides, apply_file_overrides, prepare_static_dir, Settings};

use std::path::{Path, PathBuf};

#[test]
fn file_keys_override_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        "bind_addr = \"0.0.0.0:9000\"\nstatic_dir = \"/srv/story\"\nmax_form_bytes = 65536\n",
    );

    assert_eq!(settings.server_bind, "0.0.0.0:9000");
    assert_eq!(settings.static_dir, PathBuf::from("/srv/story"));
    assert_eq!(settings.max_form_bytes, 65536);
}

#[test]
fn unreadable_file_keeps_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "max_form_bytes = \"lots\"\nbind_addr = \"0.0.0.0:1\"\n");

    assert_eq!(settings.server_bind, Settings::default().server_bind);
    assert_eq!(settings.max_form_bytes, Settings::default().max_form_bytes);
}

#[test]
fn partial_file_only_touches_named_keys() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "max_form_bytes = 2048\n");

    assert_eq!(settings.max_form_bytes, 2048);
    assert_eq!(settings.server_bind, Settings::default().server_bind);
    assert_eq!(settings.static_dir, Settings::default().static_dir);
}

#[test]
fn app_prefixed_bind_wins() {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| match key {
        "SERVER_BIND" => Some("127.0.0.1:1".to_string()),
        "APP__BIND_ADDR" => Some("127.0.0.1:2".to_string()),
        "APP__MAX_FORM_BYTES" => Some("not-a-number".to_string()),
        _ => None,
    });

    assert_eq!(settings.server_bind, "127.0.0.1:2");
    assert_eq!(settings.max_form_bytes, Settings::default().max_form_bytes);
}

#[test]
fn prepares_nested_static_dir() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let static_dir = temp_root.path().join("nested").join("static");

    let prepared = prepare_static_dir(&static_dir).expect("prepare static dir");
    assert_eq!(prepared, static_dir);
    assert!(static_dir.is_dir());
}

#[test]
fn empty_static_dir_falls_back_to_default_name() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let original_dir = std::env::current_dir().expect("cwd");
    std::env::set_current_dir(temp_root.path()).expect("set cwd");

    let prepared = prepare_static_dir(Path::new("")).expect("prepare");
    let exists = temp_root.path().join("static").is_dir();

    std::env::set_current_dir(original_dir).expect("restore cwd");
    assert_eq!(prepared, PathBuf::from("static"));
    assert!(exists);
}
