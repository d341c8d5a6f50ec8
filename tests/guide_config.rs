// tests/guide_config.rs
use std::fs;
use std::path::Path;

use tvguide_aggregator::guide::config::{
    allow_list, load_channels_from, load_guide_config, load_guide_config_from,
};

#[test]
fn shipped_config_parses_and_names_every_provider_block() {
    let cfg = load_guide_config_from(Path::new("config/tvguide.json")).expect("shipped config");
    for name in ["digea", "cosmote", "ertflix", "static", "ert", "vouli"] {
        let block = cfg.provider(name).expect(name);
        assert!(!block.mapping.is_empty(), "{name} should map channels");
    }
}

#[test]
fn shipped_channel_list_yields_a_non_empty_allow_list() {
    let entries = load_channels_from(Path::new("config/channels.json")).expect("channel list");
    let allow = allow_list(&entries);
    assert!(allow.contains(&"ERT1".to_string()));
    assert_eq!(
        allow.len(),
        entries.len(),
        "shipped list should have no duplicates or blanks"
    );
}

#[test]
fn toml_config_is_accepted_too() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tvguide.toml");
    fs::write(
        &path,
        r#"
[digea]
url = "https://example.test"

[digea.mapping]
"9" = ["gr.alpha", "Alpha"]
"#,
    )
    .unwrap();

    let cfg = load_guide_config_from(&path).expect("toml config");
    let block = cfg.provider("digea").unwrap();
    assert_eq!(
        block.mapping.get("9"),
        Some(&("gr.alpha".to_string(), "Alpha".to_string()))
    );
}

#[serial_test::serial]
#[test]
fn env_path_overrides_the_default_locations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.json");
    fs::write(
        &path,
        r#"{ "vouli": { "url": "https://example.test", "mapping": { "vouli": ["gr.vouli", "Vouli"] } } }"#,
    )
    .unwrap();

    std::env::set_var("TVGUIDE_CONFIG_PATH", path.display().to_string());
    let cfg = load_guide_config().expect("env-pointed config");
    assert!(cfg.provider("vouli").is_ok());
    assert!(cfg.provider("digea").is_err());
    std::env::remove_var("TVGUIDE_CONFIG_PATH");
}

#[serial_test::serial]
#[test]
fn env_path_to_nowhere_is_an_error() {
    std::env::set_var("TVGUIDE_CONFIG_PATH", "/nonexistent/guide.json");
    assert!(load_guide_config().is_err());
    std::env::remove_var("TVGUIDE_CONFIG_PATH");
}
