use crate::config::*;
use std::collections::HashMap;
use std::path::PathBuf;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = Config::default();

    assert_eq!(config.src_dir, PathBuf::from("src"));
    assert_eq!(config.champ_dir, PathBuf::from("src/champ"));
    assert_eq!(config.teleop_dir, PathBuf::from("src/champ_teleop"));
    assert_eq!(config.vision_dir, PathBuf::from("src/vision_opencv"));
    assert_eq!(
        config.vendored_hashes,
        PathBuf::from("src/.vendored-hashes.txt")
    );
    assert_eq!(config.patch_dir, PathBuf::from("src/.patches"));
    assert_eq!(config.champ_remote, DEFAULT_CHAMP_REMOTE);
    assert_eq!(config.champ_branch, "ros2");
    assert_eq!(config.upstream_remote, "upstream");
}

#[test]
fn test_src_dir_override_moves_derived_paths() {
    let config = Config::from_lookup(lookup_from(&[("SRC_DIR", "ws/src")]));

    assert_eq!(config.champ_dir, PathBuf::from("ws/src/champ"));
    assert_eq!(config.patch_dir, PathBuf::from("ws/src/.patches"));
    assert_eq!(
        config.vendored_hashes,
        PathBuf::from("ws/src/.vendored-hashes.txt")
    );
}

#[test]
fn test_explicit_override_wins_over_derived_default() {
    let config = Config::from_lookup(lookup_from(&[
        ("SRC_DIR", "ws/src"),
        ("CHAMP_DIR", "third_party/champ"),
        ("CHAMP_BRANCH", "humble"),
    ]));

    assert_eq!(config.champ_dir, PathBuf::from("third_party/champ"));
    assert_eq!(config.teleop_dir, PathBuf::from("ws/src/champ_teleop"));
    assert_eq!(config.champ_branch, "humble");
}

#[test]
fn test_empty_value_falls_back_to_default() {
    let config = Config::from_lookup(lookup_from(&[("MAIN_UPSTREAM_REMOTE", "")]));
    assert_eq!(config.upstream_remote, "upstream");
}

#[test]
fn test_entries_cover_every_variable() {
    let config = Config::default();
    let names: Vec<&str> = config.entries().iter().map(|(k, _)| *k).collect();

    assert_eq!(
        names,
        vec![
            "SRC_DIR",
            "CHAMP_DIR",
            "TELEOP_DIR",
            "VISION_DIR",
            "VENDORED_HASHES",
            "PATCH_DIR",
            "CHAMP_REMOTE",
            "CHAMP_BRANCH",
            "MAIN_UPSTREAM_REMOTE",
        ]
    );
}

#[test]
fn test_vendored_dirs_labels() {
    let config = Config::default();
    let labels: Vec<&str> = config.vendored_dirs().iter().map(|(l, _)| *l).collect();
    assert_eq!(labels, vec!["champ", "champ_teleop", "vision_opencv"]);
}
