#![allow(clippy::expect_used, clippy::unwrap_used, reason = "Fine in tests")]
use std::{fs, path::PathBuf};

use oaepub_config::{Config, ConfigError};
use tempfile::TempDir;

#[test]
fn test_load_toml_config() {
  let temp_dir = TempDir::new().expect("Failed to create temp dir");
  let path = temp_dir.path().join("oaepub.toml");
  fs::write(
    &path,
    r#"
output_root = "build/OPS"
stylesheet = "css/plos.css"

[media]
skip_hidden = false

[journal_urls]
"eLife" = "https://elifesciences.org/"
"#,
  )
  .expect("Failed to write config");

  let config = Config::from_file(&path).expect("Failed to load config");

  assert_eq!(config.output_root, PathBuf::from("build/OPS"));
  assert_eq!(config.stylesheet, "css/plos.css");
  assert!(!config.media.skip_hidden);
  assert_eq!(config.journal_url("eLife"), Some("https://elifesciences.org/"));
  // Unspecified fields keep their defaults
  assert_eq!(config.language, "en-US");
}

#[test]
fn test_load_json_config() {
  let temp_dir = TempDir::new().expect("Failed to create temp dir");
  let path = temp_dir.path().join("oaepub.json");
  fs::write(&path, r#"{ "language": "en-GB", "image_dir_prefix": "img-" }"#)
    .expect("Failed to write config");

  let config = Config::from_file(&path).expect("Failed to load config");

  assert_eq!(config.language, "en-GB");
  assert_eq!(
    config.media_dir("abc"),
    PathBuf::from("OPS").join("img-abc")
  );
}

#[test]
fn test_unsupported_extension_is_rejected() {
  let temp_dir = TempDir::new().expect("Failed to create temp dir");
  let path = temp_dir.path().join("oaepub.yaml");
  fs::write(&path, "stylesheet: x").expect("Failed to write config");

  assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_load_merges_files_then_overrides() {
  let temp_dir = TempDir::new().expect("Failed to create temp dir");
  let first = temp_dir.path().join("first.toml");
  let second = temp_dir.path().join("second.toml");
  fs::write(&first, "stylesheet = \"css/first.css\"\n").unwrap();
  fs::write(
    &second,
    "stylesheet = \"css/second.css\"\n[journal_urls]\n\"Demo\" = \"http://demo.org/\"\n",
  )
  .unwrap();

  let config = Config::load(&[first, second], &["language=fr".to_string()])
    .expect("Failed to load configs");

  assert_eq!(config.stylesheet, "css/second.css");
  assert_eq!(config.language, "fr");
  assert_eq!(config.journal_url("demo"), Some("http://demo.org/"));
}

#[test]
fn test_load_rejects_invalid_result() {
  let result = Config::load(&[], &["stylesheet=".to_string()]);
  assert!(result.is_err());
}

#[test]
fn test_later_file_keeps_values_it_leaves_out() {
  let temp_dir = TempDir::new().expect("Failed to create temp dir");
  let first = temp_dir.path().join("a.toml");
  let second = temp_dir.path().join("b.json");
  fs::write(
    &first,
    "output_root = \"build/OPS\"\nlanguage = \"en-GB\"\n[media]\nskip_hidden = \
     false\n",
  )
  .unwrap();
  fs::write(&second, r#"{ "stylesheet": "css/b.css" }"#).unwrap();

  let config =
    Config::load(&[first, second], &[]).expect("Failed to load configs");

  assert_eq!(config.output_root, PathBuf::from("build/OPS"));
  assert_eq!(config.language, "en-GB");
  assert!(!config.media.skip_hidden);
  assert_eq!(config.stylesheet, "css/b.css");
}

#[test]
fn test_parse_errors_name_the_file() {
  let temp_dir = TempDir::new().expect("Failed to create temp dir");
  let path = temp_dir.path().join("broken.toml");
  fs::write(&path, "stylesheet = ").unwrap();

  let err = Config::from_file(&path).unwrap_err();
  assert!(matches!(err, ConfigError::Toml { .. }));
  assert!(err.to_string().contains("broken.toml"));

  let missing = temp_dir.path().join("missing.json");
  assert!(matches!(
    Config::from_file(&missing),
    Err(ConfigError::Io { .. })
  ));
}
