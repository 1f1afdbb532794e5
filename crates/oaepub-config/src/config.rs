use std::{
  fs,
  path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{error::ConfigError, media::MediaConfig};

/// Journal base URLs used for "Find This Article Online" links when nothing
/// else is configured.
const DEFAULT_JOURNAL_URLS: &[(&str, &str)] = &[
  ("PLoS Biology", "http://www.plosbiology.org/"),
  ("PLoS Computational Biology", "http://www.ploscompbiol.org/"),
  ("PLoS Genetics", "http://www.plosgenetics.org/"),
  ("PLoS Medicine", "http://www.plosmedicine.org/"),
  ("PLoS Neglected Tropical Diseases", "http://www.plosntds.org/"),
  ("PLoS ONE", "http://www.plosone.org/"),
  ("PLoS Pathogens", "http://www.plospathogens.org/"),
];

/// Configuration for the article transformer.
///
/// [`Config`] holds everything the transformation engine needs that does not
/// come from the article itself: where documents are written, where image
/// assets are scanned for, what the output documents reference, and the
/// per-journal link table used by the citation formatter. Fields are
/// typically loaded from a TOML or JSON config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Directory the output documents are written to. Image assets are looked
  /// up in `images-<article-id>` below it.
  pub output_root: PathBuf,

  /// Stylesheet href written into the head of every output document.
  pub stylesheet: String,

  /// Value of `xml:lang` on every output document.
  pub language: String,

  /// Prefix of the per-article image directory name.
  pub image_dir_prefix: String,

  /// Source emitted for images whose asset could not be found.
  pub missing_image_source: String,

  /// Options for the image asset scan.
  pub media: MediaConfig,

  /// Base URLs keyed by journal title.
  pub journal_urls: IndexMap<String, String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      output_root:          PathBuf::from("OPS"),
      stylesheet:           "css/article.css".to_string(),
      language:             "en-US".to_string(),
      image_dir_prefix:     "images-".to_string(),
      missing_image_source: "images/not-found.png".to_string(),
      media:                MediaConfig::default(),
      journal_urls:         DEFAULT_JOURNAL_URLS
        .iter()
        .map(|(title, url)| ((*title).to_string(), (*url).to_string()))
        .collect(),
    }
  }
}

/// A configuration file laid over an existing [`Config`].
///
/// Only the fields the file actually sets are `Some`, so loading several
/// files keeps earlier values the later files leave out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigOverlay {
  pub output_root:          Option<PathBuf>,
  pub stylesheet:           Option<String>,
  pub language:             Option<String>,
  pub image_dir_prefix:     Option<String>,
  pub missing_image_source: Option<String>,
  pub media:                Option<MediaOverlay>,
  pub journal_urls:         Option<IndexMap<String, String>>,
}

/// The `[media]` table of a [`ConfigOverlay`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MediaOverlay {
  pub follow_symlinks: Option<bool>,
  pub max_depth:       Option<usize>,
  pub skip_hidden:     Option<bool>,
}

impl ConfigOverlay {
  /// Read an overlay from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    read_config_file(path.as_ref())
  }
}

/// Read and deserialize a TOML or JSON file, chosen by extension.
fn read_config_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
  let format = path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(str::to_lowercase);
  let Some(format) = format else {
    return Err(ConfigError::Config(format!(
      "Config file has no extension: {}",
      path.display()
    )));
  };
  if format != "json" && format != "toml" {
    return Err(ConfigError::Config(format!(
      "Unsupported config file format: {}",
      path.display()
    )));
  }

  let content = fs::read_to_string(path).map_err(|source| {
    ConfigError::Io {
      path: path.to_path_buf(),
      source,
    }
  })?;

  if format == "json" {
    serde_json::from_str(&content).map_err(|source| {
      ConfigError::Json {
        path: path.to_path_buf(),
        source,
      }
    })
  } else {
    toml::from_str(&content).map_err(|source| {
      ConfigError::Toml {
        path: path.to_path_buf(),
        source,
      }
    })
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// Fields the file leaves out take their defaults.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    read_config_file(path.as_ref())
  }

  /// Load configuration from zero or more files and `KEY=VALUE` overrides.
  ///
  /// Each file is laid over the result of the previous ones, so a file only
  /// changes the fields it sets. Overrides are applied last and the result is
  /// validated.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded, an override is malformed, or
  /// the merged configuration is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = Self::default();

    for config_path in config_files {
      config.apply_overlay(ConfigOverlay::from_file(config_path)?);
    }

    if config_files.len() > 1 {
      log::info!("Loaded and merged {} config files", config_files.len());
    }

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    config.validate()?;
    Ok(config)
  }

  /// Set every field the overlay carries. `journal_urls` entries are merged
  /// in rather than replacing the table.
  pub fn apply_overlay(&mut self, overlay: ConfigOverlay) {
    let ConfigOverlay {
      output_root,
      stylesheet,
      language,
      image_dir_prefix,
      missing_image_source,
      media,
      journal_urls,
    } = overlay;

    if let Some(output_root) = output_root {
      self.output_root = output_root;
    }
    if let Some(stylesheet) = stylesheet {
      self.stylesheet = stylesheet;
    }
    if let Some(language) = language {
      self.language = language;
    }
    if let Some(image_dir_prefix) = image_dir_prefix {
      self.image_dir_prefix = image_dir_prefix;
    }
    if let Some(missing_image_source) = missing_image_source {
      self.missing_image_source = missing_image_source;
    }
    if let Some(media) = media {
      if let Some(follow_symlinks) = media.follow_symlinks {
        self.media.follow_symlinks = follow_symlinks;
      }
      if media.max_depth.is_some() {
        self.media.max_depth = media.max_depth;
      }
      if let Some(skip_hidden) = media.skip_hidden {
        self.media.skip_hidden = skip_hidden;
      }
    }
    if let Some(journal_urls) = journal_urls {
      self.journal_urls.extend(journal_urls);
    }
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
      "output_root" => self.output_root = PathBuf::from(value),
      "stylesheet" => self.stylesheet = value.to_string(),
      "language" => self.language = value.to_string(),
      "image_dir_prefix" => self.image_dir_prefix = value.to_string(),
      "missing_image_source" => self.missing_image_source = value.to_string(),
      "media.follow_symlinks" => {
        self.media.follow_symlinks = parse_bool(key, value)?;
      },
      "media.skip_hidden" => self.media.skip_hidden = parse_bool(key, value)?,
      "media.max_depth" => {
        self.media.max_depth = if value.is_empty() {
          None
        } else {
          Some(value.parse().map_err(|e| {
            ConfigError::Config(format!(
              "Invalid value for '{key}': '{value}' ({e})"
            ))
          })?)
        };
      },
      _ => {
        if let Some(journal) = key.strip_prefix("journal_urls.") {
          self
            .journal_urls
            .insert(journal.to_string(), value.to_string());
        } else {
          return Err(ConfigError::Config(format!(
            "Unknown configuration key: '{key}'"
          )));
        }
      },
    }
    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - Plain fields (String, bool, etc.): Other's value always replaces
  /// - `journal_urls`: Other's entries are merged in (can override individual
  ///   journals)
  pub fn merge(&mut self, other: Self) {
    let Self {
      output_root,
      stylesheet,
      language,
      image_dir_prefix,
      missing_image_source,
      media,
      journal_urls,
    } = other;

    self.output_root = output_root;
    self.stylesheet = stylesheet;
    self.language = language;
    self.image_dir_prefix = image_dir_prefix;
    self.missing_image_source = missing_image_source;
    self.media = media;
    self.journal_urls.extend(journal_urls);
  }

  /// Validate the values that the transformer cannot work without.
  ///
  /// # Errors
  ///
  /// Returns an error listing every invalid field.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if self.stylesheet.trim().is_empty() {
      errors.push("Stylesheet href must not be empty".to_string());
    }
    if self.image_dir_prefix.trim().is_empty() {
      errors.push("Image directory prefix must not be empty".to_string());
    }
    if self.missing_image_source.trim().is_empty() {
      errors.push("Missing image source must not be empty".to_string());
    }
    for (journal, url) in &self.journal_urls {
      if !url.ends_with('/') {
        errors.push(format!(
          "Base URL for journal '{journal}' must end with '/': {url}"
        ));
      }
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(ConfigError::Config(format!(
        "Configuration validation errors:\n{}",
        errors.join("\n")
      )))
    }
  }

  /// Directory holding the image assets of one article.
  #[must_use]
  pub fn media_dir(&self, article_id: &str) -> PathBuf {
    self
      .output_root
      .join(format!("{}{article_id}", self.image_dir_prefix))
  }

  /// Base URL for a journal title, compared case-insensitively.
  #[must_use]
  pub fn journal_url(&self, journal_title: &str) -> Option<&str> {
    let wanted = journal_title.trim();
    self
      .journal_urls
      .iter()
      .find(|(title, _)| title.eq_ignore_ascii_case(wanted))
      .map(|(_, url)| url.as_str())
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" | "on" => Ok(true),
    "false" | "no" | "0" | "off" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'"
      )))
    },
  }
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]
  use super::*;

  #[test]
  fn test_default_journal_table_is_case_insensitive() {
    let config = Config::default();
    assert_eq!(
      config.journal_url("PLOS Biology"),
      Some("http://www.plosbiology.org/")
    );
    assert_eq!(config.journal_url("Nature"), None);
  }

  #[test]
  fn test_media_dir_uses_prefix() {
    let mut config = Config::default();
    config.output_root = PathBuf::from("/tmp/out");
    assert_eq!(
      config.media_dir("journal.pbio.1002222"),
      PathBuf::from("/tmp/out/images-journal.pbio.1002222")
    );
  }

  #[test]
  fn test_config_merge_journal_urls_extend() {
    let mut base = Config::default();
    let mut other = Config::default();
    other.journal_urls.clear();
    other
      .journal_urls
      .insert("eLife".to_string(), "https://elifesciences.org/".to_string());
    other.stylesheet = "css/other.css".to_string();

    base.merge(other);

    assert_eq!(base.stylesheet, "css/other.css");
    assert_eq!(base.journal_url("eLife"), Some("https://elifesciences.org/"));
    assert_eq!(base.journal_url("PLoS ONE"), Some("http://www.plosone.org/"));
  }

  #[test]
  fn test_overlay_only_sets_present_fields() {
    let mut config = Config::default();
    config.output_root = PathBuf::from("build/OPS");
    config.media.skip_hidden = false;

    config.apply_overlay(
      toml::from_str("stylesheet = \"css/b.css\"\n[media]\nmax_depth = 2\n")
        .unwrap(),
    );

    assert_eq!(config.output_root, PathBuf::from("build/OPS"));
    assert_eq!(config.stylesheet, "css/b.css");
    assert!(!config.media.skip_hidden);
    assert_eq!(config.media.max_depth, Some(2));
    assert_eq!(config.journal_url("PLoS ONE"), Some("http://www.plosone.org/"));
  }

  #[test]
  fn test_apply_overrides() {
    let mut config = Config::default();
    config
      .apply_overrides(&[
        "stylesheet=css/custom.css".to_string(),
        "media.skip_hidden=no".to_string(),
        "media.max_depth=3".to_string(),
        "journal_urls.eLife=https://elifesciences.org/".to_string(),
      ])
      .unwrap();

    assert_eq!(config.stylesheet, "css/custom.css");
    assert!(!config.media.skip_hidden);
    assert_eq!(config.media.max_depth, Some(3));
    assert_eq!(config.journal_url("elife"), Some("https://elifesciences.org/"));
  }

  #[test]
  fn test_apply_overrides_rejects_unknown_key() {
    let mut config = Config::default();
    let result = config.apply_overrides(&["nonsense=1".to_string()]);
    assert!(result.is_err());
  }

  #[test]
  fn test_apply_overrides_rejects_missing_equals() {
    let mut config = Config::default();
    let result = config.apply_overrides(&["stylesheet".to_string()]);
    assert!(result.is_err());
  }

  #[test]
  fn test_validate_rejects_empty_stylesheet() {
    let mut config = Config::default();
    config.stylesheet = "  ".to_string();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_validate_rejects_url_without_trailing_slash() {
    let mut config = Config::default();
    config
      .journal_urls
      .insert("Bad".to_string(), "http://example.org".to_string());
    assert!(config.validate().is_err());
  }
}
