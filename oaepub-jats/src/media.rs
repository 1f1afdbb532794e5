//! Image asset lookup.
//!
//! The article's image directory (`<output_root>/images-<article-id>`) is
//! walked once when the index is built. Lookups match a logical id against
//! file stems and never touch the file system or process state again.
use std::{
  collections::HashMap,
  path::{Component, Path},
};

use oaepub_config::Config;
use walkdir::WalkDir;

use crate::error::TransformError;

const IMAGE_EXTENSIONS: &[&str] =
  &["gif", "jpeg", "jpg", "png", "svg", "tif", "tiff"];

/// Result of an asset lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
  /// Path relative to the output root, `/`-separated.
  Found(String),
  NotFound { logical_id: String },
}

impl Asset {
  #[must_use]
  pub fn path(&self) -> Option<&str> {
    match self {
      Self::Found(path) => Some(path),
      Self::NotFound { .. } => None,
    }
  }

  #[must_use]
  pub const fn is_found(&self) -> bool {
    matches!(self, Self::Found(_))
  }
}

/// Index of one article's image files, keyed by file stem.
#[derive(Debug, Clone, Default)]
pub struct MediaIndex {
  assets: HashMap<String, String>,
}

impl MediaIndex {
  /// An index with no assets; every lookup is a miss.
  #[must_use]
  pub fn empty() -> Self {
    Self::default()
  }

  /// Walk the article's image directory under the configured output root.
  ///
  /// A missing directory yields an empty index.
  ///
  /// # Errors
  ///
  /// Returns [`TransformError::Walk`] only when the image directory itself
  /// cannot be read. Unreadable entries below it are logged and skipped.
  pub fn scan(config: &Config, article_id: &str) -> Result<Self, TransformError> {
    let dir = config.media_dir(article_id);
    if !dir.is_dir() {
      log::debug!(
        "No image directory at {}, every image will be a placeholder",
        dir.display()
      );
      return Ok(Self::empty());
    }

    let mut walker = WalkDir::new(&dir).follow_links(config.media.follow_symlinks);
    if let Some(depth) = config.media.max_depth {
      walker = walker.max_depth(depth);
    }
    let skip_hidden = config.media.skip_hidden;
    let mut iter = walker
      .into_iter()
      .filter_entry(|entry| {
        entry.depth() == 0 || !(skip_hidden && is_hidden(entry.path()))
      })
      .peekable();

    if matches!(iter.peek(), Some(Err(_))) {
      if let Some(Err(e)) = iter.next() {
        return Err(e.into());
      }
    }

    let mut index = Self::empty();
    for result in iter {
      let entry = match result {
        Ok(entry) => entry,
        Err(e) => {
          log::warn!("Skipping unreadable media entry: {e}");
          continue;
        },
      };
      if !entry.file_type().is_file() {
        continue;
      }
      let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) else {
        continue;
      };
      let relative = relative_path(&config.output_root, entry.path());
      index.insert(stem, relative);
    }

    log::debug!(
      "Indexed {} media assets in {}",
      index.assets.len(),
      dir.display()
    );
    Ok(index)
  }

  /// Add an asset. When two files share a stem the lexicographically last
  /// path is kept.
  pub fn insert(&mut self, stem: &str, path: impl Into<String>) {
    let path = path.into();
    match self.assets.get_mut(stem) {
      Some(existing) if *existing >= path => {},
      Some(existing) => *existing = path,
      None => {
        self.assets.insert(stem.to_string(), path);
      },
    }
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.assets.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.assets.is_empty()
  }

  #[must_use]
  pub fn resolve(&self, logical_id: &str) -> Asset {
    self.assets.get(logical_id).map_or_else(
      || {
        Asset::NotFound {
          logical_id: logical_id.to_string(),
        }
      },
      |path| Asset::Found(path.clone()),
    )
  }
}

/// Logical asset id of an element id or `xlink:href`: the trailing token
/// after the last `-`, `.` or `/`, ignoring a known image extension.
///
/// `pbio.1002222.g001` → `g001`, `info:doi/10.1371/journal.pbio.1002222.e001`
/// → `e001`.
#[must_use]
pub fn logical_id(reference: &str) -> &str {
  let reference = reference.trim();
  let stem = reference
    .rsplit_once('.')
    .filter(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    .map_or(reference, |(stem, _)| stem);
  stem
    .rsplit(['-', '.', '/'])
    .next()
    .filter(|token| !token.is_empty())
    .unwrap_or(stem)
}

fn is_hidden(path: &Path) -> bool {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .is_some_and(|name| name.starts_with('.'))
}

fn relative_path(root: &Path, path: &Path) -> String {
  let relative = path.strip_prefix(root).unwrap_or(path);
  relative
    .components()
    .filter_map(|component| {
      match component {
        Component::Normal(part) => Some(part.to_string_lossy()),
        _ => None,
      }
    })
    .collect::<Vec<_>>()
    .join("/")
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]
  use std::fs;

  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_logical_id() {
    assert_eq!(logical_id("pbio.1002222.g001"), "g001");
    assert_eq!(logical_id("pbio-1002222-g001"), "g001");
    assert_eq!(logical_id("info:doi/10.1371/journal.pbio.1002222.e001"), "e001");
    assert_eq!(logical_id("journal.pbio.1002222.e001.tif"), "e001");
    assert_eq!(logical_id("g001"), "g001");
  }

  #[test]
  fn test_lexicographically_last_path_wins() {
    let mut index = MediaIndex::empty();
    index.insert("g001", "images-x/b/g001.png");
    index.insert("g001", "images-x/a/g001.png");
    index.insert("g001", "images-x/c/g001.tif");
    assert_eq!(index.resolve("g001").path(), Some("images-x/c/g001.tif"));
  }

  #[test]
  fn test_scan_finds_nested_assets() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.output_root = temp_dir.path().to_path_buf();

    let dir = config.media_dir("journal.pbio.1002222");
    fs::create_dir_all(dir.join("figures")).unwrap();
    fs::create_dir_all(dir.join(".cache")).unwrap();
    fs::write(dir.join("figures").join("g001.png"), b"png").unwrap();
    fs::write(dir.join(".cache").join("g002.png"), b"png").unwrap();

    let index = MediaIndex::scan(&config, "journal.pbio.1002222").unwrap();

    assert_eq!(
      index.resolve("g001"),
      Asset::Found("images-journal.pbio.1002222/figures/g001.png".to_string())
    );
    assert!(!index.resolve("g002").is_found());
  }

  #[test]
  fn test_scan_without_directory_is_empty() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.output_root = temp_dir.path().to_path_buf();

    let index = MediaIndex::scan(&config, "missing").unwrap();
    assert!(index.is_empty());
    assert_eq!(
      index.resolve("g001"),
      Asset::NotFound {
        logical_id: "g001".to_string(),
      }
    );
  }
}
