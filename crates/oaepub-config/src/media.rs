use serde::{Deserialize, Serialize};

/// Configuration for the image asset scan
///
/// Controls how the `images-<article-id>` directory is walked when the media
/// index for an article is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
  /// Follow symbolic links while scanning
  ///
  /// When enabled, symlinks are followed. When disabled, symlinks are skipped.
  pub follow_symlinks: bool,

  /// Maximum directory depth to traverse
  ///
  /// Use `None` for unlimited depth.
  pub max_depth: Option<usize>,

  /// Skip hidden files and directories
  ///
  /// When enabled, files and directories starting with '.' are never indexed.
  pub skip_hidden: bool,
}

impl Default for MediaConfig {
  fn default() -> Self {
    Self {
      follow_symlinks: false,
      max_depth:       None,
      skip_hidden:     true,
    }
  }
}
