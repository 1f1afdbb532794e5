//! Fatal errors and recoverable issues raised while transforming an article.
use std::io;

use log::Level;
use thiserror::Error;

/// Errors that abort the transformation of one article.
///
/// No output documents are written for an article whose transform returned
/// one of these.
#[derive(Debug, Error)]
pub enum TransformError {
  #[error("XML parse error: {0}")]
  Xml(#[from] quick_xml::Error),

  #[error("Malformed article XML: {0}")]
  Malformed(String),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Failed to scan media directory: {0}")]
  Walk(#[from] walkdir::Error),

  #[error("Configuration error: {0}")]
  Config(#[from] oaepub_config::ConfigError),

  #[error("Article has no <{0}> element")]
  MissingElement(&'static str),
}

/// A recoverable problem found while transforming an article.
///
/// The element concerned is skipped or replaced by a fallback and processing
/// continues with its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Issue {
  /// An element lacks a child it cannot be rendered without.
  #[error(
    "<{element}> (id: {}) is missing required <{missing}>, element skipped",
    .id.as_deref().unwrap_or("none")
  )]
  MissingSubstructure {
    element: String,
    missing: String,
    id:      Option<String>,
  },

  /// An enumerated attribute carries a value outside the known set.
  #[error("Unrecognized {attribute} value '{value}', falling back to {fallback}")]
  UnrecognizedValue {
    attribute: String,
    value:     String,
    fallback:  String,
  },

  /// No file in the article's image directory matches a logical id.
  #[error("No media asset found for '{logical_id}'")]
  AssetNotFound { logical_id: String },

  /// A cross-reference uses a type with no target document.
  #[error(
    "Unmapped cross-reference type '{ref_type}' (target '{target}'), linking \
     into the main document"
  )]
  UnmappedReference { ref_type: String, target: String },
}

impl Issue {
  /// Log level the issue is reported at.
  #[must_use]
  pub const fn level(&self) -> Level {
    match self {
      Self::MissingSubstructure { .. } | Self::AssetNotFound { .. } => {
        Level::Error
      },
      Self::UnrecognizedValue { .. } | Self::UnmappedReference { .. } => {
        Level::Warn
      },
    }
  }

  pub(crate) fn missing(
    element: &str,
    missing: &str,
    id: Option<&str>,
  ) -> Self {
    Self::MissingSubstructure {
      element: element.to_string(),
      missing: missing.to_string(),
      id:      id.map(str::to_string),
    }
  }

  pub(crate) fn unrecognized(
    attribute: &str,
    value: &str,
    fallback: &str,
  ) -> Self {
    Self::UnrecognizedValue {
      attribute: attribute.to_string(),
      value:     value.to_string(),
      fallback:  fallback.to_string(),
    }
  }
}

/// Collects the issues raised during one article's transform.
///
/// Every issue is logged when it is reported, so callers that only care
/// about the console output can ignore the collected list.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
  issues: Vec<Issue>,
}

impl Diagnostics {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Log an issue and keep it.
  pub fn report(&mut self, issue: Issue) {
    log::log!(issue.level(), "{issue}");
    self.issues.push(issue);
  }

  #[must_use]
  pub fn issues(&self) -> &[Issue] {
    &self.issues
  }

  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.issues.is_empty()
  }

  #[must_use]
  pub fn into_issues(self) -> Vec<Issue> {
    self.issues
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_issue_levels() {
    assert_eq!(
      Issue::AssetNotFound {
        logical_id: "g001".to_string(),
      }
      .level(),
      Level::Error
    );
    assert_eq!(
      Issue::unrecognized("list-type", "wavy", "unordered list").level(),
      Level::Warn
    );
  }

  #[test]
  fn test_missing_substructure_message() {
    let issue = Issue::missing("disp-formula", "graphic", Some("e001"));
    assert_eq!(
      issue.to_string(),
      "<disp-formula> (id: e001) is missing required <graphic>, element \
       skipped"
    );

    let issue = Issue::missing("inline-formula", "inline-graphic", None);
    assert!(issue.to_string().contains("(id: none)"));
  }

  #[test]
  fn test_diagnostics_collects_in_order() {
    let mut diagnostics = Diagnostics::new();
    assert!(diagnostics.is_empty());

    diagnostics.report(Issue::AssetNotFound {
      logical_id: "g001".to_string(),
    });
    diagnostics.report(Issue::UnmappedReference {
      ref_type: "fn".to_string(),
      target:   "n1".to_string(),
    });

    let issues = diagnostics.into_issues();
    assert_eq!(issues.len(), 2);
    assert!(matches!(issues[0], Issue::AssetNotFound { .. }));
  }
}
