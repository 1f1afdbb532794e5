//! The parsed input article.
use std::{fs, path::Path};

use crate::{error::TransformError, tree::Element, xml::parse_document};

/// A parsed JATS/NLM article.
///
/// The tree is read-only; builders clone the parts they turn into output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
  root: Element,
}

impl Article {
  /// Parse article XML.
  ///
  /// # Errors
  ///
  /// Returns an error if the XML is not well formed.
  pub fn parse(xml: &str) -> Result<Self, TransformError> {
    let root = parse_document(xml)?;
    if !root.is("article") {
      log::warn!("Root element is <{}>, expected <article>", root.name);
    }
    Ok(Self { root })
  }

  /// Read and parse an article file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not well formed.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TransformError> {
    let path = path.as_ref();
    log::debug!("Reading article from {}", path.display());
    let content = fs::read_to_string(path)?;
    Self::parse(&content)
  }

  #[must_use]
  pub const fn from_root(root: Element) -> Self {
    Self { root }
  }

  #[must_use]
  pub const fn root(&self) -> &Element {
    &self.root
  }

  #[must_use]
  pub fn front(&self) -> Option<&Element> {
    self.root.child("front")
  }

  #[must_use]
  pub fn body(&self) -> Option<&Element> {
    self.root.child("body")
  }

  #[must_use]
  pub fn back(&self) -> Option<&Element> {
    self.root.child("back")
  }

  #[must_use]
  pub fn article_meta(&self) -> Option<&Element> {
    self.root.path(&["front", "article-meta"])
  }

  #[must_use]
  pub fn journal_meta(&self) -> Option<&Element> {
    self.root.path(&["front", "journal-meta"])
  }
}
