//! The four XHTML output documents and how they are named and written.
use std::{
  fmt, fs,
  path::{Path, PathBuf},
};

use oaepub_config::Config;

use crate::{
  error::{Issue, TransformError},
  tree::{Element, Node},
  xml::to_markup,
};

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
const XHTML_DOCTYPE: &str = "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML \
                             1.1//EN\" \
                             \"http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd\">";

/// Which of the four output documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentRole {
  Synopsis,
  Main,
  Bibliography,
  Tables,
}

impl DocumentRole {
  pub const ALL: [Self; 4] =
    [Self::Synopsis, Self::Main, Self::Bibliography, Self::Tables];

  /// File name prefix.
  #[must_use]
  pub const fn prefix(self) -> &'static str {
    match self {
      Self::Synopsis => "synop",
      Self::Main => "main",
      Self::Bibliography => "biblio",
      Self::Tables => "tables",
    }
  }

  /// Text of the document's `<title>`.
  #[must_use]
  pub const fn title(self) -> &'static str {
    match self {
      Self::Synopsis => "Synopsis file",
      Self::Main => "Main file",
      Self::Bibliography => "Bibliography file",
      Self::Tables => "HTML Versions of Tables",
    }
  }

  /// `<role>.<article-id>.xml`
  #[must_use]
  pub fn file_name(self, article_id: &str) -> String {
    format!("{}.{article_id}.xml", self.prefix())
  }

  /// `<role>.<article-id>.xml#<fragment>`
  #[must_use]
  pub fn href(self, article_id: &str, fragment: &str) -> String {
    format!("{}#{fragment}", self.file_name(article_id))
  }
}

impl fmt::Display for DocumentRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.prefix())
  }
}

/// One output document: a titled XHTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
  pub role:  DocumentRole,
  pub title: String,
  /// Contents of `<body>`.
  pub body:  Vec<Node>,
}

impl OutputDocument {
  #[must_use]
  pub fn new(role: DocumentRole) -> Self {
    Self {
      role,
      title: role.title().to_string(),
      body: Vec::new(),
    }
  }

  pub fn push(&mut self, node: impl Into<Node>) {
    self.body.push(node.into());
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.body.iter().all(Node::is_blank_text)
  }

  /// The `<html>` element of the document.
  #[must_use]
  pub fn to_element(&self, config: &Config) -> Element {
    let head = Element::new("head")
      .with_child(Element::new("title").with_text(self.title.as_str()))
      .with_child(
        Element::new("link")
          .with_attr("rel", "stylesheet")
          .with_attr("href", config.stylesheet.as_str())
          .with_attr("type", "text/css"),
      )
      .with_child(
        Element::new("meta")
          .with_attr("http-equiv", "Content-Type")
          .with_attr("content", "application/xhtml+xml"),
      );

    Element::new("html")
      .with_attr("xmlns", XHTML_NAMESPACE)
      .with_attr("xml:lang", config.language.as_str())
      .with_child(head)
      .with_child(Element::new("body").with_children(self.body.iter().cloned()))
  }

  /// Serialize as an XHTML 1.1 document.
  #[must_use]
  pub fn to_xhtml(&self, config: &Config) -> String {
    format!(
      "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{XHTML_DOCTYPE}\n{}",
      to_markup(&self.to_element(config))
    )
  }
}

/// The documents produced for one article.
#[derive(Debug, Clone)]
pub struct ArticleDocuments {
  pub article_id:   String,
  pub synopsis:     OutputDocument,
  pub main:         OutputDocument,
  /// Absent when the article has no back-matter reference list.
  pub bibliography: Option<OutputDocument>,
  /// Absent when the article has no structured tables.
  pub tables:       Option<OutputDocument>,
  /// Recoverable issues raised during the transform.
  pub issues:       Vec<Issue>,
}

impl ArticleDocuments {
  /// The documents that exist, in reading order.
  pub fn documents(&self) -> impl Iterator<Item = &OutputDocument> {
    [
      Some(&self.synopsis),
      Some(&self.main),
      self.bibliography.as_ref(),
      self.tables.as_ref(),
    ]
    .into_iter()
    .flatten()
  }

  #[must_use]
  pub fn get(&self, role: DocumentRole) -> Option<&OutputDocument> {
    self.documents().find(|document| document.role == role)
  }

  /// Write every existing document into `dir`.
  ///
  /// # Errors
  ///
  /// Returns an error if the directory cannot be created or a file cannot be
  /// written.
  ///
  /// # Returns
  ///
  /// The paths written, in reading order.
  pub fn write_to(
    &self,
    dir: &Path,
    config: &Config,
  ) -> Result<Vec<PathBuf>, TransformError> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for document in self.documents() {
      let path = dir.join(document.role.file_name(&self.article_id));
      fs::write(&path, document.to_xhtml(config))?;
      log::info!("Wrote {}", path.display());
      written.push(path);
    }
    Ok(written)
  }
}
