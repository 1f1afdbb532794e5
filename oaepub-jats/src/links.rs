//! Cross-document fragment links.
//!
//! Every `xref` names a reference type and a target id. The document the
//! target lives in is decided by the reference type alone, through a fixed
//! table, so links can be written before the target document exists.
use std::fmt;

use crate::{
  document::DocumentRole,
  error::{Diagnostics, Issue},
};

/// The `ref-type` values with a known target document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceType {
  Bibliography,
  Figure,
  SupplementaryMaterial,
  Table,
  Affiliation,
  Section,
  TableFootnote,
  BoxedText,
  Other,
  DisplayFormula,
}

impl ReferenceType {
  pub const ALL: [Self; 10] = [
    Self::Bibliography,
    Self::Figure,
    Self::SupplementaryMaterial,
    Self::Table,
    Self::Affiliation,
    Self::Section,
    Self::TableFootnote,
    Self::BoxedText,
    Self::Other,
    Self::DisplayFormula,
  ];

  #[must_use]
  pub fn from_tag(tag: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|kind| kind.tag() == tag)
  }

  /// The `ref-type` attribute value.
  #[must_use]
  pub const fn tag(self) -> &'static str {
    match self {
      Self::Bibliography => "bibr",
      Self::Figure => "fig",
      Self::SupplementaryMaterial => "supplementary-material",
      Self::Table => "table",
      Self::Affiliation => "aff",
      Self::Section => "sec",
      Self::TableFootnote => "table-fn",
      Self::BoxedText => "boxed-text",
      Self::Other => "other",
      Self::DisplayFormula => "disp-formula",
    }
  }

  /// The document targets of this type are linked into.
  #[must_use]
  pub const fn target_document(self) -> DocumentRole {
    match self {
      Self::Bibliography | Self::Other => DocumentRole::Bibliography,
      Self::Affiliation => DocumentRole::Synopsis,
      Self::TableFootnote => DocumentRole::Tables,
      Self::Figure
      | Self::SupplementaryMaterial
      | Self::Table
      | Self::Section
      | Self::BoxedText
      | Self::DisplayFormula => DocumentRole::Main,
    }
  }
}

/// A resolved `(document, anchor)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentLink {
  pub document: DocumentRole,
  /// Output file name of the target document.
  pub file:     String,
  pub anchor:   String,
}

impl FragmentLink {
  #[must_use]
  pub fn href(&self) -> String {
    format!("{}#{}", self.file, self.anchor)
  }
}

impl fmt::Display for FragmentLink {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}#{}", self.file, self.anchor)
  }
}

/// Resolves cross-references for one article.
#[derive(Debug, Clone)]
pub struct LinkResolver {
  article_id: String,
}

impl LinkResolver {
  pub fn new(article_id: impl Into<String>) -> Self {
    Self {
      article_id: article_id.into(),
    }
  }

  #[must_use]
  pub fn article_id(&self) -> &str {
    &self.article_id
  }

  /// Link to `anchor` inside the given document.
  #[must_use]
  pub fn link(&self, document: DocumentRole, anchor: &str) -> FragmentLink {
    FragmentLink {
      document,
      file: document.file_name(&self.article_id),
      anchor: anchor.to_string(),
    }
  }

  /// Resolve a `(ref-type, rid)` pair through the reference type table.
  ///
  /// # Errors
  ///
  /// Returns [`Issue::UnmappedReference`] for a reference type outside the
  /// table.
  pub fn resolve(&self, ref_type: &str, target: &str) -> Result<FragmentLink, Issue> {
    ReferenceType::from_tag(ref_type)
      .map(|kind| self.link(kind.target_document(), target))
      .ok_or_else(|| {
        Issue::UnmappedReference {
          ref_type: ref_type.to_string(),
          target:   target.to_string(),
        }
      })
  }

  /// Like [`resolve`](Self::resolve), reporting unmapped types and linking
  /// them into the main document.
  pub fn resolve_or_main(
    &self,
    ref_type: &str,
    target: &str,
    diagnostics: &mut Diagnostics,
  ) -> FragmentLink {
    self.resolve(ref_type, target).unwrap_or_else(|issue| {
      diagnostics.report(issue);
      self.link(DocumentRole::Main, target)
    })
  }
}
