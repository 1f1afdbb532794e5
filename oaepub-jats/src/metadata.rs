//! Article metadata read from `front` (and the glossary from `back`).
//!
//! The model is what the synopsis builder renders: title, contributors,
//! affiliations, abstracts, dates, rights, funding and the author notes.
use crate::{
  article::Article,
  date::ArticleDate,
  error::TransformError,
  tree::{Element, Node, normalize_whitespace},
};

/// An author or editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
  /// Display name, "Given Surname" or the collaboration name.
  pub name:           String,
  pub role:           Option<String>,
  /// Ids of the affiliations this contributor references.
  pub affiliations:   Vec<String>,
  /// Ids of the correspondence entries this contributor references.
  pub correspondence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affiliation {
  pub id:      String,
  pub label:   Option<String>,
  pub address: String,
}

/// Which abstract an `<abstract>` element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractKind {
  /// No `abstract-type`.
  Default,
  /// `abstract-type="summary"`, the author summary.
  Summary,
  /// `abstract-type="editor"`, the editors' summary.
  Editor,
}

impl AbstractKind {
  #[must_use]
  pub fn from_type(abstract_type: Option<&str>) -> Option<Self> {
    match abstract_type {
      None | Some("") => Some(Self::Default),
      Some("summary") => Some(Self::Summary),
      Some("editor") => Some(Self::Editor),
      Some(_) => None,
    }
  }

  /// Heading used when the abstract carries no title of its own.
  #[must_use]
  pub const fn heading(self) -> &'static str {
    match self {
      Self::Default => "Abstract",
      Self::Summary => "Author Summary",
      Self::Editor => "Editors' Summary",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abstract {
  pub kind:    AbstractKind,
  /// The `<abstract>` element as it appears in the article.
  pub content: Element,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
  pub received: Option<ArticleDate>,
  pub accepted: Option<ArticleDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Copyright {
  pub year:      Option<String>,
  pub statement: Option<String>,
}

impl Copyright {
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.year.is_none() && self.statement.is_none()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryEntry {
  pub term:       String,
  pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glossary {
  pub title:   Option<String>,
  pub entries: Vec<GlossaryEntry>,
}

/// A footnote from `author-notes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footnote {
  pub id:      Option<String>,
  pub content: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorNotes {
  /// `fn-type="current-aff"` footnotes.
  pub current_affiliations: Vec<Footnote>,
  /// The `fn-type="con"` contribution statement.
  pub contributions:        Option<Footnote>,
  /// Every other footnote that is not funding or competing interests.
  pub other:                Vec<Footnote>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correspondence {
  pub id:      Option<String>,
  pub content: Vec<Node>,
}

/// Everything the synopsis needs to know about an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMetadata {
  pub doi:                 Option<String>,
  /// Used in every output file name, e.g. `journal.pbio.1002222`.
  pub article_id:          String,
  pub journal_title:       Option<String>,
  /// Inline content of the article title.
  pub title:               Vec<Node>,
  pub authors:             Vec<Contributor>,
  pub editors:             Vec<Contributor>,
  pub affiliations:        Vec<Affiliation>,
  pub abstracts:           Vec<Abstract>,
  pub history:             History,
  pub publication_date:    Option<ArticleDate>,
  pub copyright:           Copyright,
  pub funding:             Option<String>,
  pub competing_interests: Option<String>,
  pub glossary:            Option<Glossary>,
  pub author_notes:        AuthorNotes,
  pub correspondence:      Vec<Correspondence>,
}

impl ArticleMetadata {
  /// Extract the metadata model from an article.
  ///
  /// # Errors
  ///
  /// Returns [`TransformError::MissingElement`] if the article has no
  /// `front` or `article-meta`, or carries neither a DOI nor a publisher id
  /// to name the output files after.
  pub fn from_article(article: &Article) -> Result<Self, TransformError> {
    if article.front().is_none() {
      return Err(TransformError::MissingElement("front"));
    }
    let meta = article
      .article_meta()
      .ok_or(TransformError::MissingElement("article-meta"))?;

    let doi = article_id_of_type(meta, "doi");
    let article_id = doi
      .as_deref()
      .map(article_id_from_doi)
      .or_else(|| article_id_of_type(meta, "publisher-id"))
      .ok_or(TransformError::MissingElement("article-id"))?;

    let journal_title = article.journal_meta().and_then(|journal| {
      journal
        .child_text("journal-title")
        .or_else(|| {
          journal
            .child("journal-title-group")
            .and_then(|group| group.child_text("journal-title"))
        })
    });

    let title = meta
      .path(&["title-group", "article-title"])
      .map(|title| title.children.clone())
      .unwrap_or_default();

    let mut authors = Vec::new();
    let mut editors = Vec::new();
    for group in meta.children_named("contrib-group") {
      for contrib in group.children_named("contrib") {
        let Some(contributor) = contributor(contrib) else {
          continue;
        };
        match contrib.attr("contrib-type") {
          Some("editor") => editors.push(contributor),
          _ => authors.push(contributor),
        }
      }
    }

    let affiliations = meta
      .children_named("aff")
      .chain(
        meta
          .children_named("contrib-group")
          .flat_map(|group| group.children_named("aff")),
      )
      .filter_map(affiliation)
      .collect();

    let abstracts = meta
      .children_named("abstract")
      .filter_map(|element| {
        let abstract_type = element.attr("abstract-type");
        AbstractKind::from_type(abstract_type).map_or_else(
          || {
            log::debug!(
              "Skipping abstract of type '{}'",
              abstract_type.unwrap_or_default()
            );
            None
          },
          |kind| {
            Some(Abstract {
              kind,
              content: element.clone(),
            })
          },
        )
      })
      .collect();

    let history = meta
      .child("history")
      .map(|history| {
        let date_of = |kind: &str| {
          history
            .children_named("date")
            .find(|date| date.attr("date-type") == Some(kind))
            .and_then(ArticleDate::from_element)
        };
        History {
          received: date_of("received"),
          accepted: date_of("accepted"),
        }
      })
      .unwrap_or_default();

    let publication_date = meta
      .children_named("pub-date")
      .find(|date| date.attr("pub-type") == Some("epub"))
      .or_else(|| meta.child("pub-date"))
      .and_then(ArticleDate::from_element);

    let permissions = meta.child("permissions");
    let copyright = Copyright {
      year:      permissions
        .and_then(|p| p.child_text("copyright-year"))
        .or_else(|| meta.child_text("copyright-year")),
      statement: permissions
        .and_then(|p| p.child_text("copyright-statement"))
        .or_else(|| meta.child_text("copyright-statement")),
    };

    let notes = meta.child("author-notes");
    let note_of_type = |kind: &str| {
      notes.and_then(|notes| {
        notes
          .children_named("fn")
          .find(|note| note.attr("fn-type") == Some(kind))
          .map(|note| normalize_whitespace(&note.text_content()))
          .filter(|text| !text.is_empty())
      })
    };

    let funding = meta
      .child("funding-group")
      .and_then(|group| group.child_text("funding-statement"))
      .or_else(|| note_of_type("financial-disclosure"));
    let competing_interests = note_of_type("conflict");

    let glossary = article.back().and_then(|back| back.child("glossary")).map(
      |glossary| {
        Glossary {
          title:   glossary.child_text("title"),
          entries: glossary
            .descendants()
            .filter(|element| element.is("def-item"))
            .filter_map(|item| {
              Some(GlossaryEntry {
                term:       item.child_text("term")?,
                definition: item.child_text("def").unwrap_or_default(),
              })
            })
            .collect(),
        }
      },
    );

    let author_notes = notes.map(author_notes).unwrap_or_default();

    let correspondence = notes
      .map(|notes| {
        notes
          .children_named("corresp")
          .map(|corresp| {
            Correspondence {
              id:      corresp.id().map(str::to_string),
              content: corresp.children.clone(),
            }
          })
          .collect()
      })
      .unwrap_or_default();

    let metadata = Self {
      doi,
      article_id,
      journal_title,
      title,
      authors,
      editors,
      affiliations,
      abstracts,
      history,
      publication_date,
      copyright,
      funding,
      competing_interests,
      glossary,
      author_notes,
      correspondence,
    };
    log::debug!(
      "Read metadata for {}: {} authors, {} affiliations, {} abstracts",
      metadata.article_id,
      metadata.authors.len(),
      metadata.affiliations.len(),
      metadata.abstracts.len()
    );
    Ok(metadata)
  }

  /// Plain text of the article title.
  #[must_use]
  pub fn title_text(&self) -> String {
    normalize_whitespace(
      &self.title.iter().map(Node::text_content).collect::<String>(),
    )
  }

  #[must_use]
  pub fn affiliation(&self, id: &str) -> Option<&Affiliation> {
    self.affiliations.iter().find(|aff| aff.id == id)
  }
}

/// The part of a DOI after the registrant prefix,
/// `10.1371/journal.pbio.1002222` → `journal.pbio.1002222`.
#[must_use]
pub fn article_id_from_doi(doi: &str) -> String {
  doi
    .split_once('/')
    .map_or(doi, |(_, suffix)| suffix)
    .trim()
    .to_string()
}

fn article_id_of_type(meta: &Element, kind: &str) -> Option<String> {
  meta
    .children_named("article-id")
    .find(|id| id.attr("pub-id-type") == Some(kind))
    .map(|id| normalize_whitespace(&id.text_content()))
    .filter(|id| !id.is_empty())
}

fn contributor(contrib: &Element) -> Option<Contributor> {
  let name = contrib
    .child("name")
    .map(person_name)
    .or_else(|| contrib.child_text("collab"))?;

  let refs_of_type = |kind: &str| -> Vec<String> {
    contrib
      .children_named("xref")
      .filter(|xref| xref.attr("ref-type") == Some(kind))
      .filter_map(|xref| xref.attr("rid"))
      .flat_map(str::split_whitespace)
      .map(str::to_string)
      .collect()
  };

  Some(Contributor {
    name,
    role: contrib.child_text("role"),
    affiliations: refs_of_type("aff"),
    correspondence: refs_of_type("corresp"),
  })
}

fn person_name(name: &Element) -> String {
  [
    name.child_text("given-names"),
    name.child_text("surname"),
    name.child_text("suffix"),
  ]
  .into_iter()
  .flatten()
  .collect::<Vec<_>>()
  .join(" ")
}

fn affiliation(aff: &Element) -> Option<Affiliation> {
  let id = aff.id()?.to_string();
  let address = aff
    .child("addr-line")
    .map(Element::text_content)
    .unwrap_or_else(|| {
      aff
        .children
        .iter()
        .filter(|child| !child.is_element("label"))
        .map(Node::text_content)
        .collect()
    });
  Some(Affiliation {
    id,
    label: aff.child_text("label"),
    address: normalize_whitespace(&address),
  })
}

fn author_notes(notes: &Element) -> AuthorNotes {
  let mut result = AuthorNotes::default();
  for note in notes.children_named("fn") {
    let footnote = Footnote {
      id:      note.id().map(str::to_string),
      content: note.children.clone(),
    };
    match note.attr("fn-type") {
      Some("current-aff") => result.current_affiliations.push(footnote),
      Some("con") => result.contributions = Some(footnote),
      Some("conflict" | "financial-disclosure") => {},
      _ => result.other.push(footnote),
    }
  }
  result
}
