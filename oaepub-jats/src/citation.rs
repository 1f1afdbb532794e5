//! Bibliographic reference entries and their display strings.
//!
//! A [`ReferenceEntry`] is read from one `<ref>`; [`format_citation`] turns it
//! into the inline content of its bibliography paragraph. Formatting depends
//! on nothing but the entry and the journal base URL.
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{
  error::Issue,
  rewrite::{ext_link_anchor, inline_formatting},
  tree::{Element, Node, map_elements, normalize_whitespace},
};

/// Characters left unescaped in "Find This Article Online" query values.
const QUERY_VALUE: &AsciiSet =
  &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

const CITATION_ELEMENTS: &[&str] =
  &["citation", "element-citation", "mixed-citation", "nlm-citation"];

/// The `citation-type` / `publication-type` of a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationType {
  Journal,
  ConfProc,
  Book,
  Web,
  Other,
  Gov,
  /// No type given.
  Unspecified,
  Unknown(String),
}

impl CitationType {
  #[must_use]
  pub fn from_attr(value: Option<&str>) -> Self {
    match value.map(str::trim) {
      None | Some("") => Self::Unspecified,
      Some("journal") => Self::Journal,
      Some("confproc") => Self::ConfProc,
      Some("book") => Self::Book,
      Some("web" | "webpage") => Self::Web,
      Some("other") => Self::Other,
      Some("gov" | "government") => Self::Gov,
      Some(other) => Self::Unknown(other.to_string()),
    }
  }
}

/// One name from an author group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Author {
  Person {
    surname: String,
    given:   Option<String>,
  },
  Collab(String),
}

impl Author {
  fn from_element(element: &Element) -> Option<Self> {
    match element.name.as_str() {
      "name" => {
        Some(Self::Person {
          surname: element.child_text("surname")?,
          given:   element.child_text("given-names"),
        })
      },
      "collab" => {
        let name = normalize_whitespace(&element.text_content());
        (!name.is_empty()).then_some(Self::Collab(name))
      },
      _ => None,
    }
  }

  /// "Surname Given", or the collaboration name.
  #[must_use]
  pub fn display(&self) -> String {
    match self {
      Self::Person {
        surname,
        given: Some(given),
      } => format!("{surname} {given}"),
      Self::Person { surname, .. } => surname.clone(),
      Self::Collab(name) => name.clone(),
    }
  }

  #[must_use]
  pub fn surname(&self) -> &str {
    match self {
      Self::Person { surname, .. } => surname,
      Self::Collab(name) => name,
    }
  }
}

/// Conference details of a `confproc` reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conference {
  pub name:     Option<String>,
  pub date:     Option<String>,
  pub location: Option<String>,
}

/// One bibliographic reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
  pub id:            Option<String>,
  pub label:         Option<String>,
  pub citation_type: CitationType,
  pub authors:       Vec<Author>,
  pub et_al:         bool,
  pub year:          Option<String>,
  /// Inline content of `article-title`.
  pub article_title: Vec<Node>,
  pub source:        Option<String>,
  pub volume:        Option<String>,
  pub issue:         Option<String>,
  pub supplement:    Option<String>,
  pub fpage:         Option<String>,
  pub lpage:         Option<String>,
  /// Content of `comment`.
  pub comment:       Vec<Node>,
  pub conference:    Conference,
  /// The citation element the fields were read from, for the generic
  /// formatting.
  pub citation:      Element,
}

impl ReferenceEntry {
  /// Read a `<ref>`. A reference without a citation element is read from
  /// the `ref` itself.
  #[must_use]
  pub fn from_ref(reference: &Element) -> Self {
    let citation = reference
      .child_elements()
      .find(|child| CITATION_ELEMENTS.contains(&child.name.as_str()))
      .unwrap_or(reference);

    let citation_type = CitationType::from_attr(
      citation
        .attr("citation-type")
        .or_else(|| citation.attr("publication-type")),
    );

    let text_of = |name: &str| {
      citation
        .find(name)
        .map(|element| normalize_whitespace(&element.text_content()))
        .filter(|text| !text.is_empty())
    };

    Self {
      id: reference.id().map(str::to_string),
      label: reference.child_text("label"),
      citation_type,
      authors: authors(citation),
      et_al: citation.find("etal").is_some(),
      year: text_of("year"),
      article_title: citation
        .find("article-title")
        .map(|title| title.children.clone())
        .unwrap_or_default(),
      source: text_of("source"),
      volume: text_of("volume"),
      issue: text_of("issue"),
      supplement: text_of("supplement"),
      fpage: text_of("fpage"),
      lpage: text_of("lpage"),
      comment: citation
        .find("comment")
        .map(|comment| comment.children.clone())
        .unwrap_or_default(),
      conference: Conference {
        name:     text_of("conf-name"),
        date:     text_of("conf-date"),
        location: text_of("conf-loc"),
      },
      citation: citation.clone(),
    }
  }

  fn title_text(&self) -> String {
    normalize_whitespace(
      &self
        .article_title
        .iter()
        .map(Node::text_content)
        .collect::<String>(),
    )
  }

  fn author_list(&self) -> String {
    let mut names = self
      .authors
      .iter()
      .map(Author::display)
      .collect::<Vec<_>>()
      .join(", ");
    if self.et_al {
      if names.is_empty() {
        names.push_str("et al.");
      } else {
        names.push_str(", et al.");
      }
    }
    names
  }

  fn label_prefix(&self) -> String {
    self
      .label
      .as_deref()
      .map(|label| format!("{label}. "))
      .unwrap_or_default()
  }
}

/// Authors from the author `person-group`, or from the citation's own
/// `name`/`collab` children when there is none.
fn authors(citation: &Element) -> Vec<Author> {
  let group = citation.children_named("person-group").find(|group| {
    matches!(group.attr("person-group-type"), None | Some("author"))
  });
  group
    .unwrap_or(citation)
    .child_elements()
    .filter_map(Author::from_element)
    .collect()
}

/// Formatted inline content of one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedCitation {
  pub content: Vec<Node>,
  /// Trailing hyperlink: the DOI link or "Find This Article Online".
  pub link:    Option<Element>,
}

impl FormattedCitation {
  /// Plain text of the content, without the trailing link.
  #[must_use]
  pub fn text(&self) -> String {
    self.content.iter().map(Node::text_content).collect()
  }

  /// Content followed by the link, separated by a space.
  #[must_use]
  pub fn into_nodes(self) -> Vec<Node> {
    let mut nodes = self.content;
    if let Some(link) = self.link {
      nodes.push(Node::text(" "));
      nodes.push(link.into());
    }
    nodes
  }
}

/// Format a reference by its citation type.
///
/// `journal_url` is the host journal's base URL, used to build "Find This
/// Article Online" links for journal references.
///
/// # Errors
///
/// Returns [`Issue::UnrecognizedValue`] for a citation type outside the known
/// set.
pub fn format_citation(
  entry: &ReferenceEntry,
  journal_url: Option<&str>,
) -> Result<FormattedCitation, Issue> {
  match &entry.citation_type {
    CitationType::Journal => Ok(format_journal(entry, journal_url)),
    CitationType::ConfProc => Ok(format_confproc(entry)),
    CitationType::Book
    | CitationType::Web
    | CitationType::Other
    | CitationType::Gov
    | CitationType::Unspecified => Ok(format_generic(entry)),
    CitationType::Unknown(value) => {
      Err(Issue::unrecognized("citation-type", value, "label only"))
    },
  }
}

/// `1. Smith J, Doe A (2020) A Study. J. Biol 12(3): 100-110.`
fn format_journal(entry: &ReferenceEntry, journal_url: Option<&str>) -> FormattedCitation {
  let mut content = Vec::new();
  let mut lead = entry.label_prefix();
  let authors = entry.author_list();
  if !authors.is_empty() {
    lead.push_str(&authors);
    lead.push(' ');
  }
  if let Some(year) = &entry.year {
    lead.push_str(&format!("({year}) "));
  }
  push_text(&mut content, &lead);

  let title_text = entry.title_text();
  if !title_text.is_empty() {
    content.extend(inline_formatting(trimmed(entry.article_title.clone())));
    if !title_text.ends_with(['.', '?', '!']) {
      push_text(&mut content, ".");
    }
    push_text(&mut content, " ");
  }

  let mut tail = entry.source.clone().unwrap_or_default();
  if let Some(volume) = &entry.volume {
    if !tail.is_empty() {
      tail.push(' ');
    }
    tail.push_str(volume);
  }
  let issue = [
    entry.issue.clone(),
    entry.supplement.as_ref().map(|supplement| format!("Suppl {supplement}")),
  ]
  .into_iter()
  .flatten()
  .collect::<Vec<_>>()
  .join(" ");
  if !issue.is_empty() {
    tail.push_str(&format!("({issue})"));
  }
  if let Some(fpage) = &entry.fpage {
    tail.push_str(": ");
    tail.push_str(fpage);
    if let Some(lpage) = &entry.lpage {
      tail.push('-');
      tail.push_str(lpage);
    }
  }
  tail.push('.');
  push_text(&mut content, &tail);

  let lead_text = comment_lead(&entry.comment);
  let link = if lead_text.eq_ignore_ascii_case("doi:") {
    doi_link(&entry.comment)
  } else {
    if entry.comment.iter().any(|node| !node.is_blank_text()) {
      push_text(&mut content, " ");
      content.extend(comment_nodes(entry.comment.clone()));
    }
    journal_url.and_then(|base| find_article_link(entry, base))
  };

  FormattedCitation { content, link }
}

/// `1. Smith J <title> Conference; 2010 May 1; Boston. (2010) <comment>`
fn format_confproc(entry: &ReferenceEntry) -> FormattedCitation {
  let mut content = Vec::new();
  let mut lead = entry.label_prefix();
  let authors = entry.author_list();
  if !authors.is_empty() {
    lead.push_str(&authors);
    lead.push(' ');
  }
  push_text(&mut content, &lead);

  if !entry.title_text().is_empty() {
    content.extend(inline_formatting(trimmed(entry.article_title.clone())));
  }

  let conference = [
    &entry.conference.name,
    &entry.conference.date,
    &entry.conference.location,
  ]
  .into_iter()
  .flatten()
  .cloned()
  .collect::<Vec<_>>()
  .join("; ");
  let mut middle = String::new();
  if !conference.is_empty() {
    middle.push(' ');
    middle.push_str(&conference);
    middle.push('.');
  }
  if let Some(year) = &entry.year {
    middle.push_str(&format!(" ({year})"));
  }
  push_text(&mut content, &middle);

  if entry.comment.iter().any(|node| !node.is_blank_text()) {
    push_text(&mut content, " ");
    content.extend(comment_nodes(entry.comment.clone()));
  } else {
    push_text(&mut content, ".");
  }

  FormattedCitation {
    content,
    link: None,
  }
}

/// Best-effort flattening for the less structured types: every text run,
/// with years parenthesized, sources bracketed and titles quoted, joined
/// with commas.
fn format_generic(entry: &ReferenceEntry) -> FormattedCitation {
  let mut parts = Vec::new();
  collect_generic(&entry.citation, &mut parts);
  let mut text = entry.label_prefix();
  text.push_str(parts.join(", ").trim_end_matches([',', ' ']));

  FormattedCitation {
    content: vec![Node::text(text)],
    link:    None,
  }
}

fn collect_generic(element: &Element, parts: &mut Vec<String>) {
  for child in &element.children {
    match child {
      Node::Element(child) if child.is("name") => {
        if let Some(author) = Author::from_element(child) {
          parts.push(author.display());
        }
      },
      Node::Element(child) => {
        let text = normalize_whitespace(&child.text_content());
        match child.name.as_str() {
          _ if text.is_empty() => {},
          "year" => parts.push(format!("({text})")),
          "source" => parts.push(format!("[{text}]")),
          "article-title" => parts.push(format!("\"{text}\"")),
          _ => collect_generic(child, parts),
        }
      },
      Node::Text(text) => {
        let text = normalize_whitespace(text);
        if text.chars().any(char::is_alphanumeric) {
          parts.push(text);
        }
      },
    }
  }
}

/// Direct text of a comment, ignoring its child elements.
fn comment_lead(comment: &[Node]) -> String {
  comment
    .iter()
    .filter_map(|node| {
      match node {
        Node::Text(text) => Some(text.as_str()),
        Node::Element(_) => None,
      }
    })
    .collect::<String>()
    .trim()
    .to_string()
}

fn doi_link(comment: &[Node]) -> Option<Element> {
  let link = comment
    .iter()
    .filter_map(Node::as_element)
    .find(|element| element.is("ext-link"))?;
  let anchor = ext_link_anchor(link.clone());
  let text = normalize_whitespace(&anchor.text_content());
  Some(
    Element::new("a")
      .with_attr("href", anchor.attr("href").unwrap_or_default())
      .with_text(format!("doi:{text}")),
  )
}

fn comment_nodes(comment: Vec<Node>) -> Vec<Node> {
  let nodes = map_elements(comment, &mut |element| {
    if element.is("ext-link") || element.is("uri") {
      vec![ext_link_anchor(element).into()]
    } else {
      vec![element.into()]
    }
  });
  inline_formatting(trimmed(nodes))
}

/// `<base>article/findArticle.action?author=<surname>&title=<title>`
fn find_article_link(entry: &ReferenceEntry, base: &str) -> Option<Element> {
  let surname = entry.authors.first()?.surname();
  let title = entry.title_text();
  let href = format!(
    "{base}article/findArticle.action?author={}&title={}",
    utf8_percent_encode(surname, QUERY_VALUE),
    utf8_percent_encode(&title, QUERY_VALUE)
  );
  Some(
    Element::new("a")
      .with_attr("href", href)
      .with_text("Find This Article Online"),
  )
}

/// Trim leading and trailing whitespace off the outer text nodes.
fn trimmed(mut nodes: Vec<Node>) -> Vec<Node> {
  if let Some(Node::Text(first)) = nodes.first_mut() {
    *first = first.trim_start().to_string();
  }
  if let Some(Node::Text(last)) = nodes.last_mut() {
    *last = last.trim_end().to_string();
  }
  nodes.retain(|node| !matches!(node, Node::Text(text) if text.is_empty()));
  nodes
}

fn push_text(content: &mut Vec<Node>, text: &str) {
  if text.is_empty() {
    return;
  }
  if let Some(Node::Text(last)) = content.last_mut() {
    last.push_str(text);
  } else {
    content.push(Node::text(text));
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;
  use crate::xml::{nodes_to_markup, parse_document};

  fn entry(xml: &str) -> ReferenceEntry {
    ReferenceEntry::from_ref(&parse_document(xml).unwrap())
  }

  #[test]
  fn test_citation_type_parsing() {
    assert_eq!(CitationType::from_attr(Some("journal")), CitationType::Journal);
    assert_eq!(CitationType::from_attr(None), CitationType::Unspecified);
    assert_eq!(
      CitationType::from_attr(Some("patent")),
      CitationType::Unknown("patent".to_string())
    );
  }

  #[test]
  fn test_journal_reads_person_group() {
    let entry = entry(
      r#"<ref id="b1"><label>1</label><element-citation publication-type="journal">
<person-group person-group-type="author"><name><surname>Smith</surname><given-names>J</given-names></name><collab>WHO</collab><etal/></person-group>
<article-title>Title</article-title><source>Src</source><year>2001</year><volume>3</volume><fpage>5</fpage>
</element-citation></ref>"#,
    );
    assert_eq!(entry.authors.len(), 2);
    assert!(entry.et_al);
    assert_eq!(entry.author_list(), "Smith J, WHO, et al.");
    assert_eq!(
      format_citation(&entry, None).unwrap().text(),
      "1. Smith J, WHO, et al. (2001) Title. Src 3: 5."
    );
  }

  #[test]
  fn test_journal_title_keeps_formatting() {
    let entry = entry(
      r#"<ref id="b2"><label>2</label><citation citation-type="journal"><name><surname>Doe</surname><given-names>A</given-names></name> <year>1999</year> <article-title>Growth of <italic>E. coli</italic>?</article-title> <source>Nature</source> <volume>1</volume></citation></ref>"#,
    );
    let formatted = format_citation(&entry, None).unwrap();
    assert_eq!(
      nodes_to_markup(&formatted.content),
      "2. Doe A (1999) Growth of <i>E. coli</i>? Nature 1."
    );
  }

  #[test]
  fn test_doi_comment_becomes_link() {
    let entry = entry(
      r#"<ref id="b3"><label>3</label><citation citation-type="journal"><name><surname>Roe</surname></name><year>2010</year><article-title>T</article-title><source>S</source><volume>2</volume><fpage>1</fpage><comment>doi:<ext-link ext-link-type="uri" xlink:href="http://dx.doi.org/10.1/x">10.1/x</ext-link></comment></citation></ref>"#,
    );
    let formatted = format_citation(&entry, Some("http://www.plosone.org/")).unwrap();
    assert_eq!(formatted.text(), "3. Roe (2010) T. S 2: 1.");
    let link = formatted.link.unwrap();
    assert_eq!(link.attr("href"), Some("http://dx.doi.org/10.1/x"));
    assert_eq!(link.text_content(), "doi:10.1/x");
  }

  #[test]
  fn test_find_article_link() {
    let entry = entry(
      r#"<ref id="b4"><label>4</label><citation citation-type="journal"><name><surname>Van Dyke</surname><given-names>K</given-names></name><year>2010</year><article-title>Cells &amp; tissues</article-title><source>S</source></citation></ref>"#,
    );
    let formatted = format_citation(&entry, Some("http://www.plosone.org/")).unwrap();
    assert_eq!(
      formatted.link.unwrap().attr("href"),
      Some(
        "http://www.plosone.org/article/findArticle.action?author=Van%20Dyke&title=Cells%20%26%20tissues"
      )
    );
  }

  #[test]
  fn test_confproc() {
    let entry = entry(
      r#"<ref id="b5"><label>5</label><citation citation-type="confproc"><name><surname>Lee</surname><given-names>C</given-names></name><article-title>Talk</article-title><conf-name>Big Meeting</conf-name><conf-date>May 2009</conf-date><conf-loc>Paris, France</conf-loc><year>2009</year></citation></ref>"#,
    );
    assert_eq!(
      format_citation(&entry, None).unwrap().text(),
      "5. Lee C Talk Big Meeting; May 2009; Paris, France. (2009)."
    );
  }

  #[test]
  fn test_generic_flattening() {
    let entry = entry(
      r#"<ref id="b6"><label>6</label><citation citation-type="book"><name><surname>Kim</surname><given-names>D</given-names></name> (<year>2004</year>) <source>A Book</source>. <publisher-loc>London</publisher-loc>: <publisher-name>Pub</publisher-name>. </citation></ref>"#,
    );
    assert_eq!(
      format_citation(&entry, None).unwrap().text(),
      "6. Kim D, (2004), [A Book], London, Pub"
    );
  }

  #[test]
  fn test_unknown_type_is_an_issue() {
    let entry = entry(
      r#"<ref id="b7"><label>7</label><citation citation-type="patent"><source>X</source></citation></ref>"#,
    );
    assert!(matches!(
      format_citation(&entry, None),
      Err(Issue::UnrecognizedValue { .. })
    ));
  }
}
