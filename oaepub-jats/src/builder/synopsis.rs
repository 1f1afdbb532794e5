//! The synopsis document: title, contributors, abstracts and the front
//! matter statements.
use crate::{
  context::Context,
  document::{DocumentRole, OutputDocument},
  metadata::{Abstract, AbstractKind, ArticleMetadata, Footnote, Glossary},
  rewrite::{Rewriter, assign_headings},
  tree::{Element, Node},
};

/// Assemble the synopsis. Every block is optional and only present when the
/// metadata has something for it.
pub(super) fn build(
  metadata: &ArticleMetadata,
  ctx: &mut Context<'_>,
) -> OutputDocument {
  let mut rewriter = Rewriter::new();
  let mut document = OutputDocument::new(DocumentRole::Synopsis);

  let title = rewriter.rewrite(metadata.title.clone(), ctx);
  document.push(
    Element::new("h1")
      .with_attr("id", "title")
      .with_children(title),
  );

  let affiliations = affiliation_order(metadata);
  if !metadata.authors.is_empty() {
    document.push(authors(metadata, &affiliations, ctx));
  }
  for (number, id) in affiliations.iter().enumerate() {
    if let Some(affiliation) = metadata.affiliation(id) {
      document.push(
        Element::new("p")
          .with_attr("class", "affiliation")
          .with_child(
            Element::new("sup")
              .with_attr("id", affiliation.id.as_str())
              .with_text((number + 1).to_string()),
          )
          .with_text(format!(" {}", affiliation.address)),
      );
    }
  }

  let notes = &metadata.author_notes;
  for note in notes.current_affiliations.iter().chain(&notes.other) {
    document.body.extend(author_note(note, &mut rewriter, ctx));
  }

  let mut used_ids = Vec::new();
  for summary in &metadata.abstracts {
    document.push(abstract_block(summary, &mut used_ids, &mut rewriter, ctx));
  }

  if let Some(editors) = editors(metadata) {
    document.push(editors);
  }
  if let Some(dates) = dates(metadata) {
    document.push(dates);
  }

  if !metadata.copyright.is_empty() {
    let text = [
      Some("\u{a9}"),
      metadata.copyright.year.as_deref(),
      metadata.copyright.statement.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");
    document.push(statement("copyright", "Copyright", &text));
  }
  if let Some(funding) = &metadata.funding {
    document.push(statement("funding", "Funding", funding));
  }
  if let Some(interests) = &metadata.competing_interests {
    document.push(statement(
      "competing-interests",
      "Competing Interests",
      interests,
    ));
  }
  if let Some(glossary) = metadata
    .glossary
    .as_ref()
    .filter(|glossary| !glossary.entries.is_empty())
  {
    document.push(abbreviations(glossary));
  }

  for correspondence in &metadata.correspondence {
    let mut paragraph = Element::new("p").with_attr("class", "correspondence");
    if let Some(id) = &correspondence.id {
      paragraph.set_attr("id", id);
    }
    let content = rewriter.rewrite(correspondence.content.clone(), ctx);
    document.push(paragraph.with_children(content));
  }

  log::debug!(
    "Built synopsis for {} with {} blocks",
    metadata.article_id,
    document.body.len()
  );
  document
}

/// Affiliation ids in the order authors first reference them, followed by
/// any remaining affiliation no editor references.
fn affiliation_order(metadata: &ArticleMetadata) -> Vec<String> {
  let mut order: Vec<String> = Vec::new();
  let referenced = metadata
    .authors
    .iter()
    .flat_map(|author| &author.affiliations);
  for id in referenced {
    if metadata.affiliation(id).is_some() && !order.contains(id) {
      order.push(id.clone());
    }
  }

  let editor_affiliations = metadata
    .editors
    .iter()
    .flat_map(|editor| &editor.affiliations)
    .collect::<Vec<_>>();
  for affiliation in &metadata.affiliations {
    if !order.contains(&affiliation.id)
      && !editor_affiliations.contains(&&affiliation.id)
    {
      order.push(affiliation.id.clone());
    }
  }
  order
}

/// `<h2>Name<sup><a>1</a></sup><sup><a>*</a></sup>, Name ...</h2>`
fn authors(
  metadata: &ArticleMetadata,
  order: &[String],
  ctx: &mut Context<'_>,
) -> Element {
  let mut line = Element::new("h2").with_attr("class", "authors");
  for (index, author) in metadata.authors.iter().enumerate() {
    if index > 0 {
      line.push_text(", ");
    }
    line.push_text(&author.name);

    for id in &author.affiliations {
      let Some(number) = order.iter().position(|known| known == id) else {
        continue;
      };
      let href = ctx.reference_href("aff", id);
      line.push(
        Element::new("sup").with_child(
          Element::new("a")
            .with_attr("href", href)
            .with_text((number + 1).to_string()),
        ),
      );
    }
    for id in &author.correspondence {
      let href = ctx.links.link(DocumentRole::Synopsis, id).href();
      line.push(
        Element::new("sup")
          .with_child(Element::new("a").with_attr("href", href).with_text("*")),
      );
    }
  }
  line
}

fn author_note(
  note: &Footnote,
  rewriter: &mut Rewriter,
  ctx: &mut Context<'_>,
) -> Vec<Node> {
  let mut footnote = Element::new("fn").with_children(note.content.clone());
  if let Some(id) = &note.id {
    footnote.set_attr("id", id);
  }
  let paragraph = Element::new("p")
    .with_attr("class", "author-note")
    .with_child(footnote);
  rewriter.rewrite(vec![paragraph.into()], ctx)
}

fn abstract_block(
  summary: &Abstract,
  used_ids: &mut Vec<String>,
  rewriter: &mut Rewriter,
  ctx: &mut Context<'_>,
) -> Element {
  let base = match summary.kind {
    AbstractKind::Default => "abstract",
    AbstractKind::Summary => "author-summary",
    AbstractKind::Editor => "editors-summary",
  };
  let mut id = base.to_string();
  let mut suffix = 1;
  while used_ids.contains(&id) {
    suffix += 1;
    id = format!("{base}-{suffix}");
  }
  used_ids.push(id.clone());

  let heading = summary
    .content
    .child("title")
    .filter(|title| title.has_content())
    .map_or_else(
      || vec![Node::text(summary.kind.heading())],
      |title| title.children.clone(),
    );
  let content = summary
    .content
    .children
    .iter()
    .filter(|child| !child.is_element("title"))
    .cloned()
    .collect();

  let mut content = rewriter.rewrite(content, ctx);
  assign_headings(&mut content, 1);
  let heading = rewriter.rewrite(heading, ctx);

  Element::new("div")
    .with_attr("id", id)
    .with_attr("class", "abstract")
    .with_child(Element::new("h2").with_children(heading))
    .with_children(content)
}

/// `Editor: Name, Address; Name, Address`
fn editors(metadata: &ArticleMetadata) -> Option<Element> {
  if metadata.editors.is_empty() {
    return None;
  }
  let label = if metadata.editors.len() > 1 {
    "Editors: "
  } else {
    "Editor: "
  };
  let entries = metadata
    .editors
    .iter()
    .map(|editor| {
      std::iter::once(editor.name.clone())
        .chain(
          editor
            .affiliations
            .iter()
            .filter_map(|id| metadata.affiliation(id))
            .map(|affiliation| affiliation.address.clone()),
        )
        .collect::<Vec<_>>()
        .join(", ")
    })
    .collect::<Vec<_>>()
    .join("; ");

  Some(
    Element::new("p")
      .with_attr("id", "editor")
      .with_child(Element::new("b").with_text(label))
      .with_text(entries),
  )
}

/// `Received ... Accepted ... Published ...`, skipping unknown dates.
fn dates(metadata: &ArticleMetadata) -> Option<Element> {
  let dates = [
    ("Received", metadata.history.received.as_ref()),
    ("Accepted", metadata.history.accepted.as_ref()),
    ("Published", metadata.publication_date.as_ref()),
  ];
  let mut paragraph = Element::new("p").with_attr("id", "dates");
  for (label, date) in dates {
    let Some(date) = date else {
      continue;
    };
    if paragraph.has_content() {
      paragraph.push_text(" ");
    }
    paragraph.push(Element::new("b").with_text(format!("{label}:")));
    paragraph.push_text(&format!(" {}", date.nice_string()));
  }
  paragraph.has_content().then_some(paragraph)
}

fn statement(id: &str, label: &str, text: &str) -> Element {
  Element::new("p")
    .with_attr("id", id)
    .with_child(Element::new("b").with_text(format!("{label}:")))
    .with_text(format!(" {text}"))
}

fn abbreviations(glossary: &Glossary) -> Element {
  let mut paragraph = Element::new("p")
    .with_attr("id", "abbreviations")
    .with_child(Element::new("b").with_text(format!(
      "{}:",
      glossary.title.as_deref().unwrap_or("Abbreviations")
    )));
  let entries = glossary
    .entries
    .iter()
    .map(|entry| format!("{}, {}", entry.term, entry.definition))
    .collect::<Vec<_>>()
    .join("; ");
  paragraph.push_text(&format!(" {entries}"));
  paragraph
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use oaepub_config::Config;

  use super::*;
  use crate::{article::Article, media::MediaIndex, xml::nodes_to_markup};

  const ARTICLE: &str = r#"<article>
<front>
  <journal-meta><journal-title>PLoS ONE</journal-title></journal-meta>
  <article-meta>
    <article-id pub-id-type="doi">10.1371/journal.pone.0000001</article-id>
    <title-group><article-title>Cells <italic>in vivo</italic></article-title></title-group>
    <contrib-group>
      <contrib contrib-type="author"><name><surname>Smith</surname><given-names>Jane</given-names></name>
        <xref ref-type="aff" rid="aff2"/><xref ref-type="corresp" rid="cor1"/></contrib>
      <contrib contrib-type="author"><name><surname>Roe</surname><given-names>Rick</given-names></name>
        <xref ref-type="aff" rid="aff1"/><xref ref-type="aff" rid="aff2"/></contrib>
      <contrib contrib-type="editor"><name><surname>Doe</surname><given-names>John</given-names></name>
        <xref ref-type="aff" rid="edit1"/></contrib>
    </contrib-group>
    <aff id="aff1"><label>1</label><addr-line>Lab One</addr-line></aff>
    <aff id="aff2"><label>2</label><addr-line>Lab Two</addr-line></aff>
    <aff id="edit1"><addr-line>Editor University</addr-line></aff>
    <author-notes>
      <corresp id="cor1">* E-mail: <email>jane@example.org</email></corresp>
      <fn fn-type="conflict"><p>None declared.</p></fn>
    </author-notes>
    <pub-date pub-type="epub"><day>5</day><month>1</month><year>2011</year></pub-date>
    <history><date date-type="received"><day>1</day><month>6</month><year>2010</year></date></history>
    <permissions><copyright-year>2011</copyright-year><copyright-statement>Smith et al.</copyright-statement></permissions>
    <abstract><p>We <bold>did</bold> things.</p></abstract>
    <abstract abstract-type="summary"><title>Why</title><sec><title>Part</title><p>Because.</p></sec></abstract>
  </article-meta>
</front>
<body/>
</article>"#;

  fn synopsis() -> String {
    let article = Article::parse(ARTICLE).unwrap();
    let metadata = ArticleMetadata::from_article(&article).unwrap();
    let config = Config::default();
    let media = MediaIndex::empty();
    let mut ctx = Context::new(&config, &media, &metadata.article_id, None);
    nodes_to_markup(&build(&metadata, &mut ctx).body)
  }

  #[test]
  fn test_title_and_authors() {
    let markup = synopsis();
    assert!(markup.starts_with("<h1 id=\"title\">Cells <i>in vivo</i></h1>\n"));
    assert!(markup.contains(
      "<h2 class=\"authors\">Jane Smith<sup><a \
       href=\"synop.journal.pone.0000001.xml#aff2\">1</a></sup><sup><a \
       href=\"synop.journal.pone.0000001.xml#cor1\">*</a></sup>, Rick \
       Roe<sup><a href=\"synop.journal.pone.0000001.xml#aff1\">2</a></sup><sup><a \
       href=\"synop.journal.pone.0000001.xml#aff2\">1</a></sup></h2>"
    ));
  }

  #[test]
  fn test_affiliations_numbered_by_first_reference() {
    let markup = synopsis();
    assert!(markup.contains(
      "<p class=\"affiliation\"><sup id=\"aff2\">1</sup> Lab Two</p>\n<p \
       class=\"affiliation\"><sup id=\"aff1\">2</sup> Lab One</p>"
    ));
    assert!(!markup.contains("<sup id=\"edit1\">"));
  }

  #[test]
  fn test_abstracts() {
    let markup = synopsis();
    assert!(markup.contains(
      "<div id=\"abstract\" class=\"abstract\"><h2>Abstract</h2>\n<p>We \
       <b>did</b> things.</p>\n</div>"
    ));
    assert!(markup.contains(
      "<div id=\"author-summary\" class=\"abstract\"><h2>Why</h2>"
    ));
    assert!(markup.contains("<h3>Part</h3>"));
  }

  #[test]
  fn test_statements() {
    let markup = synopsis();
    assert!(markup.contains(
      "<p id=\"editor\"><b>Editor: </b>John Doe, Editor University</p>"
    ));
    assert!(markup.contains(
      "<p id=\"dates\"><b>Received:</b> June 1, 2010 <b>Published:</b> \
       January 5, 2011</p>"
    ));
    assert!(markup.contains(
      "<p id=\"copyright\"><b>Copyright:</b> \u{a9} 2011 Smith et al.</p>"
    ));
    assert!(markup.contains(
      "<p id=\"competing-interests\"><b>Competing Interests:</b> None \
       declared.</p>"
    ));
    assert!(!markup.contains("id=\"funding\""));
    assert!(markup.contains(
      "<p class=\"correspondence\" id=\"cor1\">* E-mail: <a \
       href=\"mailto:jane@example.org\">jane@example.org</a></p>"
    ));
  }
}
