//! Reference lists, boxed text, supplementary material and the back-matter
//! blocks appended to the main document.
use super::{Caption, bold_heading, is_link, label_of, plain_text};
use crate::{
  citation::{ReferenceEntry, format_citation},
  context::Context,
  metadata::Footnote,
  tree::{Element, Node, map_elements},
};

/// One paragraph per `ref` in the list, in document order.
///
/// A reference whose citation type is not recognized is reported and keeps
/// only its label.
pub fn render_ref_list(list: &Element, ctx: &mut Context<'_>) -> Vec<Node> {
  list
    .find_all("ref")
    .into_iter()
    .map(|reference| reference_paragraph(reference, ctx).into())
    .collect()
}

fn reference_paragraph(reference: &Element, ctx: &mut Context<'_>) -> Element {
  let entry = ReferenceEntry::from_ref(reference);
  let mut paragraph = Element::new("p");
  if let Some(id) = &entry.id {
    paragraph.set_attr("id", id);
  }

  match format_citation(&entry, ctx.journal_url.as_deref()) {
    Ok(formatted) => paragraph.with_children(formatted.into_nodes()),
    Err(issue) => {
      ctx.report(issue);
      if let Some(label) = &entry.label {
        paragraph.push_text(&format!("{label}."));
      }
      paragraph
    },
  }
}

/// Replace reference lists inside the body ("further reading" and the like)
/// with a titled container of formatted references.
///
/// Children keep their document order, so a nested list (already converted,
/// since the rewrite is bottom-up) stays in place between the references.
pub fn handle_ref_lists(nodes: Vec<Node>, ctx: &mut Context<'_>) -> Vec<Node> {
  map_elements(nodes, &mut |element| {
    if !element.is("ref-list") {
      return vec![element.into()];
    }
    let mut container = Element::new("div").with_attr("class", "ref-list");
    if let Some(id) = element.id() {
      container.set_attr("id", id);
    }
    for child in element.children {
      match child {
        Node::Element(reference) if reference.is("ref") => {
          container.push(reference_paragraph(&reference, ctx));
        },
        Node::Element(other) => container.push(other),
        Node::Text(_) => {},
      }
    }
    vec![container.into()]
  })
}

/// `boxed-text` becomes a styled container with its label and title as a
/// bold paragraph.
#[must_use]
pub fn handle_boxed_text(nodes: Vec<Node>) -> Vec<Node> {
  map_elements(nodes, &mut |element| {
    if element.is("boxed-text") {
      vec![boxed_text(element).into()]
    } else {
      vec![element.into()]
    }
  })
}

fn boxed_text(boxed: Element) -> Element {
  let caption = Caption::from_element(boxed.child("caption"));
  let title = boxed
    .child("title")
    .filter(|title| title.has_content())
    .map(|title| title.children.clone())
    .or(caption.title);

  let mut container = Element::new("div").with_attr("class", "boxed-text");
  if let Some(id) = boxed.id() {
    container.set_attr("id", id);
  }
  let heading = bold_heading(label_of(&boxed).as_deref(), title.as_deref());
  if !heading.is_empty() {
    container.push(Element::new("p").with_children(heading));
  }
  container
    .with_children(caption.paragraphs)
    .with_children(boxed.children.into_iter().filter(|child| {
      !child.is_element("label")
        && !child.is_element("title")
        && !child.is_element("caption")
    }))
}

/// `supplementary-material` becomes a container with a bold heading, its
/// caption paragraphs and a link to the material itself.
#[must_use]
pub fn handle_supplementary_material(nodes: Vec<Node>) -> Vec<Node> {
  map_elements(nodes, &mut |element| {
    if element.is("supplementary-material") {
      vec![supplementary_material(&element).into()]
    } else {
      vec![element.into()]
    }
  })
}

fn supplementary_material(material: &Element) -> Element {
  let label = label_of(material);
  let caption = Caption::from_element(material.child("caption"));

  let mut container =
    Element::new("div").with_attr("class", "supplementary-material");
  if let Some(id) = material.id() {
    container.set_attr("id", id);
  }
  let heading = bold_heading(label.as_deref(), caption.title.as_deref());
  if !heading.is_empty() {
    container.push(Element::new("p").with_children(heading));
  }
  container.children.extend(caption.paragraphs);

  let mut links = material
    .child_elements()
    .filter(|child| is_link(child))
    .cloned()
    .map(Node::from)
    .collect::<Vec<_>>();
  if let Some(href) = material.attr("xlink:href") {
    let text = label
      .as_deref()
      .map(plain_text)
      .filter(|text| !text.is_empty())
      .unwrap_or_else(|| href.to_string());
    links.insert(
      0,
      Element::new("a")
        .with_attr("href", href)
        .with_text(text)
        .into(),
    );
  }
  if !links.is_empty() {
    container.push(
      Element::new("p")
        .with_attr("class", "supplementary-links")
        .with_children(links),
    );
  }
  container
}

/// The `back/ack` section as a titled container.
#[must_use]
pub fn acknowledgments(ack: &Element) -> Element {
  let mut container = Element::new("div")
    .with_attr("id", ack.id().unwrap_or("ack"))
    .with_attr("class", "acknowledgments");
  if !ack.children_named("title").any(Element::has_content) {
    container.push(Element::new("title").with_text("Acknowledgments"));
  }
  container.with_children(ack.children.iter().cloned())
}

/// The author contribution statement as a titled container.
#[must_use]
pub fn contributions(note: &Footnote) -> Element {
  Element::new("div")
    .with_attr("id", note.id.as_deref().unwrap_or("contributions"))
    .with_attr("class", "contributions")
    .with_child(Element::new("title").with_text("Author Contributions"))
    .with_children(
      note
        .content
        .iter()
        .filter(|child| !child.is_element("label"))
        .cloned(),
    )
}

/// Back-matter appendices as sections, ready to be appended to the body.
#[must_use]
pub fn appendices(back: &Element) -> Vec<Node> {
  back
    .child_elements()
    .filter_map(|child| {
      match child.name.as_str() {
        "app-group" => {
          let group = child.clone().renamed("sec").with_attr("class", "appendices");
          Some(
            Element {
              children: map_apps(group.children),
              ..group
            }
            .into(),
          )
        },
        "app" => Some(appendix(child.clone()).into()),
        _ => None,
      }
    })
    .collect()
}

fn map_apps(children: Vec<Node>) -> Vec<Node> {
  children
    .into_iter()
    .map(|child| {
      match child {
        Node::Element(app) if app.is("app") => appendix(app).into(),
        other => other,
      }
    })
    .collect()
}

fn appendix(app: Element) -> Element {
  app.renamed("sec").with_attr("class", "appendix")
}
