//! Structure-changing passes.
//!
//! Each handler replaces one family of source elements (figures, tables,
//! equations, back-matter blocks) with finished output blocks. They run
//! before the general [`Rewriter`](crate::rewrite::Rewriter) because they
//! remove and relocate the containers heading assignment later counts.
mod equation;
mod figure;
mod matter;
mod table;

pub use equation::handle_equations;
pub use figure::{FigureParts, handle_figures, wrap_bare_figures};
pub use matter::{
  acknowledgments,
  appendices,
  contributions,
  handle_boxed_text,
  handle_ref_lists,
  handle_supplementary_material,
  render_ref_list,
};
pub use table::{TableParts, handle_tables};

use crate::tree::{Element, Node, normalize_whitespace};

/// Title and paragraphs of a `caption`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caption {
  pub title:      Option<Vec<Node>>,
  pub paragraphs: Vec<Node>,
}

impl Caption {
  fn from_element(caption: Option<&Element>) -> Self {
    let Some(caption) = caption else {
      return Self::default();
    };
    Self {
      title:      caption
        .child("title")
        .filter(|title| title.has_content())
        .map(|title| title.children.clone()),
      paragraphs: caption
        .child_elements()
        .filter(|child| !child.is("title"))
        .cloned()
        .map(Node::from)
        .collect(),
    }
  }
}

/// Inline content of a direct `label` child, if it has any.
fn label_of(element: &Element) -> Option<Vec<Node>> {
  element
    .child("label")
    .filter(|label| label.has_content())
    .map(|label| label.children.clone())
}

fn plain_text(nodes: &[Node]) -> String {
  normalize_whitespace(&nodes.iter().map(Node::text_content).collect::<String>())
}

/// `<b>label</b> <b>title</b>`, either part optional.
fn bold_heading(label: Option<&[Node]>, title: Option<&[Node]>) -> Vec<Node> {
  let mut nodes = Vec::new();
  if let Some(label) = label {
    nodes.push(Element::new("b").with_children(label.to_vec()).into());
  }
  if let Some(title) = title {
    if !nodes.is_empty() {
      nodes.push(Node::text(" "));
    }
    nodes.push(Element::new("b").with_children(title.to_vec()).into());
  }
  nodes
}

fn image(src: String, alt: &str) -> Element {
  Element::new("img").with_attr("src", src).with_attr("alt", alt)
}

/// Whether a direct child is one of the link elements figures and
/// supplementary material carry alongside their caption.
fn is_link(element: &Element) -> bool {
  matches!(element.name.as_str(), "email" | "ext-link" | "uri")
}
