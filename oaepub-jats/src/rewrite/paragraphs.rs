//! Lifting block content out of paragraphs.
use crate::tree::{Element, Node};

/// Elements that may not sit inside a paragraph.
const BLOCK_ELEMENTS: &[&str] =
  &["div", "dl", "list", "ol", "p", "table", "ul"];

/// Split a paragraph around its block-level children.
///
/// The inline runs between blocks become paragraphs of their own; runs made
/// only of whitespace are dropped. The first emitted paragraph keeps the
/// original attributes, later ones keep all but the `id`.
#[must_use]
pub fn split_paragraph(paragraph: Element) -> Vec<Node> {
  let has_block = paragraph
    .child_elements()
    .any(|child| BLOCK_ELEMENTS.contains(&child.name.as_str()));
  if !has_block {
    return vec![paragraph.into()];
  }

  let mut attrs = paragraph.attrs;
  let mut first_attrs = Some(attrs.clone());
  attrs.remove("id");

  let mut out = Vec::new();
  let mut run: Vec<Node> = Vec::new();
  let mut flush = |run: &mut Vec<Node>, out: &mut Vec<Node>| {
    let inline = std::mem::take(run);
    if inline.iter().all(Node::is_blank_text) {
      return;
    }
    let mut p = Element::new("p").with_children(inline);
    p.attrs = first_attrs.take().unwrap_or_else(|| attrs.clone());
    out.push(p.into());
  };

  for child in paragraph.children {
    let is_block = child
      .as_element()
      .is_some_and(|element| BLOCK_ELEMENTS.contains(&element.name.as_str()));
    if is_block {
      flush(&mut run, &mut out);
      out.push(child);
    } else {
      run.push(child);
    }
  }
  flush(&mut run, &mut out);
  out
}
