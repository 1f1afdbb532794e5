//! General structural rewrite passes.
//!
//! These run after the structure-changing handlers and only translate source
//! elements into their XHTML equivalents. Every rule matches source tag names
//! only, so running the passes over already rewritten output changes nothing.
//!
//! - [`Rewriter`]: the full set of rules for one output document
//! - [`inline_formatting`]: the context-free emphasis rules, also used by the
//!   citation formatter
//! - [`headings`]: heading-level assignment, run last
mod headings;
mod paragraphs;

pub use headings::{MAX_HEADING_LEVEL, assign_headings};
pub use paragraphs::split_paragraph;

use crate::{
  context::Context,
  error::Issue,
  tree::{Element, Node, map_elements, normalize_whitespace, walk_mut},
};

/// Applies the general rewrite rules to one output document.
///
/// Holds the per-document counter used for synthetic section ids, so one
/// instance must be used for every part of a document.
#[derive(Debug)]
pub struct Rewriter {
  next_section: usize,
}

impl Default for Rewriter {
  fn default() -> Self {
    Self::new()
  }
}

impl Rewriter {
  #[must_use]
  pub const fn new() -> Self {
    Self { next_section: 1 }
  }

  /// Rewrite a node list with every general rule.
  pub fn rewrite(&mut self, mut nodes: Vec<Node>, ctx: &mut Context<'_>) -> Vec<Node> {
    walk_mut(&mut nodes, &mut |element| {
      if element.is("sec") && element.id().is_none() {
        element.set_attr("id", format!("OA-EPUB-{}", self.next_section));
        self.next_section += 1;
      }
    });

    map_elements(nodes, &mut |element| rewrite_element(element, ctx))
  }
}

/// Translate the emphasis-like elements in `nodes`. Needs no context.
#[must_use]
pub fn inline_formatting(nodes: Vec<Node>) -> Vec<Node> {
  map_elements(nodes, &mut |element| {
    vec![inline_element(element).unwrap_or_else(|element| element.into())]
  })
}

/// Hyperlink for an `ext-link` or `uri` element, keeping its content.
#[must_use]
pub fn ext_link_anchor(link: Element) -> Element {
  let href = link
    .attr("xlink:href")
    .map(str::to_string)
    .unwrap_or_else(|| normalize_whitespace(&link.text_content()));
  let mut anchor = Element::new("a").with_attr("href", href);
  if let Some(id) = link.id() {
    anchor.set_attr("id", id);
  }
  anchor.with_children(link.children)
}

fn styled_span(element: Element, class: &str) -> Element {
  let mut span = Element::new("span").with_attr("class", class);
  if let Some(id) = element.id() {
    span.set_attr("id", id);
  }
  span.with_children(element.children)
}

/// The emphasis rules. Returns the element unchanged in `Err` when no rule
/// matches.
fn inline_element(mut element: Element) -> Result<Node, Element> {
  let node = match element.name.as_str() {
    "bold" => element.renamed("b").into(),
    "italic" => element.renamed("i").into(),
    "monospace" => styled_span(element, "monospace").into(),
    "underline" => styled_span(element, "underline").into(),
    "sc" => styled_span(element, "small-caps").into(),
    "sub" | "sup" if element.attrs.contains("arrange") => {
      if let Some(arrange) = element.remove_attr("arrange") {
        element.set_attr("class", arrange);
      }
      element.into()
    },
    "named-content" => {
      let class = element
        .attr("content-type")
        .unwrap_or("named-content")
        .to_string();
      styled_span(element, &class).into()
    },
    "break" => Element::new("br").into(),
    _ => return Err(element),
  };
  Ok(node)
}

fn rewrite_element(element: Element, ctx: &mut Context<'_>) -> Vec<Node> {
  let element = match inline_element(element) {
    Ok(node) => return vec![node],
    Err(element) => element,
  };

  match element.name.as_str() {
    "sec" => vec![element.renamed("div").into()],
    "p" => split_paragraph(element),
    "list" => list(element, ctx),
    "list-item" => vec![element.renamed("li").into()],
    "def-list" => def_list(element),
    "def-item" => element.children,
    "term" => vec![element.renamed("dt").into()],
    "def" => vec![element.renamed("dd").into()],
    "disp-quote" => vec![disp_quote(element).into()],
    "fn" => vec![footnote(element).into()],
    "email" => {
      let address = normalize_whitespace(&element.text_content());
      vec![
        Element::new("a")
          .with_attr("href", format!("mailto:{address}"))
          .with_children(element.children)
          .into(),
      ]
    },
    "ext-link" => {
      check_ext_link(&element, ctx);
      vec![ext_link_anchor(element).into()]
    },
    "uri" => vec![ext_link_anchor(element).into()],
    "xref" => {
      let ref_type = element.attr("ref-type").unwrap_or_default();
      let target = element.attr("rid").unwrap_or_default();
      let href = ctx.reference_href(ref_type, target);
      vec![
        Element::new("a")
          .with_attr("href", href)
          .with_children(element.children)
          .into(),
      ]
    },
    _ => vec![element.into()],
  }
}

fn check_ext_link(link: &Element, ctx: &mut Context<'_>) {
  if let Some(kind) = link.attr("ext-link-type").filter(|kind| *kind != "uri") {
    ctx.report(Issue::unrecognized("ext-link-type", kind, "plain hyperlink"));
  }
  if let Some(kind) = link.attr("xlink:type").filter(|kind| *kind != "simple") {
    ctx.report(Issue::unrecognized("xlink:type", kind, "plain hyperlink"));
  }
}

/// Whether a `list-type` renders as an ordered list. `None` for values
/// outside the known set.
fn is_ordered(list_type: &str) -> Option<bool> {
  match list_type {
    "order" => Some(true),
    "" | "bullet" | "simple" => Some(false),
    other if other.starts_with("alpha-") || other.starts_with("roman-") => {
      Some(true)
    },
    _ => None,
  }
}

fn list(mut element: Element, ctx: &mut Context<'_>) -> Vec<Node> {
  let list_type = element.remove_attr("list-type").unwrap_or_default();
  let ordered = is_ordered(&list_type).unwrap_or_else(|| {
    ctx.report(Issue::unrecognized("list-type", &list_type, "unordered list"));
    false
  });

  let title = element
    .take_child("title")
    .filter(Element::has_content)
    .map(|title| {
      Element::new("p")
        .with_attr("class", "list-title")
        .with_child(Element::new("b").with_children(title.children))
    });

  let mut list = element.renamed(if ordered { "ol" } else { "ul" });
  if ordered && list_type != "order" {
    list.set_attr("class", list_type);
  }
  list.attrs.retain(|key, _| matches!(key, "id" | "class"));

  title
    .into_iter()
    .map(Node::from)
    .chain(std::iter::once(list.into()))
    .collect()
}

/// `def-list` as a `dl`; its items were already unwrapped into `dt`/`dd`
/// pairs.
fn def_list(mut element: Element) -> Vec<Node> {
  let title = element
    .take_child("title")
    .filter(Element::has_content)
    .map(|title| {
      Element::new("p")
        .with_attr("class", "list-title")
        .with_child(Element::new("b").with_children(title.children))
    });

  let mut list = element.renamed("dl");
  list.attrs.retain(|key, _| key == "id");
  list.children.retain(|child| !child.is_blank_text());

  title
    .into_iter()
    .map(Node::from)
    .chain(std::iter::once(list.into()))
    .collect()
}

/// Flatten a quote's paragraphs into one span, separated by line breaks.
fn disp_quote(element: Element) -> Element {
  let mut span = Element::new("span").with_attr("class", "disp-quote");
  if let Some(id) = element.id() {
    span.set_attr("id", id);
  }

  let mut first_paragraph = true;
  for child in element.children {
    match child {
      Node::Element(paragraph) if paragraph.is("p") => {
        if !first_paragraph {
          span.push(Element::new("br"));
        }
        first_paragraph = false;
        span.children.extend(paragraph.children);
      },
      other => span.push(other),
    }
  }
  span
}

/// Footnote span with its paragraphs inlined, separated by a space, and its
/// label in bold.
fn footnote(element: Element) -> Element {
  let mut span = Element::new("span").with_attr("class", "footnote");
  if let Some(id) = element.id() {
    span.set_attr("id", id);
  }

  let mut first_paragraph = true;
  for child in element.children {
    match child {
      Node::Element(paragraph) if paragraph.is("p") => {
        if !first_paragraph {
          span.push_text(" ");
        }
        first_paragraph = false;
        span.children.extend(paragraph.children);
      },
      Node::Element(label) if label.is("label") => {
        span.push(Element::new("b").with_children(label.children));
        span.push_text(" ");
      },
      other => span.push(other),
    }
  }
  span
}
