//! Reading article XML into a [`tree`](crate::tree) and writing trees back out
//! as XHTML markup.
use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use quick_xml::{
  Reader,
  escape::unescape,
  events::{BytesStart, Event},
};

use crate::{
  error::TransformError,
  tree::{Element, Node},
};

/// Elements written as `<name/>` when they have no children.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "link", "meta"];

/// Elements followed by a line break when serialized, to keep the output
/// readable without changing inline whitespace.
const BLOCK_ELEMENTS: &[&str] = &[
  "body", "div", "dl", "h1", "h2", "h3", "h4", "h5", "h6", "head", "html",
  "li", "link", "meta", "ol", "p", "table", "tbody", "thead", "title", "tr",
  "ul",
];

/// Parse an XML document into its root element.
///
/// Character and predefined entity references are resolved, CDATA sections
/// become text, and comments, processing instructions and the DOCTYPE are
/// dropped. Whitespace is preserved since article content is mixed.
///
/// # Errors
///
/// Returns [`TransformError::Xml`] for syntax errors reported by the reader
/// (including mismatched end tags) and [`TransformError::Malformed`] when the
/// document has no root element or ends with unclosed elements.
pub fn parse_document(input: &str) -> Result<Element, TransformError> {
  let mut reader = Reader::from_str(input);
  let mut stack: Vec<Element> = Vec::new();
  let mut root: Option<Element> = None;

  loop {
    match reader.read_event()? {
      Event::Start(e) => stack.push(element_from_start(&e)),
      Event::Empty(e) => {
        attach(&mut stack, &mut root, element_from_start(&e))?;
      },
      Event::End(e) => {
        let element = stack.pop().ok_or_else(|| {
          TransformError::Malformed(format!(
            "unexpected closing tag </{}>",
            String::from_utf8_lossy(e.name().as_ref())
          ))
        })?;
        attach(&mut stack, &mut root, element)?;
      },
      Event::Text(e) => {
        if let Some(parent) = stack.last_mut() {
          parent.push_text(&String::from_utf8_lossy(e.as_ref()));
        }
      },
      Event::CData(e) => {
        if let Some(parent) = stack.last_mut() {
          parent.push_text(&String::from_utf8_lossy(&e.into_inner()));
        }
      },
      Event::GeneralRef(e) => {
        let entity = String::from_utf8_lossy(e.as_ref());
        match resolve_entity(&entity) {
          Some(resolved) => {
            if let Some(parent) = stack.last_mut() {
              parent.push_text(&resolved);
            }
          },
          None => log::warn!("Dropping unknown entity reference &{entity};"),
        }
      },
      Event::Eof => break,
      _ => {},
    }
  }

  if let Some(open) = stack.last() {
    return Err(TransformError::Malformed(format!(
      "unclosed element <{}>",
      open.name
    )));
  }

  root.ok_or_else(|| {
    TransformError::Malformed("document has no root element".to_string())
  })
}

fn attach(
  stack: &mut [Element],
  root: &mut Option<Element>,
  element: Element,
) -> Result<(), TransformError> {
  if let Some(parent) = stack.last_mut() {
    parent.push(element);
    Ok(())
  } else if root.is_some() {
    Err(TransformError::Malformed(format!(
      "second root element <{}>",
      element.name
    )))
  } else {
    *root = Some(element);
    Ok(())
  }
}

fn element_from_start(start: &BytesStart<'_>) -> Element {
  let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
  for attr in start.attributes().flatten() {
    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
    let raw = String::from_utf8_lossy(&attr.value);
    let value = unescape(&raw).map_or_else(|_| raw.to_string(), |v| v.into_owned());
    element.set_attr(key, value);
  }
  element
}

fn resolve_entity(entity: &str) -> Option<String> {
  match entity {
    "apos" => return Some("'".to_string()),
    "quot" => return Some("\"".to_string()),
    "lt" => return Some("<".to_string()),
    "gt" => return Some(">".to_string()),
    "amp" => return Some("&".to_string()),
    "nbsp" => return Some("\u{a0}".to_string()),
    _ => {},
  }

  let code = if let Some(hex) = entity
    .strip_prefix("#x")
    .or_else(|| entity.strip_prefix("#X"))
  {
    u32::from_str_radix(hex, 16).ok()?
  } else {
    entity.strip_prefix('#')?.parse::<u32>().ok()?
  };
  char::from_u32(code).map(|c| c.to_string())
}

/// Serialize an element and its subtree as XHTML markup.
#[must_use]
pub fn to_markup(element: &Element) -> String {
  let mut out = String::new();
  write_element(&mut out, element);
  out
}

/// Serialize a list of sibling nodes.
#[must_use]
pub fn nodes_to_markup(nodes: &[Node]) -> String {
  let mut out = String::new();
  for node in nodes {
    write_node(&mut out, node);
  }
  out
}

fn write_node(out: &mut String, node: &Node) {
  match node {
    Node::Element(element) => write_element(out, element),
    Node::Text(text) => out.push_str(&encode_text(text)),
  }
}

fn write_element(out: &mut String, element: &Element) {
  out.push('<');
  out.push_str(&element.name);
  for (key, value) in element.attrs.iter() {
    let _ = write!(out, " {key}=\"{}\"", encode_double_quoted_attribute(value));
  }

  if element.children.is_empty() && VOID_ELEMENTS.contains(&element.name.as_str())
  {
    out.push_str("/>");
  } else {
    out.push('>');
    for child in &element.children {
      write_node(out, child);
    }
    let _ = write!(out, "</{}>", element.name);
  }

  if BLOCK_ELEMENTS.contains(&element.name.as_str()) {
    out.push('\n');
  }
}
