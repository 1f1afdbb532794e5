//! Heading levels from section nesting depth.
use crate::tree::{Element, Node};

/// Deepest heading level emitted. Sections nested deeper share it.
pub const MAX_HEADING_LEVEL: usize = 6;

/// Turn the `title` of every `div` into a heading whose level is
/// `2 + depth`, where `depth` counts the titled `div`s enclosing it.
///
/// Empty titles are removed. A `div` without a title does not add a level.
/// Must run after every pass that adds or removes containers.
pub fn assign_headings(nodes: &mut [Node], depth: usize) {
  for node in nodes {
    let Node::Element(element) = node else {
      continue;
    };
    if element.is("div") {
      let nested = if title_to_heading(element, depth) {
        depth + 1
      } else {
        depth
      };
      assign_headings(&mut element.children, nested);
    } else {
      assign_headings(&mut element.children, depth);
    }
  }
}

/// Convert or drop the direct `title` child. Returns whether one was found.
fn title_to_heading(element: &mut Element, depth: usize) -> bool {
  let Some(index) = element
    .children
    .iter()
    .position(|child| child.is_element("title"))
  else {
    return false;
  };

  let Node::Element(title) = element.children.remove(index) else {
    return false;
  };
  if title.has_content() {
    let level = (2 + depth).min(MAX_HEADING_LEVEL);
    element
      .children
      .insert(index, title.renamed(format!("h{level}")).into());
  } else {
    log::trace!("Dropping empty section title at depth {depth}");
  }
  true
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  fn section(title: &str, children: Vec<Node>) -> Node {
    Element::new("div")
      .with_child(Element::new("title").with_text(title))
      .with_children(children)
      .into()
  }

  fn heading_names(nodes: &[Node]) -> Vec<String> {
    let mut names = Vec::new();
    for node in nodes {
      if let Node::Element(element) = node {
        for descendant in std::iter::once(element).chain(element.descendants()) {
          if descendant.name.starts_with('h') {
            names.push(format!("{}:{}", descendant.name, descendant.text_content()));
          }
        }
      }
    }
    names
  }

  #[test]
  fn test_levels_follow_depth() {
    let mut nodes = vec![section("A", vec![section("B", vec![section(
      "C",
      vec![],
    )])])];
    assign_headings(&mut nodes, 0);
    assert_eq!(heading_names(&nodes), vec!["h2:A", "h3:B", "h4:C"]);
  }

  #[test]
  fn test_empty_titles_are_removed_at_every_depth() {
    let mut nodes = vec![section("", vec![section(" ", vec![section(
      "", vec![],
    )])])];
    assign_headings(&mut nodes, 0);
    assert!(heading_names(&nodes).is_empty());
    let outer = nodes[0].as_element().unwrap();
    assert!(outer.find("title").is_none());
  }

  #[test]
  fn test_untitled_div_keeps_depth() {
    let mut nodes = vec![section("A", vec![
      Element::new("div")
        .with_child(Element::new("p").with_text("x"))
        .with_child(section("B", vec![]))
        .into(),
    ])];
    assign_headings(&mut nodes, 0);
    assert_eq!(heading_names(&nodes), vec!["h2:A", "h3:B"]);
  }

  #[test]
  fn test_deep_nesting_is_clamped() {
    let mut nodes = vec![section("7", vec![])];
    for level in (1..=6).rev() {
      nodes = vec![section(&level.to_string(), nodes)];
    }
    assign_headings(&mut nodes, 0);
    let names = heading_names(&nodes);
    assert_eq!(names.last().unwrap(), "h6:7");
    assert_eq!(names[4], "h6:5");
  }

  #[test]
  fn test_depth_offset() {
    let mut nodes = vec![section("Summary section", vec![])];
    assign_headings(&mut nodes, 1);
    assert_eq!(heading_names(&nodes), vec!["h3:Summary section"]);
  }
}
