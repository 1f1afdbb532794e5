//! Owned element tree shared by the article input and the XHTML output.
//!
//! The article is parsed once into an [`Element`] and never mutated; builders
//! clone the subtrees they need and rewrite the clones with
//! [`map_elements`], which rebuilds a node list bottom-up instead of renaming
//! tags in place.
use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\s+").unwrap_or_else(|e| {
    log::error!("Failed to compile WHITESPACE regex: {e}");
    never_matching_regex()
  })
});

#[allow(clippy::expect_used, reason = "Pattern is a constant")]
fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").expect("Failed to compile never-matching regex")
}

/// Collapse runs of whitespace into single spaces and trim the ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
  WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// A node of the tree: an element or a run of character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Element(Element),
  Text(String),
}

impl Node {
  pub fn text(text: impl Into<String>) -> Self {
    Self::Text(text.into())
  }

  #[must_use]
  pub const fn as_element(&self) -> Option<&Element> {
    match self {
      Self::Element(element) => Some(element),
      Self::Text(_) => None,
    }
  }

  pub const fn as_element_mut(&mut self) -> Option<&mut Element> {
    match self {
      Self::Element(element) => Some(element),
      Self::Text(_) => None,
    }
  }

  /// Whether this node is an element with the given tag name.
  #[must_use]
  pub fn is_element(&self, name: &str) -> bool {
    self.as_element().is_some_and(|element| element.is(name))
  }

  /// Whether this node is a text node holding only whitespace.
  #[must_use]
  pub fn is_blank_text(&self) -> bool {
    matches!(self, Self::Text(text) if text.trim().is_empty())
  }

  /// Concatenated character data of this node and its descendants.
  #[must_use]
  pub fn text_content(&self) -> String {
    match self {
      Self::Element(element) => element.text_content(),
      Self::Text(text) => text.clone(),
    }
  }
}

impl From<Element> for Node {
  fn from(element: Element) -> Self {
    Self::Element(element)
  }
}

impl From<&str> for Node {
  fn from(text: &str) -> Self {
    Self::Text(text.to_string())
  }
}

impl From<String> for Node {
  fn from(text: String) -> Self {
    Self::Text(text)
  }
}

/// Insertion-ordered attribute list.
///
/// Names are kept verbatim, so prefixed names such as `xlink:href` are looked
/// up with their prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
  #[must_use]
  pub const fn new() -> Self {
    Self(Vec::new())
  }

  #[must_use]
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|(key, _)| key == name)
      .map(|(_, value)| value.as_str())
  }

  #[must_use]
  pub fn contains(&self, name: &str) -> bool {
    self.0.iter().any(|(key, _)| key == name)
  }

  /// Set an attribute, replacing the value in place if it already exists.
  pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    let value = value.into();
    if let Some(slot) = self.0.iter_mut().find(|(key, _)| *key == name) {
      slot.1 = value;
    } else {
      self.0.push((name, value));
    }
  }

  pub fn remove(&mut self, name: &str) -> Option<String> {
    let index = self.0.iter().position(|(key, _)| key == name)?;
    Some(self.0.remove(index).1)
  }

  pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
    self.0.retain(|(key, value)| keep(key, value));
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
  }

  #[must_use]
  pub const fn len(&self) -> usize {
    self.0.len()
  }

  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// A tagged element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
  pub name:     String,
  pub attrs:    Attributes,
  pub children: Vec<Node>,
}

impl Element {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name:     name.into(),
      attrs:    Attributes::new(),
      children: Vec::new(),
    }
  }

  /// A new element with `name` that takes over this element's attributes
  /// and children.
  #[must_use]
  pub fn renamed(self, name: impl Into<String>) -> Self {
    Self {
      name:     name.into(),
      attrs:    self.attrs,
      children: self.children,
    }
  }

  #[must_use]
  pub fn with_attr(
    mut self,
    name: impl Into<String>,
    value: impl Into<String>,
  ) -> Self {
    self.attrs.set(name, value);
    self
  }

  #[must_use]
  pub fn with_child(mut self, child: impl Into<Node>) -> Self {
    self.children.push(child.into());
    self
  }

  #[must_use]
  pub fn with_text(self, text: impl Into<String>) -> Self {
    self.with_child(Node::Text(text.into()))
  }

  #[must_use]
  pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
    self.children.extend(children);
    self
  }

  pub fn push(&mut self, child: impl Into<Node>) {
    self.children.push(child.into());
  }

  /// Append text, merging it into a trailing text node.
  pub fn push_text(&mut self, text: &str) {
    if let Some(Node::Text(last)) = self.children.last_mut() {
      last.push_str(text);
    } else {
      self.children.push(Node::Text(text.to_string()));
    }
  }

  #[must_use]
  pub fn is(&self, name: &str) -> bool {
    self.name == name
  }

  #[must_use]
  pub fn attr(&self, name: &str) -> Option<&str> {
    self.attrs.get(name)
  }

  /// The `id` attribute, if present and non-empty.
  #[must_use]
  pub fn id(&self) -> Option<&str> {
    self.attr("id").filter(|id| !id.is_empty())
  }

  pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.attrs.set(name, value);
  }

  pub fn remove_attr(&mut self, name: &str) -> Option<String> {
    self.attrs.remove(name)
  }

  /// Direct child elements in document order.
  pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
    self.children.iter().filter_map(Node::as_element)
  }

  /// Direct child elements with the given name.
  pub fn children_named<'a, 'n>(
    &'a self,
    name: &'n str,
  ) -> impl Iterator<Item = &'a Element> + use<'a, 'n> {
    self.child_elements().filter(move |child| child.is(name))
  }

  /// First direct child element with the given name.
  #[must_use]
  pub fn child(&self, name: &str) -> Option<&Self> {
    self.child_elements().find(|child| child.is(name))
  }

  /// Text of the first direct child with the given name, whitespace
  /// normalized. Empty text counts as absent.
  #[must_use]
  pub fn child_text(&self, name: &str) -> Option<String> {
    self
      .child(name)
      .map(|child| normalize_whitespace(&child.text_content()))
      .filter(|text| !text.is_empty())
  }

  /// Remove and return the first direct child element with the given name.
  pub fn take_child(&mut self, name: &str) -> Option<Self> {
    let index = self.children.iter().position(|node| node.is_element(name))?;
    match self.children.remove(index) {
      Node::Element(element) => Some(element),
      Node::Text(_) => None,
    }
  }

  /// All descendant elements in pre-order, excluding `self`.
  #[must_use]
  pub fn descendants(&self) -> Descendants<'_> {
    Descendants {
      stack: self.children.iter().rev().collect(),
    }
  }

  /// First descendant element with the given name.
  #[must_use]
  pub fn find(&self, name: &str) -> Option<&Self> {
    self.descendants().find(|element| element.is(name))
  }

  /// All descendant elements with the given name, in document order.
  #[must_use]
  pub fn find_all(&self, name: &str) -> Vec<&Self> {
    self
      .descendants()
      .filter(|element| element.is(name))
      .collect()
  }

  /// Follow a path of direct child names, e.g. `["front", "article-meta"]`.
  #[must_use]
  pub fn path(&self, names: &[&str]) -> Option<&Self> {
    names
      .iter()
      .try_fold(self, |element, name| element.child(name))
  }

  /// Concatenated character data of all descendants.
  #[must_use]
  pub fn text_content(&self) -> String {
    let mut text = String::new();
    collect_text(&self.children, &mut text);
    text
  }

  /// Whether the element holds any child element or non-blank text.
  #[must_use]
  pub fn has_content(&self) -> bool {
    self.children.iter().any(|child| !child.is_blank_text())
  }
}

fn collect_text(nodes: &[Node], out: &mut String) {
  for node in nodes {
    match node {
      Node::Element(element) => collect_text(&element.children, out),
      Node::Text(text) => out.push_str(text),
    }
  }
}

/// Pre-order iterator over descendant elements.
pub struct Descendants<'a> {
  stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
  type Item = &'a Element;

  fn next(&mut self) -> Option<Self::Item> {
    while let Some(node) = self.stack.pop() {
      if let Node::Element(element) = node {
        self.stack.extend(element.children.iter().rev());
        return Some(element);
      }
    }
    None
  }
}

/// Rebuild a node list bottom-up.
///
/// Every element's children are mapped first, then `f` receives the element
/// and returns the nodes that take its place: itself, a replacement, several
/// nodes, or nothing. Text nodes are kept as they are.
pub fn map_elements<F>(nodes: Vec<Node>, f: &mut F) -> Vec<Node>
where
  F: FnMut(Element) -> Vec<Node>,
{
  let mut out = Vec::with_capacity(nodes.len());
  for node in nodes {
    match node {
      Node::Element(mut element) => {
        element.children =
          map_elements(std::mem::take(&mut element.children), f);
        out.extend(f(element));
      },
      text @ Node::Text(_) => out.push(text),
    }
  }
  out
}

/// Visit every element in pre-order with mutable access.
pub fn walk_mut<F>(nodes: &mut [Node], f: &mut F)
where
  F: FnMut(&mut Element),
{
  for node in nodes {
    if let Node::Element(element) = node {
      f(element);
      walk_mut(&mut element.children, f);
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  fn sample() -> Element {
    Element::new("sec")
      .with_attr("id", "s1")
      .with_child(Element::new("title").with_text("Intro"))
      .with_child(
        Element::new("p")
          .with_text("Some ")
          .with_child(Element::new("bold").with_text("bold"))
          .with_text(" text."),
      )
  }

  #[test]
  fn test_attributes_keep_insertion_order() {
    let mut attrs = Attributes::new();
    attrs.set("xlink:href", "a.png");
    attrs.set("id", "g1");
    attrs.set("xlink:href", "b.png");

    let collected: Vec<_> = attrs.iter().collect();
    assert_eq!(collected, vec![("xlink:href", "b.png"), ("id", "g1")]);
    assert_eq!(attrs.remove("id"), Some("g1".to_string()));
    assert_eq!(attrs.len(), 1);
  }

  #[test]
  fn test_descendants_are_pre_order() {
    let root = sample();
    let names: Vec<_> = root
      .descendants()
      .map(|element| element.name.as_str())
      .collect();
    assert_eq!(names, vec!["title", "p", "bold"]);
  }

  #[test]
  fn test_child_outlives_the_name_it_was_found_by() {
    let sec = sample();
    let found = {
      let name = String::from("title");
      sec.child(&name)
    };
    assert_eq!(found.map(Element::text_content).as_deref(), Some("Intro"));

    let paragraphs: Vec<&Element> = {
      let name = String::from("p");
      sec.children_named(&name).collect()
    };
    assert_eq!(paragraphs.len(), 1);
  }

  #[test]
  fn test_text_content_and_child_text() {
    let sec = sample();
    assert_eq!(sec.text_content(), "IntroSome bold text.");
    assert_eq!(sec.child_text("title").as_deref(), Some("Intro"));
    assert_eq!(sec.child_text("label"), None);
  }

  #[test]
  fn test_map_elements_is_bottom_up() {
    let mut seen = Vec::new();
    let nodes = map_elements(vec![sample().into()], &mut |element: Element| {
      seen.push(element.name.clone());
      if element.is("bold") {
        vec![element.renamed("b").into()]
      } else {
        vec![element.into()]
      }
    });

    assert_eq!(seen, vec!["title", "bold", "p", "sec"]);
    let sec = nodes[0].as_element().unwrap();
    assert!(sec.find("b").is_some());
    assert!(sec.find("bold").is_none());
  }

  #[test]
  fn test_map_elements_can_unwrap() {
    let nodes = map_elements(vec![sample().into()], &mut |element: Element| {
      if element.is("p") {
        element.children
      } else {
        vec![element.into()]
      }
    });
    let sec = nodes[0].as_element().unwrap();
    assert_eq!(sec.children.len(), 4);
  }

  #[test]
  fn test_take_child_and_path() {
    let mut root = Element::new("article").with_child(
      Element::new("front")
        .with_child(Element::new("article-meta").with_text("meta")),
    );
    assert!(root.path(&["front", "article-meta"]).is_some());
    assert!(root.take_child("front").is_some());
    assert!(root.path(&["front"]).is_none());
  }

  #[test]
  fn test_normalize_whitespace() {
    assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
  }

  #[test]
  fn test_has_content() {
    assert!(!Element::new("title").with_text(" \n ").has_content());
    assert!(Element::new("title").with_text("x").has_content());
  }
}
