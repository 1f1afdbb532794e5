//! Tables become an image with a header block in the main document; the
//! structured table moves into the tables document.
use super::{Caption, bold_heading, image, label_of, plain_text};
use crate::{
  context::Context,
  document::DocumentRole,
  error::Issue,
  media::logical_id,
  tree::{Element, Node, map_elements},
};

/// The recognized parts of a `table-wrap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableParts {
  pub id:           Option<String>,
  pub label:        Option<Vec<Node>>,
  pub caption:      Caption,
  pub alt_text:     Option<String>,
  pub graphic_href: Option<String>,
  /// The structured `table`, if the wrap carries one.
  pub table:        Option<Element>,
  pub foot:         Option<Element>,
}

impl TableParts {
  #[must_use]
  pub fn from_element(wrap: &Element) -> Self {
    Self {
      id:           wrap.id().map(str::to_string),
      label:        label_of(wrap),
      caption:      Caption::from_element(wrap.child("caption")),
      alt_text:     wrap
        .find("alt-text")
        .map(|alt| plain_text(&alt.children))
        .filter(|alt| !alt.is_empty()),
      graphic_href: wrap
        .find("graphic")
        .and_then(|graphic| graphic.attr("xlink:href"))
        .map(str::to_string),
      table:        wrap.find("table").cloned(),
      foot:         wrap.child("table-wrap-foot").cloned(),
    }
  }

  #[must_use]
  pub fn logical_id(&self) -> Option<&str> {
    self
      .id
      .as_deref()
      .or(self.graphic_href.as_deref())
      .map(logical_id)
  }

  fn label_text(&self) -> String {
    self
      .label
      .as_deref()
      .map(plain_text)
      .filter(|label| !label.is_empty())
      .unwrap_or_else(|| "Table".to_string())
  }

  fn header(&self) -> Element {
    Element::new("div")
      .with_attr("class", "table-label")
      .with_children(bold_heading(
        self.label.as_deref(),
        self.caption.title.as_deref(),
      ))
  }

  /// Main-document nodes; moves the structured table and its footnotes
  /// into `tables` when there is a table.
  fn into_nodes(
    self,
    ctx: &mut Context<'_>,
    tables: &mut Vec<Node>,
    index: usize,
  ) -> Vec<Node> {
    let asset = self.logical_id().map(str::to_string);
    let name = asset.clone().unwrap_or_else(|| format!("table-{index}"));

    let mut header = self.header();
    if let Some(id) = &self.id {
      header.set_attr("id", id);
    }
    let mut nodes = vec![Node::from(header)];

    let src = if let Some(asset) = &asset {
      ctx.image_source(asset)
    } else {
      ctx.report(Issue::missing("table-wrap", "id or graphic", None));
      ctx.config.missing_image_source.clone()
    };
    let alt = self.alt_text.clone().unwrap_or_else(|| self.label_text());
    nodes.push(image(src, &alt).into());
    nodes.extend(self.caption.paragraphs.iter().cloned());

    let Some(mut table) = self.table.clone() else {
      if let Some(foot) = self.foot {
        nodes.push(footnotes(foot).into());
      }
      return nodes;
    };

    let anchor = format!("h{name}");
    nodes.push(
      Element::new("p")
        .with_child(
          Element::new("a")
            .with_attr("href", ctx.links.link(DocumentRole::Tables, &anchor).href())
            .with_text(format!("HTML version of {}", self.label_text())),
        )
        .into(),
    );

    table.remove_attr("alternate-form-of");
    table.set_attr("id", anchor);
    tables.push(self.header().into());
    tables.push(table.into());
    if let Some(foot) = self.foot {
      tables.push(footnotes(foot).into());
    }
    let back = self.id.as_deref().map_or_else(
      || DocumentRole::Main.file_name(ctx.links.article_id()),
      |id| ctx.links.link(DocumentRole::Main, id).href(),
    );
    tables.push(
      Element::new("p")
        .with_child(
          Element::new("a")
            .with_attr("href", back)
            .with_text("Back to Main Text"),
        )
        .into(),
    );

    nodes
  }
}

/// Replace every `table-wrap`, collecting the structured tables for the
/// tables document into `tables`.
pub fn handle_tables(
  nodes: Vec<Node>,
  ctx: &mut Context<'_>,
  tables: &mut Vec<Node>,
) -> Vec<Node> {
  let mut index = 0;
  map_elements(nodes, &mut |element| {
    if element.is("table-wrap") {
      index += 1;
      TableParts::from_element(&element).into_nodes(ctx, tables, index)
    } else {
      vec![element.into()]
    }
  })
}

/// A `table-wrap-foot` as a footnotes block. Labels and titles become bold
/// paragraphs, attributions plain ones; footnotes keep their ids.
fn footnotes(foot: Element) -> Element {
  let mut block = Element::new("div").with_attr("class", "table-footnotes");
  if let Some(id) = foot.id() {
    block.set_attr("id", id);
  }
  for child in foot.children {
    if let Node::Element(element) = child {
      block.children.extend(footnote_part(element));
    }
  }
  block
}

fn footnote_part(element: Element) -> Vec<Node> {
  match element.name.as_str() {
    "label" | "title" => {
      vec![
        Element::new("p")
          .with_child(Element::new("b").with_children(element.children))
          .into(),
      ]
    },
    "copyright-statement" | "attrib" => {
      vec![element.renamed("p").into()]
    },
    "fn-group" => {
      element
        .children
        .into_iter()
        .filter_map(|child| {
          match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
          }
        })
        .flat_map(footnote_part)
        .collect()
    },
    "fn" => vec![Element::new("p").with_child(element).into()],
    _ => vec![element.into()],
  }
}
