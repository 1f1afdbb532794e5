//! Figures become an image followed by a caption block.
use super::{Caption, bold_heading, image, is_link, label_of, plain_text};
use crate::{
  context::Context,
  error::Issue,
  media::logical_id,
  tree::{Element, Node, map_elements, normalize_whitespace},
};

/// The recognized parts of a `fig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureParts {
  pub id:           Option<String>,
  pub label:        Option<Vec<Node>>,
  pub caption:      Caption,
  pub alt_text:     Option<String>,
  /// Kept as the image title.
  pub long_desc:    Option<String>,
  pub graphic_href: Option<String>,
  /// `email`, `ext-link` and `uri` children.
  pub links:        Vec<Element>,
}

impl FigureParts {
  #[must_use]
  pub fn from_element(fig: &Element) -> Self {
    let text_of = |name: &str| {
      fig
        .find(name)
        .map(|element| normalize_whitespace(&element.text_content()))
        .filter(|text| !text.is_empty())
    };

    Self {
      id:           fig.id().map(str::to_string),
      label:        label_of(fig),
      caption:      Caption::from_element(fig.child("caption")),
      alt_text:     text_of("alt-text"),
      long_desc:    text_of("long-desc"),
      graphic_href: fig
        .find("graphic")
        .and_then(|graphic| graphic.attr("xlink:href"))
        .map(str::to_string),
      links:        fig
        .child_elements()
        .filter(|child| is_link(child))
        .cloned()
        .collect(),
    }
  }

  /// Asset id: the trailing token of the figure id, or of the graphic href
  /// when the figure has no id.
  #[must_use]
  pub fn logical_id(&self) -> Option<&str> {
    self
      .id
      .as_deref()
      .or(self.graphic_href.as_deref())
      .map(logical_id)
  }

  fn into_nodes(self, ctx: &mut Context<'_>) -> Vec<Node> {
    let src = if let Some(asset) = self.logical_id() {
      ctx.image_source(asset)
    } else {
      ctx.report(Issue::missing("fig", "id or graphic", None));
      ctx.config.missing_image_source.clone()
    };

    let alt = self
      .alt_text
      .clone()
      .or_else(|| self.label.as_deref().map(plain_text))
      .unwrap_or_else(|| "Figure".to_string());
    let mut img = image(src, &alt);
    if let Some(id) = &self.id {
      img.set_attr("id", id);
    }
    if let Some(description) = &self.long_desc {
      img.set_attr("title", description);
    }

    let mut nodes = vec![Node::from(img)];

    let heading = bold_heading(self.label.as_deref(), self.caption.title.as_deref());
    if !heading.is_empty() || !self.caption.paragraphs.is_empty() {
      nodes.push(
        Element::new("div")
          .with_attr("class", "figure-caption")
          .with_children(heading)
          .with_children(self.caption.paragraphs)
          .into(),
      );
    }

    if !self.links.is_empty() {
      let mut links = Element::new("p").with_attr("class", "figure-links");
      for (index, link) in self.links.into_iter().enumerate() {
        if index > 0 {
          links.push_text(" ");
        }
        links.push(link);
      }
      nodes.push(links.into());
    }

    nodes
  }
}

/// Replace every `fig` with its image and caption, and every `fig-group`
/// with a plain container.
pub fn handle_figures(nodes: Vec<Node>, ctx: &mut Context<'_>) -> Vec<Node> {
  map_elements(nodes, &mut |element| {
    match element.name.as_str() {
      "fig" => FigureParts::from_element(&element).into_nodes(ctx),
      "fig-group" => vec![figure_group(element).into()],
      _ => vec![element.into()],
    }
  })
}

fn figure_group(group: Element) -> Element {
  let caption = Caption::from_element(group.child("caption"));
  let mut container = Element::new("div").with_attr("class", "figure-group");
  if let Some(id) = group.id() {
    container.set_attr("id", id);
  }
  if let Some(title) = &caption.title {
    container.push(Element::new("b").with_children(title.clone()));
  }
  container
    .with_children(caption.paragraphs)
    .with_children(
      group
        .children
        .into_iter()
        .filter(|child| !child.is_element("caption") && !child.is_element("label")),
    )
}

/// Wrap figures that sit directly in the body in their own container.
#[must_use]
pub fn wrap_bare_figures(nodes: Vec<Node>) -> Vec<Node> {
  nodes
    .into_iter()
    .map(|node| {
      match node {
        Node::Element(fig) if fig.is("fig") => {
          Element::new("div")
            .with_attr("class", "figure")
            .with_child(fig)
            .into()
        },
        other => other,
      }
    })
    .collect()
}
