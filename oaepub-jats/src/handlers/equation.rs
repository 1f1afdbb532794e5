//! Formulas are rendered as their raster images.
use super::image;
use crate::{
  context::Context,
  error::Issue,
  media::logical_id,
  tree::{Element, Node, map_elements},
};

/// Replace `inline-formula` and `disp-formula` with images of their
/// graphics. A formula without a graphic href is reported and dropped.
pub fn handle_equations(nodes: Vec<Node>, ctx: &mut Context<'_>) -> Vec<Node> {
  map_elements(nodes, &mut |element| {
    match element.name.as_str() {
      "inline-formula" => {
        inline_formula(&element, ctx)
          .map(Node::from)
          .into_iter()
          .collect()
      },
      "disp-formula" => {
        display_formula(element, ctx)
          .map(Node::from)
          .into_iter()
          .collect()
      },
      _ => vec![element.into()],
    }
  })
}

fn formula_image(
  formula: &Element,
  graphic: &str,
  class: &str,
  ctx: &mut Context<'_>,
) -> Option<Element> {
  let href = formula
    .find(graphic)
    .and_then(|graphic| graphic.attr("xlink:href"))
    .filter(|href| !href.trim().is_empty());
  let Some(href) = href else {
    ctx.report(Issue::missing(&formula.name, graphic, formula.id()));
    return None;
  };
  let src = ctx.image_source(logical_id(href));
  Some(image(src, "equation").with_attr("class", class))
}

fn inline_formula(formula: &Element, ctx: &mut Context<'_>) -> Option<Element> {
  formula_image(formula, "inline-graphic", "inline-formula", ctx)
}

/// `<p class="disp-formula"><img/><b class="equation-label">(1)</b></p>`
fn display_formula(mut formula: Element, ctx: &mut Context<'_>) -> Option<Element> {
  let img = formula_image(&formula, "graphic", "disp-formula", ctx)?;
  let mut paragraph = Element::new("p")
    .with_attr("class", "disp-formula")
    .with_child(img);
  if let Some(id) = formula.id() {
    paragraph.set_attr("id", id);
  }
  if let Some(label) = formula.take_child("label").filter(Element::has_content) {
    paragraph.push(
      Element::new("b")
        .with_attr("class", "equation-label")
        .with_children(label.children),
    );
  }
  Some(paragraph)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use oaepub_config::Config;

  use super::*;
  use crate::{
    media::MediaIndex,
    xml::{nodes_to_markup, parse_document},
  };

  fn run(xml: &str) -> (String, Vec<Issue>) {
    let config = Config::default();
    let mut media = MediaIndex::empty();
    media.insert("e001", "images-journal.pbio.1/equations/e001.png");
    media.insert("e002", "images-journal.pbio.1/equations/e002.png");
    let mut ctx = Context::new(&config, &media, "journal.pbio.1", None);
    let nodes =
      handle_equations(vec![parse_document(xml).unwrap().into()], &mut ctx);
    (nodes_to_markup(&nodes), ctx.diagnostics.into_issues())
  }

  #[test]
  fn test_display_formula() {
    let (markup, issues) = run(
      r#"<p>See<disp-formula id="pbio.1.e001"><graphic xlink:href="info:doi/10.1371/journal.pbio.1.e001"/><label>(1)</label></disp-formula></p>"#,
    );
    assert_eq!(
      markup,
      "<p>See<p class=\"disp-formula\" id=\"pbio.1.e001\"><img \
       src=\"images-journal.pbio.1/equations/e001.png\" alt=\"equation\" \
       class=\"disp-formula\"/><b class=\"equation-label\">(1)</b></p>\n</p>\n"
    );
    assert!(issues.is_empty());
  }

  #[test]
  fn test_inline_formula() {
    let (markup, _) = run(
      r#"<p>x <inline-formula><inline-graphic xlink:href="journal.pbio.1.e002.tif"/></inline-formula> y</p>"#,
    );
    assert_eq!(
      markup,
      "<p>x <img src=\"images-journal.pbio.1/equations/e002.png\" \
       alt=\"equation\" class=\"inline-formula\"/> y</p>\n"
    );
  }

  #[test]
  fn test_missing_graphic_is_dropped() {
    let (markup, issues) = run(
      r#"<p>a<disp-formula id="d1"><label>(2)</label></disp-formula>b</p>"#,
    );
    assert_eq!(markup, "<p>ab</p>\n");
    assert_eq!(issues, vec![Issue::MissingSubstructure {
      element: "disp-formula".to_string(),
      missing: "graphic".to_string(),
      id:      Some("d1".to_string()),
    }]);
  }
}
