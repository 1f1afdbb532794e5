//! The bibliography document.
use crate::{
  article::Article,
  context::Context,
  document::{DocumentRole, OutputDocument},
  handlers::render_ref_list,
  rewrite::inline_formatting,
  tree::Element,
};

/// One heading and one paragraph per reference for every back-matter
/// `ref-list`. `None` when the article has none.
pub(super) fn build(
  article: &Article,
  ctx: &mut Context<'_>,
) -> Option<OutputDocument> {
  let back = article.back()?;
  let mut lists = back.children_named("ref-list").peekable();
  lists.peek()?;

  let mut document = OutputDocument::new(DocumentRole::Bibliography);
  for list in lists {
    let title = list
      .child("title")
      .filter(|title| title.has_content())
      .map_or_else(
        || Element::new("h2").with_text("References"),
        |title| {
          Element::new("h2")
            .with_children(inline_formatting(title.children.clone()))
        },
      );
    document.push(title);
    document.body.extend(render_ref_list(list, ctx));
  }

  log::debug!("Built bibliography with {} blocks", document.body.len());
  Some(document)
}
