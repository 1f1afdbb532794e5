//! The main document and, as a side product, the tables document.
use crate::{
  article::Article,
  context::Context,
  document::{DocumentRole, OutputDocument},
  handlers::{
    acknowledgments,
    appendices,
    contributions,
    handle_boxed_text,
    handle_equations,
    handle_figures,
    handle_ref_lists,
    handle_supplementary_material,
    handle_tables,
    wrap_bare_figures,
  },
  metadata::ArticleMetadata,
  rewrite::{Rewriter, assign_headings},
  tree::{Element, Node},
};

/// The main and tables documents.
pub(super) struct BodyDocuments {
  pub main:   OutputDocument,
  /// Absent when no table carried structured markup.
  pub tables: Option<OutputDocument>,
}

/// Run the body passes in order: structure-changing handlers, then the
/// general rewrite, then heading levels.
pub(super) fn build(
  article: &Article,
  body: &Element,
  metadata: &ArticleMetadata,
  ctx: &mut Context<'_>,
) -> BodyDocuments {
  let back = article.back();

  let mut nodes = body.children.clone();
  if let Some(back) = back {
    nodes.extend(appendices(back));
  }

  let nodes = wrap_bare_figures(nodes);
  let nodes = handle_figures(nodes, ctx);
  log::trace!("Figures handled for {}", metadata.article_id);

  let mut table_nodes = Vec::new();
  let nodes = handle_tables(nodes, ctx, &mut table_nodes);
  let nodes = handle_equations(nodes, ctx);
  let nodes = handle_ref_lists(nodes, ctx);
  let nodes = handle_boxed_text(nodes);
  let mut nodes = handle_supplementary_material(nodes);

  if let Some(ack) = back.and_then(|back| back.child("ack")) {
    nodes.push(acknowledgments(ack).into());
  }
  if let Some(note) = &metadata.author_notes.contributions {
    nodes.push(contributions(note).into());
  }

  let mut nodes = Rewriter::new().rewrite(nodes, ctx);
  assign_headings(&mut nodes, 0);

  let mut main = OutputDocument::new(DocumentRole::Main);
  main.body = nodes;

  let tables = tables_document(table_nodes, ctx);
  log::debug!(
    "Built main document for {} ({} top-level blocks, tables document: {})",
    metadata.article_id,
    main.body.len(),
    if tables.is_some() { "yes" } else { "no" }
  );

  BodyDocuments { main, tables }
}

fn tables_document(
  nodes: Vec<Node>,
  ctx: &mut Context<'_>,
) -> Option<OutputDocument> {
  if nodes.is_empty() {
    return None;
  }
  let nodes = handle_equations(nodes, ctx);
  let mut document = OutputDocument::new(DocumentRole::Tables);
  document.body = Rewriter::new().rewrite(nodes, ctx);
  (!document.is_empty()).then_some(document)
}
