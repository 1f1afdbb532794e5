//! Assembling the output documents of one article.
mod bibliography;
mod body;
mod synopsis;

use std::path::Path;

use oaepub_config::Config;

use crate::{
  article::Article,
  context::Context,
  document::ArticleDocuments,
  error::TransformError,
  media::MediaIndex,
  metadata::ArticleMetadata,
};

/// Transforms articles into their output documents under one
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct ArticleTransform {
  config: Config,
}

impl ArticleTransform {
  #[must_use]
  pub const fn new(config: Config) -> Self {
    Self { config }
  }

  #[must_use]
  pub const fn config(&self) -> &Config {
    &self.config
  }

  /// Transform an article, indexing its image directory first.
  ///
  /// # Arguments
  ///
  /// * `article` - The parsed article.
  /// * `metadata` - Metadata extracted from the same article.
  ///
  /// # Errors
  ///
  /// Returns [`TransformError::MissingElement`] if the article has no
  /// `body`, [`TransformError::Walk`] if the image directory exists but
  /// cannot be read, or [`TransformError::Config`] if the configuration does
  /// not validate. Nothing is produced for the article in any case.
  pub fn transform(
    &self,
    article: &Article,
    metadata: &ArticleMetadata,
  ) -> Result<ArticleDocuments, TransformError> {
    if article.body().is_none() {
      return Err(TransformError::MissingElement("body"));
    }
    let media = MediaIndex::scan(&self.config, &metadata.article_id)?;
    self.transform_with_media(article, metadata, &media)
  }

  /// Transform an article against an already built media index.
  ///
  /// # Errors
  ///
  /// Returns [`TransformError::Config`] if the configuration does not
  /// validate, or [`TransformError::MissingElement`] if the article has no
  /// `body`.
  pub fn transform_with_media(
    &self,
    article: &Article,
    metadata: &ArticleMetadata,
    media: &MediaIndex,
  ) -> Result<ArticleDocuments, TransformError> {
    self.config.validate()?;
    let source_body = article
      .body()
      .ok_or(TransformError::MissingElement("body"))?;

    let mut ctx = Context::new(
      &self.config,
      media,
      &metadata.article_id,
      metadata.journal_title.as_deref(),
    );

    let synopsis = synopsis::build(metadata, &mut ctx);
    let body::BodyDocuments { main, tables } =
      body::build(article, source_body, metadata, &mut ctx);
    let bibliography = bibliography::build(article, &mut ctx);

    let issues = ctx.diagnostics.into_issues();
    if !issues.is_empty() {
      log::info!(
        "Transformed {} with {} recoverable issues",
        metadata.article_id,
        issues.len()
      );
    }

    Ok(ArticleDocuments {
      article_id: metadata.article_id.clone(),
      synopsis,
      main,
      bibliography,
      tables,
      issues,
    })
  }

  /// Read, parse and transform an article file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, lacks the
  /// required front matter, or fails [`transform`](Self::transform).
  pub fn transform_file(
    &self,
    path: impl AsRef<Path>,
  ) -> Result<ArticleDocuments, TransformError> {
    let article = Article::from_file(path)?;
    let metadata = ArticleMetadata::from_article(&article)?;
    self.transform(&article, &metadata)
  }
}
