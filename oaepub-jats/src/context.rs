//! Per-article state shared by the handlers and builders.
use oaepub_config::Config;

use crate::{
  error::{Diagnostics, Issue},
  links::LinkResolver,
  media::{Asset, MediaIndex},
};

/// What every pass may consult while one article is transformed: the
/// configuration, the media index, the link resolver and the issue sink.
#[derive(Debug)]
pub struct Context<'a> {
  pub config:      &'a Config,
  pub media:       &'a MediaIndex,
  pub links:       LinkResolver,
  pub diagnostics: Diagnostics,
  /// Base URL of the article's journal, for "Find This Article Online"
  /// links.
  pub journal_url: Option<String>,
}

impl<'a> Context<'a> {
  pub fn new(
    config: &'a Config,
    media: &'a MediaIndex,
    article_id: &str,
    journal_title: Option<&str>,
  ) -> Self {
    Self {
      config,
      media,
      links: LinkResolver::new(article_id),
      diagnostics: Diagnostics::new(),
      journal_url: journal_title
        .and_then(|title| config.journal_url(title))
        .map(str::to_string),
    }
  }

  pub fn report(&mut self, issue: Issue) {
    self.diagnostics.report(issue);
  }

  /// Image source for a logical id, or the configured placeholder when no
  /// asset matches.
  pub fn image_source(&mut self, logical_id: &str) -> String {
    match self.media.resolve(logical_id) {
      Asset::Found(path) => path,
      Asset::NotFound { logical_id } => {
        self.report(Issue::AssetNotFound { logical_id });
        self.config.missing_image_source.clone()
      },
    }
  }

  /// `href` for a cross-reference, falling back to the main document for
  /// unmapped reference types.
  pub fn reference_href(&mut self, ref_type: &str, target: &str) -> String {
    self
      .links
      .resolve_or_main(ref_type, target, &mut self.diagnostics)
      .href()
  }
}
