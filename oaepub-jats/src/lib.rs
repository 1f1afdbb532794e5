//! # oaepub-jats
//!
//! Transforms a JATS (or NLM) tagged scholarly article into the four
//! interlinked XHTML documents of an EPUB: the synopsis, the main text, the
//! bibliography and the HTML versions of the article's tables.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oaepub_jats::{ArticleTransform, Config};
//!
//! let transform = ArticleTransform::new(Config::default());
//! let documents = transform.transform_file("journal.pbio.1002222.xml")?;
//! documents.write_to(&transform.config().output_root, transform.config())?;
//!
//! for issue in &documents.issues {
//!   log::warn!("{issue}");
//! }
//! # Ok::<(), oaepub_jats::TransformError>(())
//! ```
//!
//! ## Pipeline
//!
//! - [`Article`] and [`ArticleMetadata`] read the source tree and its front
//!   matter.
//! - [`MediaIndex`] indexes the article's image directory once.
//! - The [`handlers`] replace figures, tables, formulas and back-matter
//!   blocks; the [`rewrite`] passes then translate the remaining source
//!   elements and assign heading levels.
//! - [`citation`] formats every bibliographic reference.
//! - [`ArticleTransform`] runs the passes for each document and returns
//!   [`ArticleDocuments`], ready to be written.
//!
//! Recoverable problems never stop a transform; they are logged through
//! the `log` facade and collected as [`Issue`]s.
pub mod article;
pub mod builder;
pub mod citation;
pub mod context;
pub mod date;
pub mod document;
pub mod error;
pub mod handlers;
pub mod links;
pub mod media;
pub mod metadata;
pub mod rewrite;
pub mod tree;
pub mod xml;

pub use article::Article;
pub use builder::ArticleTransform;
pub use document::{ArticleDocuments, DocumentRole, OutputDocument};
pub use error::{Diagnostics, Issue, TransformError};
pub use links::{FragmentLink, LinkResolver, ReferenceType};
pub use media::{Asset, MediaIndex};
pub use metadata::ArticleMetadata;
pub use oaepub_config::Config;
