pub mod config;
pub mod error;
pub mod media;

pub use config::{Config, ConfigOverlay, MediaOverlay};
pub use error::ConfigError;
pub use media::MediaConfig;
