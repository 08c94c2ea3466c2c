//! Shared start-up for the `folio-indexer` and `folio-chat` binaries.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use folio_core::config::{Config, Settings};
use folio_core::traits::Embedder;

/// Log to stderr. `RUST_LOG` wins over the verbosity flag when set.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Configuration with every configured path resolved against the directory
/// the config files were read from.
pub struct Runtime {
    pub config: Config,
    pub settings: Settings,
}

impl Runtime {
    pub fn load() -> Result<Self> {
        let config = Config::load()?;
        let settings = config.settings()?;
        Ok(Self { config, settings })
    }

    pub fn load_from(base: &Path) -> Result<Self> {
        let config = Config::load_from(base)?;
        let settings = config.settings()?;
        Ok(Self { config, settings })
    }

    pub fn content_dir(&self) -> PathBuf { self.config.resolve(&self.settings.data.content_dir) }

    pub fn artifacts_dir(&self) -> PathBuf { self.config.resolve(&self.settings.artifacts.dir) }

    pub fn model_dir(&self) -> Option<PathBuf> {
        self.settings.model.dir.as_ref().map(|d| self.config.resolve(d))
    }

    pub fn embedder(&self) -> Result<Box<dyn Embedder>> {
        folio_embed::get_default_embedder(self.model_dir().as_deref(), self.settings.model.max_len)
    }
}
