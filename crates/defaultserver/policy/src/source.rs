//! Policy document sources.

use crate::config::PolicyConfig;
use crate::{ConfigError, ConfigResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{error, info};

/// File name of the policy document inside the data directory.
pub const POLICY_FILE_NAME: &str = "config.yml";

/// Default document written when no policy file exists yet.
pub const BUNDLED_DEFAULT: &str = include_str!("../resources/config.yml");

/// Something a [`PolicyConfig`] can be loaded from.
pub trait PolicySource: Send + Sync {
    /// Read and parse the current document.
    fn load(&self) -> ConfigResult<PolicyConfig>;

    /// Label used in logs and snapshot origins.
    fn describe(&self) -> String;
}

/// Policy document on disk, materialized from a bundled default when absent.
#[derive(Debug, Clone)]
pub struct FilePolicySource {
    path: PathBuf,
    default_document: Option<&'static str>,
}

impl FilePolicySource {
    /// File source seeded with [`BUNDLED_DEFAULT`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_document: Some(BUNDLED_DEFAULT),
        }
    }

    /// [`POLICY_FILE_NAME`] inside `data_dir`.
    pub fn in_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(POLICY_FILE_NAME))
    }

    /// File source that never writes a default.
    pub fn without_default(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_document: None,
        }
    }

    pub fn with_default_document(mut self, document: &'static str) -> Self {
        self.default_document = Some(document);
        self
    }

    /// Write the default document if the file does not exist yet.
    ///
    /// Returns `true` when a file was created. An existing file is never
    /// overwritten. The document is written to a temporary file next to the
    /// target and linked into place only once complete.
    pub fn ensure_materialized(&self) -> ConfigResult<bool> {
        let Some(document) = self.default_document else {
            return Ok(false);
        };
        if self.path.exists() {
            return Ok(false);
        }

        let materialize_err = |e: std::io::Error| ConfigError::Materialize {
            path: self.path.clone(),
            message: e.to_string(),
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(materialize_err)?;

        let mut staged = NamedTempFile::new_in(parent).map_err(materialize_err)?;
        staged
            .write_all(document.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(materialize_err)?;

        match staged.persist_noclobber(&self.path) {
            Ok(_) => {}
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(materialize_err(e.error)),
        }

        info!(path = %self.path.display(), "created default policy file");
        Ok(true)
    }
}

impl PolicySource for FilePolicySource {
    fn load(&self) -> ConfigResult<PolicyConfig> {
        if let Err(e) = self.ensure_materialized() {
            error!(error = %e, "could not create default policy file");
        }

        let text = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        PolicyConfig::from_yaml_str(&text, &self.describe())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Policy document held in memory.
#[derive(Debug, Clone)]
pub struct InlinePolicySource {
    document: String,
}

impl InlinePolicySource {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl PolicySource for InlinePolicySource {
    fn load(&self) -> ConfigResult<PolicyConfig> {
        PolicyConfig::from_yaml_str(&self.document, "inline")
    }

    fn describe(&self) -> String {
        "inline".to_string()
    }
}
