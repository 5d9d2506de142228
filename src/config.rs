use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::post::Language;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub store: StoreConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    pub default_language: Language,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON document of the form `{ "posts": [...] }`.
    pub posts_path: PathBuf,
    /// JSON array of posts published locally.
    pub saved_posts_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            posts_path: PathBuf::from("data/posts.json"),
            saved_posts_path: PathBuf::from("data/blog-posts.json"),
        }
    }
}

/// Placeholder gate for the publish form.
///
/// A shared code compared in plain text is not access control. It only keeps
/// the publish form out of casual reach.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub code: String,
}

impl AdminConfig {
    pub const DEFAULT_CODE: &'static str = "change-me";

    pub fn is_default_code(&self) -> bool {
        self.code == Self::DEFAULT_CODE
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            code: Self::DEFAULT_CODE.to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|source| Error::Config {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::compiled_default())
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// The bundled default config. Its syntax is checked by the build script.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }
}
