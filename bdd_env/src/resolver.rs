//! Document resolution: mapping model URLs onto readable content.

use crate::error::EnvError;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Fetches the text of a model document by URL.
///
/// # Implementations
///
/// - **Local**: `FileResolver` - local paths, `file://` URLs and a mirror
///   directory standing in for remote `http(s)://` documents
pub trait DocumentResolver {
    /// Returns the document content.
    ///
    /// # Returns
    /// * `Ok(text)` - Document content
    /// * `Err(EnvError::UnresolvableDocument)` - Carries the URL and the I/O error
    fn fetch(&self, url: &str) -> Result<String, EnvError>;
}

/// Resolver backed by the local filesystem.
///
/// Remote documents are never fetched over the network: a URL such as
/// `https://host/models/scene.json` is read from
/// `<mirror_dir>/host/models/scene.json`.
#[derive(Debug, Clone, Default)]
pub struct FileResolver {
    /// Root of the local mirror of remote model documents
    mirror_dir: Option<PathBuf>,
}

impl FileResolver {
    /// Creates a resolver that only reads local paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the mirror directory for remote URLs.
    pub fn with_mirror(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mirror_dir = Some(dir.into());
        self
    }

    /// Maps a URL to the local path it is read from.
    pub fn local_path(&self, url: &str) -> Result<PathBuf, EnvError> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }

        let remote = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));
        match remote {
            Some(rest) => {
                let mirror = self.mirror_dir.as_ref().ok_or_else(|| {
                    EnvError::unresolvable(
                        url,
                        std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "no mirror directory configured for remote documents",
                        ),
                    )
                })?;
                let rest = rest.split(['?', '#']).next().unwrap_or(rest);
                let mut path = mirror.clone();
                for component in Path::new(rest).components() {
                    match component {
                        Component::Normal(part) => path.push(part),
                        Component::CurDir | Component::RootDir => {}
                        Component::ParentDir | Component::Prefix(_) => {
                            return Err(EnvError::unresolvable(
                                url,
                                std::io::Error::new(
                                    std::io::ErrorKind::InvalidInput,
                                    "URL path escapes the mirror directory",
                                ),
                            ));
                        }
                    }
                }
                Ok(path)
            }
            None => Ok(PathBuf::from(url)),
        }
    }
}

impl DocumentResolver for FileResolver {
    fn fetch(&self, url: &str) -> Result<String, EnvError> {
        let path = self.local_path(url)?;
        debug!("resolving '{}' from {}", url, path.display());
        std::fs::read_to_string(&path).map_err(|e| EnvError::unresolvable(url, e))
    }
}
