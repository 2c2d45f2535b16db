//! Asset providers for templates and static content.
//!
//! # Data Flow
//! ```text
//! ContentConfig { useEmbedded, templatesDirectory, staticDirectory }
//!     → resolve_root() per root
//!         useEmbedded = true  → embedded.rs (include_dir bundle subdirectory)
//!         useEmbedded = false → directory.rs (filesystem directory)
//!     → Arc<dyn AssetSource> handed to the renderer, error pages and static serving
//! ```
//!
//! # Design Decisions
//! - Lookups use relative, `/`-separated paths
//! - Only plain path components are accepted; `..` never escapes a root
//! - Sources are read-only and safe to share between requests

pub mod directory;
pub mod embedded;

use std::borrow::Cow;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use include_dir::Dir;

use crate::config::ConfigError;

pub use directory::DirectoryAssets;
pub use embedded::EmbeddedAssets;

/// A hierarchical, read-only file store.
pub trait AssetSource: Send + Sync + fmt::Debug {
    /// Returns true if `path` names a regular file in this store.
    fn exists(&self, path: &str) -> bool;

    /// Read the bytes of the file at `path`.
    fn read(&self, path: &str) -> io::Result<Cow<'static, [u8]>>;

    /// Read the file at `path` as UTF-8 text.
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes.into_owned())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Strong entity tag of the file at `path`, for stores whose content never changes.
    fn etag(&self, _path: &str) -> Option<&str> {
        None
    }

    /// Filesystem directory backing this store, if any.
    fn local_root(&self) -> Option<&Path> {
        None
    }
}

/// Pick the embedded or filesystem root for one content directory.
pub fn resolve_root(
    use_embedded: bool,
    bundle: Option<&'static Dir<'static>>,
    directory: &str,
) -> Result<Arc<dyn AssetSource>, ConfigError> {
    if use_embedded {
        let bundle = bundle.ok_or(ConfigError::MissingBundle)?;
        let assets = EmbeddedAssets::subdirectory(bundle, directory)
            .ok_or_else(|| ConfigError::MissingBundleDirectory(directory.to_string()))?;
        Ok(Arc::new(assets))
    } else {
        Ok(Arc::new(DirectoryAssets::new(directory)))
    }
}

/// Convert a request-style path into a relative path made of plain components.
pub(crate) fn relative_path(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(relative)
}

pub(crate) fn not_found(path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("asset `{}` not found", path),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use include_dir::include_dir;

    static FIXTURES: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/tests/fixtures");

    #[test]
    fn test_relative_path_rejects_traversal() {
        assert!(relative_path("../Cargo.toml").is_none());
        assert!(relative_path("css/../../secret").is_none());
        assert_eq!(
            relative_path("/css/./site.css"),
            Some(PathBuf::from("css/site.css"))
        );
    }

    #[test]
    fn test_resolve_embedded_root() {
        let root = resolve_root(true, Some(&FIXTURES), "static").unwrap();
        assert!(root.exists("robots.txt"));
        assert!(root.local_root().is_none());
    }

    #[test]
    fn test_resolve_embedded_requires_bundle() {
        assert!(matches!(
            resolve_root(true, None, "static"),
            Err(ConfigError::MissingBundle)
        ));
        assert!(matches!(
            resolve_root(true, Some(&FIXTURES), "nowhere"),
            Err(ConfigError::MissingBundleDirectory(_))
        ));
    }

    #[test]
    fn test_resolve_directory_root() {
        let root = resolve_root(false, None, "tests/fixtures/static").unwrap();
        assert!(root.exists("robots.txt"));
        assert_eq!(
            root.local_root(),
            Some(Path::new("tests/fixtures/static"))
        );
    }
}
