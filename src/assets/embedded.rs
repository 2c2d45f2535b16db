//! Assets compiled into the binary with `include_dir`.

use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::Path;
use std::sync::Arc;

use include_dir::Dir;

use super::{not_found, relative_path, AssetSource};

/// A directory of an `include_dir` bundle.
///
/// Entity tags are hashed from the file contents once, when the source is built.
#[derive(Debug, Clone)]
pub struct EmbeddedAssets {
    dir: &'static Dir<'static>,
    etags: Arc<HashMap<&'static Path, String>>,
}

impl EmbeddedAssets {
    /// Serve the whole bundle.
    pub fn new(dir: &'static Dir<'static>) -> Self {
        let mut etags = HashMap::new();
        collect_etags(dir, &mut etags);
        Self {
            dir,
            etags: Arc::new(etags),
        }
    }

    /// Serve one directory of the bundle. Empty or `.` selects the bundle itself.
    pub fn subdirectory(bundle: &'static Dir<'static>, directory: &str) -> Option<Self> {
        let relative = relative_path(directory)?;
        if relative.as_os_str().is_empty() {
            return Some(Self::new(bundle));
        }
        bundle.get_dir(&relative).map(Self::new)
    }

    fn file(&self, path: &str) -> Option<&'static include_dir::File<'static>> {
        let relative = relative_path(path)?;
        if relative.as_os_str().is_empty() {
            return None;
        }
        // Entry paths are relative to the bundle root, not to this directory.
        self.dir.get_file(self.dir.path().join(relative))
    }
}

fn collect_etags(dir: &'static Dir<'static>, etags: &mut HashMap<&'static Path, String>) {
    for file in dir.files() {
        etags.insert(file.path(), content_etag(file.contents()));
    }
    for child in dir.dirs() {
        collect_etags(child, etags);
    }
}

/// Quoted hex digest of `bytes`, stable for the lifetime of the binary.
pub fn content_etag(bytes: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    format!("\"{:016x}\"", hasher.finish())
}

impl AssetSource for EmbeddedAssets {
    fn exists(&self, path: &str) -> bool {
        self.file(path).is_some()
    }

    fn read(&self, path: &str) -> io::Result<Cow<'static, [u8]>> {
        self.file(path)
            .map(|file| Cow::Borrowed(file.contents()))
            .ok_or_else(|| not_found(path))
    }

    fn etag(&self, path: &str) -> Option<&str> {
        let file = self.file(path)?;
        self.etags.get(file.path()).map(String::as_str)
    }
}
