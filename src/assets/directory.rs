//! Assets read from a filesystem directory.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{not_found, relative_path, AssetSource};

/// A filesystem directory served as an asset store.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    base_dir: PathBuf,
}

impl DirectoryAssets {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    fn map_path(&self, path: &str) -> Option<PathBuf> {
        relative_path(path).map(|relative| self.base_dir.join(relative))
    }
}

impl AssetSource for DirectoryAssets {
    fn exists(&self, path: &str) -> bool {
        self.map_path(path).is_some_and(|p| p.is_file())
    }

    fn read(&self, path: &str) -> io::Result<Cow<'static, [u8]>> {
        let full = self.map_path(path).ok_or_else(|| not_found(path))?;
        if !full.is_file() {
            return Err(not_found(path));
        }
        fs::read(full).map(Cow::Owned)
    }

    fn local_root(&self) -> Option<&Path> {
        Some(&self.base_dir)
    }
}
