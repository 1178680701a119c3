//! Helper binaries shipped with dlite.
//!
//! Release builds embed the helper tools from the crate's `assets/`
//! directory. A build without them can point `DLITE_ASSET_DIR` at a
//! directory holding the binaries instead.

use std::{
    borrow::Cow,
    fs, io,
    path::{Path, PathBuf},
};

use include_dir::{Dir, include_dir};

use crate::error::{Error, Result};

static EMBEDDED: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Source of helper tool binaries.
pub trait AssetStore {
    /// Get the binary payload for `name`.
    ///
    /// A missing asset is [`Error::AssetMissing`].
    fn get(&self, name: &str) -> Result<Cow<'static, [u8]>>;
}

/// Assets compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedAssets;

impl AssetStore for EmbeddedAssets {
    fn get(&self, name: &str) -> Result<Cow<'static, [u8]>> {
        EMBEDDED
            .get_file(name)
            .map(|file| Cow::Borrowed(file.contents()))
            .ok_or_else(|| Error::AssetMissing(name.to_string()))
    }
}

/// Assets read from a directory at runtime.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    /// Serve assets from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetStore for DirectoryAssets {
    fn get(&self, name: &str) -> Result<Cow<'static, [u8]>> {
        // Asset names are plain file names; never let one escape the root.
        if name.is_empty() || name.contains('/') || name == ".." {
            return Err(Error::AssetMissing(name.to_string()));
        }

        match fs::read(self.root.join(name)) {
            Ok(bytes) => Ok(Cow::Owned(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::AssetMissing(name.to_string()))
            },
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Pick the asset store for the given settings.
pub fn asset_store(asset_dir: Option<&Path>) -> Box<dyn AssetStore> {
    match asset_dir {
        Some(dir) => {
            tracing::debug!(dir = %dir.display(), "Using helper binaries from directory");
            Box::new(DirectoryAssets::new(dir))
        },
        None => Box::new(EmbeddedAssets),
    }
}
