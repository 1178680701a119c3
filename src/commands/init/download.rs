//! Guest operating system download.
//!
//! The guest OS is published as GitHub release assets. The release manifest
//! is fetched first, then each required asset is streamed into the config
//! directory through a temporary file that is renamed once complete.

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    time::Duration,
};

use reqwest::{blocking::Client, header::ACCEPT};
use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// A published release.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag (e.g. `v2.3.0`).
    #[serde(default)]
    pub tag_name: String,
    /// Downloadable files.
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// One downloadable file of a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// File name.
    pub name: String,
    /// Direct download URL.
    pub browser_download_url: String,
}

/// Find every asset in `names`, in the order given.
pub fn select_assets<'r>(release: &'r Release, names: &[&str]) -> Result<Vec<&'r ReleaseAsset>> {
    names
        .iter()
        .map(|name| {
            release.assets.iter().find(|a| a.name == *name).ok_or_else(|| {
                Error::download(format!("release {} has no asset named {name}", release.tag_name))
            })
        })
        .collect()
}

/// Fetches the guest OS into a directory.
pub trait Downloader {
    /// Download the guest OS into `dest_dir`, returning the files written.
    fn download(&self, dest_dir: &Path) -> Result<Vec<PathBuf>>;
}

/// Downloads guest OS assets from a GitHub-style release manifest.
pub struct ReleaseDownloader {
    client: Client,
    release_url: String,
    assets: Vec<String>,
}

impl ReleaseDownloader {
    /// Create a downloader for the given manifest URL and asset names.
    ///
    /// The client has no overall timeout: the images are large and a slow
    /// link should finish rather than fail.
    pub fn new(release_url: impl Into<String>, assets: &[&str]) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("dlite/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()?;

        Ok(Self {
            client,
            release_url: release_url.into(),
            assets: assets.iter().map(|a| (*a).to_string()).collect(),
        })
    }

    fn fetch_release(&self) -> Result<Release> {
        tracing::debug!(url = %self.release_url, "Fetching release manifest");
        let release = self
            .client
            .get(&self.release_url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()?
            .error_for_status()?
            .json()?;
        Ok(release)
    }

    fn fetch_asset(&self, asset: &ReleaseAsset, dest_dir: &Path) -> Result<PathBuf> {
        tracing::debug!(name = %asset.name, url = %asset.browser_download_url, "Downloading asset");

        let mut response =
            self.client.get(&asset.browser_download_url).send()?.error_for_status()?;

        let mut tmp = NamedTempFile::new_in(dest_dir)?;
        let bytes = response.copy_to(&mut tmp)?;
        tmp.as_file().sync_all()?;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o644))?;

        let path = dest_dir.join(&asset.name);
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(name = %asset.name, bytes, "Downloaded asset");
        Ok(path)
    }
}

impl Downloader for ReleaseDownloader {
    fn download(&self, dest_dir: &Path) -> Result<Vec<PathBuf>> {
        let release = self.fetch_release()?;
        let names: Vec<&str> = self.assets.iter().map(String::as_str).collect();

        select_assets(&release, &names)?
            .into_iter()
            .map(|asset| self.fetch_asset(asset, dest_dir))
            .collect()
    }
}
