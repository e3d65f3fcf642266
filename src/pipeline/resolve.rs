//! Cover-image resolution: reference string → raw bytes, or nothing.
//!
//! A post's cover reference is either an `http(s)://` URL (historically a
//! Cloudinary upload) or a path relative to the configured asset root
//! (pre-upload posts). Both sources fail routinely — hosts rot, files get
//! pruned — and a missing cover must never abort a document export, so every
//! failure path here logs at `warn!` and resolves to `None`.
//!
//! Local resolution is confined to the asset root: the reference is
//! normalized component-wise and `..` segments are rejected outright, so a
//! reference like `../../etc/passwd` cannot read outside the root.

use crate::config::ExportConfig;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Raw bytes of a resolved cover image, format not yet inspected.
#[derive(Debug, Clone)]
pub struct ResolvedImage(pub Vec<u8>);

/// Resolves cover-image references against one export configuration.
pub struct ImageResolver {
    asset_root: PathBuf,
    download_timeout: Duration,
}

/// Check if the reference looks like a URL.
pub fn is_url(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

impl ImageResolver {
    /// Build a resolver from the export configuration.
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            asset_root: config.asset_root.clone(),
            download_timeout: Duration::from_secs(config.download_timeout_secs),
        }
    }

    /// Resolve a cover-image reference to raw bytes.
    ///
    /// Returns `None` for absent/empty references (no I/O performed),
    /// unreachable URLs, non-success statuses, missing files, and traversal
    /// attempts. Never returns an error.
    pub async fn resolve(&self, reference: Option<&str>) -> Option<ResolvedImage> {
        let reference = reference?.trim();
        if reference.is_empty() {
            return None;
        }

        if is_url(reference) {
            self.fetch_remote(reference).await
        } else {
            self.read_local(reference).await
        }
    }

    async fn fetch_remote(&self, url: &str) -> Option<ResolvedImage> {
        debug!("Fetching cover image: {url}");
        let client = match reqwest::Client::builder()
            .timeout(self.download_timeout)
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not build HTTP client for cover image '{url}': {e}");
                return None;
            }
        };
        let response = match client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Could not load cover image '{url}': {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(
                "Could not load cover image '{url}': HTTP {}",
                response.status()
            );
            return None;
        }
        match response.bytes().await {
            Ok(bytes) if !bytes.is_empty() => Some(ResolvedImage(bytes.to_vec())),
            Ok(_) => {
                warn!("Cover image '{url}' returned an empty body");
                None
            }
            Err(e) => {
                warn!("Could not read cover image body '{url}': {e}");
                None
            }
        }
    }

    async fn read_local(&self, reference: &str) -> Option<ResolvedImage> {
        let path = match confine(&self.asset_root, reference) {
            Some(p) => p,
            None => {
                warn!("Rejected cover image reference outside asset root: '{reference}'");
                return None;
            }
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!("Read cover image: {} ({} bytes)", path.display(), bytes.len());
                Some(ResolvedImage(bytes))
            }
            Err(e) => {
                warn!("Could not read cover image '{}': {e}", path.display());
                None
            }
        }
    }
}

/// Join `reference` onto `root` without ever escaping it.
///
/// Leading separators are stripped (references are stored as absolute URL
/// paths like `/uploads/cover.png`), normal components are kept, and any
/// `..` component rejects the whole reference rather than being collapsed.
fn confine(root: &Path, reference: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    for component in Path::new(reference).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }
    // A reference made only of separators resolves to the root itself,
    // which is a directory, not an image.
    (out != root).then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection() {
        assert!(is_url("https://images.example.com/c.png"));
        assert!(is_url("http://images.example.com/c.png"));
        assert!(!is_url("/uploads/c.png"));
        assert!(!is_url("uploads/c.png"));
        assert!(!is_url(""));
    }

    #[test]
    fn confine_strips_leading_slash() {
        let p = confine(Path::new("/srv/assets"), "/uploads/c.png").unwrap();
        assert_eq!(p, Path::new("/srv/assets/uploads/c.png"));
    }

    #[test]
    fn confine_rejects_parent_traversal() {
        assert!(confine(Path::new("/srv/assets"), "../secret.png").is_none());
        assert!(confine(Path::new("/srv/assets"), "a/../../b.png").is_none());
        assert!(confine(Path::new("/srv/assets"), "/uploads/../../b.png").is_none());
    }

    #[test]
    fn confine_rejects_bare_root() {
        assert!(confine(Path::new("/srv/assets"), "/").is_none());
        assert!(confine(Path::new("/srv/assets"), ".").is_none());
    }

    #[tokio::test]
    async fn absent_and_empty_references_resolve_to_none() {
        let resolver = ImageResolver::new(&ExportConfig::default());
        assert!(resolver.resolve(None).await.is_none());
        assert!(resolver.resolve(Some("")).await.is_none());
        assert!(resolver.resolve(Some("   ")).await.is_none());
    }

    #[tokio::test]
    async fn missing_local_file_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::builder()
            .asset_root(dir.path())
            .build()
            .unwrap();
        let resolver = ImageResolver::new(&config);
        assert!(resolver.resolve(Some("/uploads/nope.png")).await.is_none());
    }

    #[tokio::test]
    async fn existing_local_file_resolves_to_its_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
        std::fs::write(dir.path().join("uploads/c.png"), b"PNGBYTES").unwrap();
        let config = ExportConfig::builder()
            .asset_root(dir.path())
            .build()
            .unwrap();
        let resolver = ImageResolver::new(&config);
        let img = resolver.resolve(Some("/uploads/c.png")).await.unwrap();
        assert_eq!(img.0, b"PNGBYTES");
    }

    #[tokio::test]
    async fn traversal_reference_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("outside.txt"), b"secret").unwrap();
        let root = dir.path().join("assets");
        std::fs::create_dir_all(&root).unwrap();
        let config = ExportConfig::builder().asset_root(&root).build().unwrap();
        let resolver = ImageResolver::new(&config);
        assert!(resolver.resolve(Some("../outside.txt")).await.is_none());
    }

    #[tokio::test]
    async fn unreachable_url_resolves_to_none() {
        let config = ExportConfig::builder()
            .download_timeout_secs(1)
            .build()
            .unwrap();
        let resolver = ImageResolver::new(&config);
        // Reserved TEST-NET-1 address: connection refused or timeout, never data.
        let result = resolver
            .resolve(Some("http://192.0.2.1/cover.png"))
            .await;
        assert!(result.is_none());
    }
}
