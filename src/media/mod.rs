//! Image storage on a remote media host.
//!
//! [`FileStorage`] is what handlers talk to: it validates input, picks the
//! upload folder and turns hosted URLs back into the host's public ids.
//! The wire protocol lives behind [`MediaHost`] so the storage rules can be
//! exercised without a network.

mod cloudinary;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

pub use cloudinary::CloudinaryClient;

/// Path segment that precedes the public id in hosted asset URLs.
const UPLOAD_MARKER: &str = "/upload/";

#[derive(Debug, Error)]
pub enum MediaHostError {
    #[error("media host request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("media host returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected media host response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to store empty file.")]
    EmptyFile,

    #[error("Failed to upload file")]
    Upload(#[source] MediaHostError),
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub public_id: String,
    pub secure_url: String,
}

/// Remote object storage for images.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, folder: &str) -> Result<UploadedAsset, MediaHostError>;

    async fn destroy(&self, public_id: &str) -> Result<(), MediaHostError>;
}

/// URL-backed handle to a hosted asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResource {
    url: Url,
}

impl MediaResource {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Last path segment, used as a download name.
    pub fn filename(&self) -> Option<&str> {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Clone)]
pub struct FileStorage {
    host: Arc<dyn MediaHost>,
    folder: String,
}

impl FileStorage {
    pub fn new(host: Arc<dyn MediaHost>, folder: impl Into<String>) -> Self {
        let storage = Self {
            host,
            folder: folder.into(),
        };
        tracing::info!(folder = %storage.folder, "file storage initialized");
        storage
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Uploads `file` and returns its permanent public URL.
    ///
    /// Empty input is rejected before the host is contacted. Upload failures
    /// are returned as-is; there is no retry.
    pub async fn store(&self, file: &[u8]) -> Result<String, StorageError> {
        if file.is_empty() {
            return Err(StorageError::EmptyFile);
        }

        match self.host.upload(file.to_vec(), &self.folder).await {
            Ok(asset) => {
                tracing::info!(url = %asset.secure_url, "uploaded file to media host");
                Ok(asset.secure_url)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to upload file to media host");
                Err(StorageError::Upload(err))
            }
        }
    }

    /// Best-effort removal of a previously stored file. Never fails.
    pub async fn delete(&self, file_url: &str) {
        if file_url.trim().is_empty() {
            return;
        }

        let Some(public_id) = extract_public_id(file_url) else {
            tracing::warn!(url = %file_url, "not a hosted asset URL, skipping delete");
            return;
        };

        match self.host.destroy(&public_id).await {
            Ok(()) => tracing::info!(public_id = %public_id, "deleted file from media host"),
            Err(err) => tracing::warn!(
                url = %file_url,
                error = %err,
                "failed to delete file from media host"
            ),
        }
    }

    /// Resolves a stored name (a hosted URL) into a resource handle.
    ///
    /// Only `https` asset URLs with an upload path resolve.
    pub fn load_as_resource(&self, name: &str) -> Option<MediaResource> {
        if name.trim().is_empty() {
            return None;
        }
        let url = match Url::parse(name) {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(name = %name, error = %err, "could not create URL resource");
                return None;
            }
        };
        if url.scheme() != "https" || !url.path().contains(UPLOAD_MARKER) {
            tracing::warn!(name = %name, "refusing to resolve a non-asset URL");
            return None;
        }
        Some(MediaResource { url })
    }
}

/// Derives the host's public id from a hosted asset URL.
///
/// Takes everything after the first `/upload/`, drops a leading version
/// segment (`v12345/`), then drops the extension. Returns `None` when the
/// marker is missing.
pub fn extract_public_id(url: &str) -> Option<String> {
    let start = url.find(UPLOAD_MARKER)? + UPLOAD_MARKER.len();
    let mut path = &url[start..];

    if path.starts_with('v') {
        if let Some(slash) = path.find('/') {
            path = &path[slash + 1..];
        }
    }

    if let Some(dot) = path.rfind('.') {
        path = &path[..dot];
    }

    Some(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "https://host/upload/v123456/mk-toasted-demo/abc.jpg",
        Some("mk-toasted-demo/abc")
    )]
    #[case(
        "https://res.cloudinary.com/demo/image/upload/v1700000000/mk-toasted-demo/siopao.png",
        Some("mk-toasted-demo/siopao")
    )]
    #[case("https://host/upload/mk-toasted-demo/abc.jpg", Some("mk-toasted-demo/abc"))]
    #[case("https://host/upload/v99/abc", Some("abc"))]
    #[case("https://host/upload/v1/a.b/c.tar.gz", Some("a.b/c.tar"))]
    #[case("https://host/images/abc.jpg", None)]
    #[case("", None)]
    fn extracts_public_id(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_public_id(url).as_deref(), expected);
    }

    #[test]
    fn version_segment_without_slash_is_kept() {
        assert_eq!(extract_public_id("https://host/upload/v123.jpg").as_deref(), Some("v123"));
    }

    #[test]
    fn resource_filename_is_last_segment() {
        let resource = MediaResource {
            url: Url::parse("https://host/upload/v1/mk-toasted-demo/abc.jpg").expect("url"),
        };
        assert_eq!(resource.filename(), Some("abc.jpg"));
    }
}
