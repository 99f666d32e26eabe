//! Media host port: turns a local file into a publicly retrievable URL.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::error::MediaError;

/// Boxed future type returned by [`MediaHost::upload`].
pub type UploadFuture<'a> = Pin<Box<dyn Future<Output = Result<String, MediaError>> + Send + 'a>>;

/// Hosts local media so the publishing API can fetch it.
pub trait MediaHost: Send + Sync {
    /// Upload the file and return its public URL.
    fn upload(&self, path: &Path) -> UploadFuture<'_>;
}
