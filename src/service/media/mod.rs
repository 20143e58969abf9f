//! Media library backing image and audio responses.
//!
//! Response records reference media by bare filename; this module owns the
//! directories those names resolve against. Existence is checked at use
//! time by the reply path, never enforced by the response store.

pub mod fs;

use std::{fmt, ops::Deref, path::Path, sync::Arc};

use crate::base::error::Result;

use fs::FsMediaStore;

// Traits.

/// Generic media library trait that backends must implement.
pub trait GenericMediaStore: Send + Sync + 'static {
    /// Sorted filenames available for `kind`.
    ///
    /// A missing directory lists as empty; it is not an error.
    fn list(&self, kind: MediaKind) -> Result<Vec<String>>;

    /// Use-time check that a record's filename still resolves to a file.
    fn exists(&self, kind: MediaKind, filename: &str) -> bool;

    /// Copies `source` into the kind's directory under its base name and
    /// returns the stored filename.
    ///
    /// An existing file with the same name is silently overwritten.
    fn upload(&self, kind: MediaKind, source: &Path) -> Result<String>;

    /// Removes a stored file; fails with `NotFound` when it is absent.
    fn delete(&self, kind: MediaKind, filename: &str) -> Result<()>;
}

/// Media library client for the application.
///
/// This is trivially cloneable and can be passed around without the need for
/// `Arc` or `Mutex`.
#[derive(Clone)]
pub struct MediaClient {
    inner: Arc<dyn GenericMediaStore>,
}

impl Deref for MediaClient {
    type Target = dyn GenericMediaStore;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl MediaClient {
    pub fn new(inner: Arc<dyn GenericMediaStore>) -> Self {
        Self { inner }
    }

    /// Creates a media library over two flat directories, one per kind.
    pub fn fs(images_dir: impl AsRef<Path>, audio_dir: impl AsRef<Path>) -> Self {
        Self::new(Arc::new(FsMediaStore::new(images_dir, audio_dir)))
    }
}

// Data types.

/// Which media directory a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
