//! Filesystem backend for the media library.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::base::error::{Error, Result};

use super::{GenericMediaStore, MediaKind};

/// Media library over two flat directories, one per kind.
pub struct FsMediaStore {
    images_dir: PathBuf,
    audio_dir: PathBuf,
}

impl FsMediaStore {
    pub fn new(images_dir: impl AsRef<Path>, audio_dir: impl AsRef<Path>) -> Self {
        Self {
            images_dir: images_dir.as_ref().to_path_buf(),
            audio_dir: audio_dir.as_ref().to_path_buf(),
        }
    }

    fn dir(&self, kind: MediaKind) -> &Path {
        match kind {
            MediaKind::Image => &self.images_dir,
            MediaKind::Audio => &self.audio_dir,
        }
    }
}

impl GenericMediaStore for FsMediaStore {
    fn list(&self, kind: MediaKind) -> Result<Vec<String>> {
        let entries = match fs::read_dir(self.dir(kind)) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        names.sort();
        Ok(names)
    }

    fn exists(&self, kind: MediaKind, filename: &str) -> bool {
        self.dir(kind).join(filename).is_file()
    }

    fn upload(&self, kind: MediaKind, source: &Path) -> Result<String> {
        let filename = source
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| Error::invalid_input(format!("source path has no file name: {}", source.display())))?;

        let dir = self.dir(kind);
        fs::create_dir_all(dir)?;
        fs::copy(source, dir.join(&filename))?;

        info!(category = "system", "uploaded {kind}: {filename}");
        Ok(filename)
    }

    fn delete(&self, kind: MediaKind, filename: &str) -> Result<()> {
        match fs::remove_file(self.dir(kind).join(filename)) {
            Ok(()) => {
                info!(category = "system", "deleted media file: {filename}");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(Error::not_found(format!("{kind} file {filename}")))
            }
            Err(err) => Err(err.into()),
        }
    }
}
