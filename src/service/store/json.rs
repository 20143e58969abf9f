//! JSON document backend for the response store.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::base::error::{Error, Result};

use super::{GenericResponseStore, ResponseRecord, ResponseStore, ResponseSummary, UpsertMode};

/// Response store persisted as one pretty-printed JSON document.
///
/// Every mutation loads the document fresh, applies the change in memory,
/// and rewrites the whole file. There is no locking; see the trait docs for
/// the single-writer assumption.
pub struct JsonResponseStore {
    path: PathBuf,
}

impl JsonResponseStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read(&self) -> Result<ResponseStore> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::not_found(format!("response store {}", self.path.display())));
            }
            Err(err) => return Err(err.into()),
        };

        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&self, store: &ResponseStore) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let raw = serde_json::to_string_pretty(store)?;
        fs::write(&self.path, raw)?;

        Ok(())
    }
}

fn validate(keyword: &str, record: &ResponseRecord) -> Result<()> {
    if keyword.trim().is_empty() {
        return Err(Error::invalid_input("keyword must not be empty"));
    }

    if let ResponseRecord::Text { content } = record {
        if content.is_empty() {
            return Err(Error::invalid_input("text responses need at least one variant"));
        }
    }

    Ok(())
}

impl GenericResponseStore for JsonResponseStore {
    fn load(&self) -> Result<ResponseStore> {
        self.read()
    }

    fn upsert(&self, keyword: &str, record: ResponseRecord, mode: UpsertMode) -> Result<()> {
        validate(keyword, &record)?;

        // A missing document is an empty store on the write path; the first
        // upsert creates the file.
        let mut store = match self.read() {
            Ok(store) => store,
            Err(Error::NotFound(_)) => ResponseStore::default(),
            Err(err) => return Err(err),
        };

        if mode == UpsertMode::Add && store.contains(keyword) {
            return Err(Error::DuplicateKey(keyword.to_string()));
        }

        store.insert(keyword, record);
        self.write(&store)?;

        match mode {
            UpsertMode::Add => info!(category = "system", "added response: {keyword}"),
            UpsertMode::Edit => info!(category = "system", "updated response: {keyword}"),
        }

        Ok(())
    }

    fn delete(&self, keyword: &str) -> Result<()> {
        let mut store = self.read()?;

        if store.remove(keyword).is_none() {
            return Err(Error::not_found(format!("keyword {keyword}")));
        }

        self.write(&store)?;
        info!(category = "system", "deleted response: {keyword}");

        Ok(())
    }

    fn list(&self) -> Result<Vec<ResponseSummary>> {
        Ok(self.read()?.summaries())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> JsonResponseStore {
        JsonResponseStore::new(dir.path().join("responses.json"))
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(matches!(store.load(), Err(Error::NotFound(_))));
    }

    #[test]
    fn load_malformed_document_is_format_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("responses.json"), "{ this is not json").unwrap();

        let store = store_in(&dir);
        assert!(matches!(store.load(), Err(Error::Format(_))));
    }

    #[test]
    fn first_upsert_creates_the_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .upsert("hello", ResponseRecord::Text { content: vec!["Hi!".into()] }, UpsertMode::Add)
            .unwrap();

        assert!(dir.path().join("responses.json").is_file());
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn rejects_empty_keyword_and_empty_variants() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let record = ResponseRecord::Text { content: vec!["Hi!".into()] };
        assert!(matches!(store.upsert("  ", record, UpsertMode::Add), Err(Error::InvalidInput { .. })));

        let empty = ResponseRecord::Text { content: Vec::new() };
        assert!(matches!(store.upsert("hello", empty, UpsertMode::Add), Err(Error::InvalidInput { .. })));
    }
}
