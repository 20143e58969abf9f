//! Response store for reply-bot.
//!
//! Maps trigger keywords to tagged response records (text variants, or a
//! reference to a media file), persisted as a single JSON document. This
//! module defines the `GenericResponseStore` trait and the data model; the
//! JSON file backend lives in [`json`].

pub mod json;

use std::{fmt, ops::Deref, path::Path, sync::Arc};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::base::error::Result;

use json::JsonResponseStore;

// Traits.

/// Generic response store trait that backends must implement.
///
/// The contract assumes a single logical writer at a time: callers issue one
/// call per user action, synchronously. Every mutation re-reads the whole
/// document and writes it back, so two interleaved writers can lose an
/// update; a backend intended for concurrent writers must add mutual
/// exclusion around that cycle.
pub trait GenericResponseStore: Send + Sync + 'static {
    /// Loads the full mapping.
    ///
    /// Fails with `NotFound` when the backing document is absent (callers
    /// decide whether that means "empty" or "misconfigured") and with
    /// `Format` when it is malformed.
    fn load(&self) -> Result<ResponseStore>;

    /// Inserts or overwrites one record, then rewrites the whole document.
    ///
    /// [`UpsertMode::Add`] fails with `DuplicateKey` when the keyword already
    /// exists; [`UpsertMode::Edit`] overwrites unconditionally. Empty
    /// keywords and empty text variant lists are rejected with
    /// `InvalidInput`.
    fn upsert(&self, keyword: &str, record: ResponseRecord, mode: UpsertMode) -> Result<()>;

    /// Removes a record; fails with `NotFound` when the keyword is absent.
    fn delete(&self, keyword: &str) -> Result<()>;

    /// Lists one summary row per record, in document order.
    fn list(&self) -> Result<Vec<ResponseSummary>>;
}

/// Response store client for the application.
///
/// This is trivially cloneable and can be passed around without the need for
/// `Arc` or `Mutex`.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<dyn GenericResponseStore>,
}

impl Deref for StoreClient {
    type Target = dyn GenericResponseStore;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl StoreClient {
    pub fn new(inner: Arc<dyn GenericResponseStore>) -> Self {
        Self { inner }
    }

    /// Creates a store backed by a JSON document at `path`.
    pub fn json(path: impl AsRef<Path>) -> Self {
        Self::new(Arc::new(JsonResponseStore::new(path)))
    }
}

// Data types.

/// Whether an upsert may overwrite an existing keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// Fail with `DuplicateKey` when the keyword already exists.
    Add,
    /// Overwrite unconditionally.
    Edit,
}

/// Kind tag of a response record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Text,
    Image,
    Audio,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored reply definition.
///
/// The wire shape is `{"type": ..., "content": ...}` with an optional
/// `caption` for images; text content is an ordered list of candidate
/// variants, media content is a filename reference resolved at use time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseRecord {
    Text {
        content: Vec<String>,
    },
    Image {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Audio {
        content: String,
    },
}

impl ResponseRecord {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Text { .. } => ResponseKind::Text,
            Self::Image { .. } => ResponseKind::Image,
            Self::Audio { .. } => ResponseKind::Audio,
        }
    }

    /// Content preview for listing rows.
    ///
    /// Text: the first two variants joined with `", "`, plus `...` when more
    /// exist. Scalar content: the first 50 characters, plus `...` when
    /// longer. Display surfaces depend on this exact shape.
    pub fn preview(&self) -> String {
        match self {
            Self::Text { content } => {
                let mut preview = content.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
                if content.len() > 2 {
                    preview.push_str("...");
                }
                preview
            }
            Self::Image { content, .. } | Self::Audio { content } => {
                if content.chars().count() > 50 {
                    let mut preview: String = content.chars().take(50).collect();
                    preview.push_str("...");
                    preview
                } else {
                    content.clone()
                }
            }
        }
    }
}

/// One listing row: keyword, kind, and the truncated content preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSummary {
    pub keyword: String,
    pub kind: ResponseKind,
    pub preview: String,
}

/// The full keyword mapping, in document order.
///
/// Insertion order is preserved for display purposes only; it carries no
/// semantics. A desktop keyword table holds at most a few dozen entries, so
/// lookups scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseStore {
    entries: Vec<(String, ResponseRecord)>,
}

impl ResponseStore {
    pub fn get(&self, keyword: &str) -> Option<&ResponseRecord> {
        self.entries.iter().find(|(k, _)| k == keyword).map(|(_, record)| record)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    /// Inserts a record, or overwrites in place keeping the original position.
    pub fn insert(&mut self, keyword: impl Into<String>, record: ResponseRecord) {
        let keyword = keyword.into();
        match self.entries.iter_mut().find(|(k, _)| *k == keyword) {
            Some((_, existing)) => *existing = record,
            None => self.entries.push((keyword, record)),
        }
    }

    /// Removes a record, returning it when the keyword was present.
    pub fn remove(&mut self, keyword: &str) -> Option<ResponseRecord> {
        let index = self.entries.iter().position(|(k, _)| k == keyword)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResponseRecord)> {
        self.entries.iter().map(|(keyword, record)| (keyword.as_str(), record))
    }

    pub fn summaries(&self) -> Vec<ResponseSummary> {
        self.entries
            .iter()
            .map(|(keyword, record)| ResponseSummary {
                keyword: keyword.clone(),
                kind: record.kind(),
                preview: record.preview(),
            })
            .collect()
    }
}

// serde_json's map type does not keep document order, so the store
// serializes itself entry by entry.

impl Serialize for ResponseStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (keyword, record) in &self.entries {
            map.serialize_entry(keyword, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResponseStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct StoreVisitor;

        impl<'de> Visitor<'de> for StoreVisitor {
            type Value = ResponseStore;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of keyword to response record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut store = ResponseStore::default();
                while let Some((keyword, record)) = access.next_entry::<String, ResponseRecord>()? {
                    // Duplicate keys in a hand-edited document: last one wins.
                    store.insert(keyword, record);
                }
                Ok(store)
            }
        }

        deserializer.deserialize_map(StoreVisitor)
    }
}
