use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use tracing::{info, instrument};

use crate::{
    base::{
        error::{Error, Result},
        types::Reply,
    },
    service::{
        media::{GenericMediaStore, MediaClient, MediaKind},
        store::{GenericResponseStore, ResponseRecord, ResponseStore, StoreClient},
    },
};

/// Builds replies for incoming messages.
///
/// Plain composition over the store and media clients; any editing surface
/// or transport holds one of these and calls in with plain data.
#[derive(Clone)]
pub struct Responder {
    store: StoreClient,
    media: MediaClient,
    rotation: Arc<AtomicUsize>,
}

impl Responder {
    pub fn new(store: StoreClient, media: MediaClient) -> Self {
        Self {
            store,
            media,
            rotation: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handles one incoming message; `None` when no keyword matches.
    ///
    /// A missing store file means "no responses yet", not an error, so the
    /// bot stays quiet instead of failing on every message. Media references
    /// are resolved here, at use time.
    #[instrument(skip_all)]
    pub fn reply_to(&self, sender: &str, text: &str) -> Result<Option<Reply>> {
        info!(category = "incoming", "{sender}: {text}");

        let store = match self.store.load() {
            Ok(store) => store,
            Err(Error::NotFound(_)) => ResponseStore::default(),
            Err(err) => return Err(err),
        };

        // First keyword contained in the message wins, in document order.
        let Some((keyword, record)) = store.iter().find(|(keyword, _)| text.contains(*keyword)) else {
            return Ok(None);
        };

        let reply = self.build_reply(record)?;
        info!(category = "outgoing", "{keyword}: {}", describe(&reply));

        Ok(Some(reply))
    }

    fn build_reply(&self, record: &ResponseRecord) -> Result<Reply> {
        match record {
            ResponseRecord::Text { content } => {
                if content.is_empty() {
                    // Only reachable through a hand-edited document; the
                    // store rejects empty variant lists on write.
                    return Err(Error::invalid_input("text record has no variants"));
                }

                // Shared rotation, so repeated triggers cycle through the
                // variants rather than repeat the first one.
                let index = self.rotation.fetch_add(1, Ordering::Relaxed) % content.len();
                Ok(Reply::Text {
                    text: content[index].clone(),
                })
            }
            ResponseRecord::Image { content, caption } => {
                if !self.media.exists(MediaKind::Image, content) {
                    return Err(Error::not_found(format!("image file {content}")));
                }

                Ok(Reply::Image {
                    filename: content.clone(),
                    caption: caption.clone(),
                })
            }
            ResponseRecord::Audio { content } => {
                if !self.media.exists(MediaKind::Audio, content) {
                    return Err(Error::not_found(format!("audio file {content}")));
                }

                Ok(Reply::Audio {
                    filename: content.clone(),
                })
            }
        }
    }
}

fn describe(reply: &Reply) -> String {
    match reply {
        Reply::Text { text } => text.clone(),
        Reply::Image { filename, .. } => format!("[image {filename}]"),
        Reply::Audio { filename } => format!("[audio {filename}]"),
    }
}
