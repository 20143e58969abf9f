//! Runtime services and shared state for reply-bot.

use tracing::instrument;

use crate::{
    base::{config::Config, types::Res},
    interaction::incoming::Responder,
    relay::LogRelay,
    service::{media::MediaClient, messenger::MessengerClient, store::StoreClient},
    worker::Worker,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the store, media, and messenger clients plus the
/// producer side of the log relay. It is designed to be trivially cloneable
/// and passed to whichever component needs it, instead of living as ambient
/// global state.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The response store client instance.
    pub store: StoreClient,
    /// The media library client instance.
    pub media: MediaClient,
    /// The messaging client instance.
    pub messenger: MessengerClient,
    /// Producer side of the log relay.
    pub relay: LogRelay,
}

impl Runtime {
    /// Create a new runtime instance around an existing relay.
    #[instrument(skip_all)]
    pub fn new(config: Config, relay: LogRelay) -> Res<Self> {
        // Initialize the store and the media library.
        let store = StoreClient::json(&config.responses_file);
        let media = MediaClient::fs(&config.images_dir, &config.audio_dir);

        // Initialize the messenger around the reply path.
        let responder = Responder::new(store.clone(), media.clone());
        let messenger = MessengerClient::console(responder);

        Ok(Self {
            config,
            store,
            media,
            messenger,
            relay,
        })
    }

    /// Spawns the background worker running the messenger's event loop.
    pub fn start(&self) -> Res<Worker> {
        Worker::spawn(self.messenger.clone(), self.relay.clone())
    }
}
