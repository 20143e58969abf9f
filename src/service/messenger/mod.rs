//! Messaging client integration.
//!
//! The actual chat transport is an opaque external collaborator; this module
//! only fixes the seam. `GenericMessengerClient::run` is the client's event
//! loop: it consumes incoming messages until the stop flag fires, feeding
//! each through the reply path. The in-tree implementation is a console
//! loopback, enough to drive the whole pipeline locally and under test.

pub mod console;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::{base::types::Void, worker::StopFlag};

// Traits.

/// Generic messaging client trait that transports must implement.
#[async_trait]
pub trait GenericMessengerClient: Send + Sync + 'static {
    /// Runs the event loop until `stop` fires or the message source ends.
    ///
    /// A returned error means the client is down; the worker reports it on
    /// the feed and does not restart it.
    async fn run(&self, stop: StopFlag) -> Void;
}

// Structs.

/// Messaging client for the application.
///
/// This is trivially cloneable and can be passed around without the need for
/// `Arc` or `Mutex`.
#[derive(Clone)]
pub struct MessengerClient {
    inner: Arc<dyn GenericMessengerClient>,
}

impl Deref for MessengerClient {
    type Target = dyn GenericMessengerClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl MessengerClient {
    pub fn new(inner: Arc<dyn GenericMessengerClient>) -> Self {
        Self { inner }
    }
}
