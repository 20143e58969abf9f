//! Console loopback messenger.
//!
//! Treats every line typed on stdin as an incoming chat message and prints
//! the reply, which is enough to exercise the store, media library, and
//! relay without a real chat transport.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::{
    base::types::{Reply, Void},
    interaction::incoming::Responder,
    worker::StopFlag,
};

use super::{GenericMessengerClient, MessengerClient};

// Extra methods on `MessengerClient` applied by the console implementation.

impl MessengerClient {
    /// Creates the console loopback client around the reply path.
    pub fn console(responder: Responder) -> Self {
        Self::new(Arc::new(ConsoleMessengerClient::new(responder)))
    }
}

// Structs.

/// Console implementation of the messaging client.
pub struct ConsoleMessengerClient {
    responder: Responder,
}

impl ConsoleMessengerClient {
    pub fn new(responder: Responder) -> Self {
        Self { responder }
    }

    /// "Sends" a reply by printing it; this is the loopback transport.
    fn deliver(&self, reply: Reply) {
        match reply {
            Reply::Text { text } => println!("<- {text}"),
            Reply::Image { filename, caption } => match caption {
                Some(caption) => println!("<- [image {filename}] {caption}"),
                None => println!("<- [image {filename}]"),
            },
            Reply::Audio { filename } => println!("<- [audio {filename}]"),
        }
    }
}

#[async_trait]
impl GenericMessengerClient for ConsoleMessengerClient {
    async fn run(&self, stop: StopFlag) -> Void {
        info!("Console messenger is running; type a message and press enter.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                _ = stop.stopped() => break,
                line = lines.next_line() => {
                    // EOF ends the loop; the worker winds down.
                    let Some(line) = line? else { break };

                    let text = line.trim();
                    if text.is_empty() {
                        continue;
                    }

                    match self.responder.reply_to("console", text) {
                        Ok(Some(reply)) => self.deliver(reply),
                        Ok(None) => {}
                        Err(err) => error!(category = "system", "failed to build reply: {err}"),
                    }
                }
            }
        }

        info!("Console messenger stopped.");

        Ok(())
    }
}
