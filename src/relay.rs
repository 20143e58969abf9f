//! Log relay between the worker thread and the shell's polling loop.
//!
//! [`LogRelay`] and [`LogDrain`] wrap an unbounded MPSC channel: any thread
//! may enqueue [`LogLine`]s, and a single consumer drains them with a
//! non-blocking pop on a fixed poll interval. Within one producer, drain
//! order matches enqueue order; across producers, whichever enqueues first
//! is read first.
//!
//! [`RelayLayer`] bridges `tracing` into the relay: events carrying a
//! `category` field (`incoming`, `outgoing`, `system`) become feed lines,
//! while everything else stays in the ordinary subscriber stack.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Local};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::field::{Field, Visit};
use tracing_subscriber::{Layer, layer::Context};

// Types.

/// Category tag of a feed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    /// A message received from the chat transport.
    Incoming,
    /// A reply the bot sent back.
    Outgoing,
    /// Lifecycle and error reporting.
    System,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
            Self::System => "system",
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "incoming" => Ok(Self::Incoming),
            "outgoing" => Ok(Self::Outgoing),
            "system" => Ok(Self::System),
            _ => Err(()),
        }
    }
}

/// A timestamped, categorised line of bot activity.
///
/// Ownership transfers entirely on enqueue; nothing is shared between the
/// producer and the consumer after hand-off.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub category: LogCategory,
    pub message: String,
}

impl LogLine {
    pub fn new(category: LogCategory, message: impl Into<String>) -> Self {
        Self {
            at: Local::now(),
            category,
            message: message.into(),
        }
    }

    pub fn incoming(message: impl Into<String>) -> Self {
        Self::new(LogCategory::Incoming, message)
    }

    pub fn outgoing(message: impl Into<String>) -> Self {
        Self::new(LogCategory::Outgoing, message)
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(LogCategory::System, message)
    }
}

impl fmt::Display for LogLine {
    // Feed rendering used by the headless shell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] {}", self.at.format("%H:%M:%S"), self.category, self.message)
    }
}

// Channel.

/// Creates a connected relay pair.
pub fn channel() -> (LogRelay, LogDrain) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LogRelay { tx }, LogDrain { rx })
}

/// Producer handle of the relay.
///
/// Trivially cloneable; enqueue from any thread.
#[derive(Clone)]
pub struct LogRelay {
    tx: UnboundedSender<LogLine>,
}

impl LogRelay {
    /// Appends a line to the feed.
    ///
    /// Never blocks and never fails; if the consumer is gone, the line is
    /// dropped.
    pub fn enqueue(&self, line: LogLine) {
        let _ = self.tx.send(line);
    }
}

/// Consumer handle of the relay, owned by the single polling thread.
pub struct LogDrain {
    rx: UnboundedReceiver<LogLine>,
}

impl LogDrain {
    /// Non-blocking pop; `None` when the buffer is currently empty.
    pub fn drain_one(&mut self) -> Option<LogLine> {
        self.rx.try_recv().ok()
    }
}

// Tracing bridge.

/// Subscriber layer that forwards `category`-tagged events into the relay.
///
/// Only events with a recognized `category` field value are forwarded;
/// operational tracing stays out of the feed.
pub struct RelayLayer {
    relay: LogRelay,
}

impl RelayLayer {
    pub fn new(relay: LogRelay) -> Self {
        Self { relay }
    }
}

impl<S: tracing::Subscriber> Layer<S> for RelayLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        if let Some(category) = visitor.category {
            self.relay.enqueue(LogLine::new(category, visitor.message));
        }
    }
}

#[derive(Default)]
struct LineVisitor {
    category: Option<LogCategory>,
    message: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "category" => self.category = value.parse().ok(),
            "message" => self.message = value.to_string(),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "category" => {
                let raw = format!("{value:?}");
                self.category = raw.trim_matches('"').parse().ok();
            }
            "message" => self.message = format!("{value:?}"),
            _ => {}
        }
    }
}
