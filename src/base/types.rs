use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// A reply the bot decided to send for an incoming message.
///
/// Text replies carry the chosen variant; media replies carry the resolved
/// filename reference into the corresponding media directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Reply {
    Text { text: String },
    Image { filename: String, caption: Option<String> },
    Audio { filename: String },
}
