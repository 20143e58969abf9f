//! Load configuration via `config` crate with env-override support.

use std::{
    ops::Deref,
    path::PathBuf,
    sync::Arc,
};

use serde::Deserialize;

use super::types::Res;

/// Default path of the JSON response store.
fn default_responses_file() -> PathBuf {
    PathBuf::from("responses.json")
}

/// Default directory for image responses.
fn default_images_dir() -> PathBuf {
    PathBuf::from("media/images")
}

/// Default directory for audio responses.
fn default_audio_dir() -> PathBuf {
    PathBuf::from("media/audio")
}

/// Default path of the append-only log mirror.
fn default_log_file() -> PathBuf {
    PathBuf::from("bot.log")
}

/// Default drain poll interval for the shell, in milliseconds.
fn default_poll_interval_ms() -> u64 {
    100
}

/// Configuration for the reply-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Path of the JSON response store (`REPLY_BOT_RESPONSES_FILE`).
    #[serde(default = "default_responses_file")]
    pub responses_file: PathBuf,
    /// Directory holding image responses (`REPLY_BOT_IMAGES_DIR`).
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,
    /// Directory holding audio responses (`REPLY_BOT_AUDIO_DIR`).
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    /// Append-only log mirror (`REPLY_BOT_LOG_FILE`).
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// How often the shell polls the log relay, in milliseconds
    /// (`REPLY_BOT_POLL_INTERVAL_MS`). Value between 10 and 1000; the feed
    /// stays responsive without busy-spinning the consumer thread.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Messaging API application id (`REPLY_BOT_API_ID`), opaque to this crate.
    #[serde(default)]
    pub api_id: Option<String>,
    /// Messaging API hash (`REPLY_BOT_API_HASH`), opaque to this crate.
    #[serde(default)]
    pub api_hash: Option<String>,
    /// Account phone number (`REPLY_BOT_PHONE`), opaque to this crate.
    #[serde(default)]
    pub phone: Option<String>,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            responses_file: default_responses_file(),
            images_dir: default_images_dir(),
            audio_dir: default_audio_dir(),
            log_file: default_log_file(),
            poll_interval_ms: default_poll_interval_ms(),
            api_id: None,
            api_hash: None,
            phone: None,
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("REPLY_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new("config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name("config"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.poll_interval_ms < 10 || result.poll_interval_ms > 1000 {
            return Err(anyhow::anyhow!("Poll interval must be between 10 and 1000 milliseconds."));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        let inner = ConfigInner::default();

        assert_eq!(inner.responses_file, PathBuf::from("responses.json"));
        assert_eq!(inner.poll_interval_ms, 100);
        assert!(inner.api_id.is_none());
    }
}
