#![cfg(test)]

use std::{fs, sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::mock;
use tempfile::TempDir;

use reply_bot::{
    base::{
        config::{Config, ConfigInner},
        error::Error,
        types::{Reply, Void},
    },
    interaction::incoming::Responder,
    relay::{self, LogCategory, LogLine},
    runtime::Runtime,
    service::{
        media::{GenericMediaStore, MediaClient, MediaKind},
        messenger::{GenericMessengerClient, MessengerClient},
        store::{GenericResponseStore, ResponseKind, ResponseRecord, StoreClient, UpsertMode},
    },
    worker::{StopFlag, Worker},
};

// Mocks.

// Mock messenger client for testing the worker boundary.

mock! {
    pub Messenger {}

    #[async_trait]
    impl GenericMessengerClient for Messenger {
        async fn run(&self, stop: StopFlag) -> Void;
    }
}

// Helpers.

/// Isolated environment: a temp dir and a config pointing into it.
struct TestEnv {
    dir: TempDir,
    config: Config,
}

/// Helper function to setup the test environment.
fn setup_test_environment() -> TestEnv {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let config = Config {
        inner: Arc::new(ConfigInner {
            responses_file: dir.path().join("responses.json"),
            images_dir: dir.path().join("media/images"),
            audio_dir: dir.path().join("media/audio"),
            log_file: dir.path().join("bot.log"),
            ..Default::default()
        }),
    };

    TestEnv { dir, config }
}

fn store_for(env: &TestEnv) -> StoreClient {
    StoreClient::json(&env.config.responses_file)
}

fn media_for(env: &TestEnv) -> MediaClient {
    MediaClient::fs(&env.config.images_dir, &env.config.audio_dir)
}

fn text_record(variants: &[&str]) -> ResponseRecord {
    ResponseRecord::Text {
        content: variants.iter().map(|v| v.to_string()).collect(),
    }
}

// Response store.

#[test]
fn upsert_then_list_shows_the_record() {
    let env = setup_test_environment();
    let store = store_for(&env);

    store.upsert("hello", text_record(&["Hi!", "Hey there!"]), UpsertMode::Add).unwrap();

    let rows = store.list().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].keyword, "hello");
    assert_eq!(rows[0].kind, ResponseKind::Text);
    assert_eq!(rows[0].preview, "Hi!, Hey there!");
}

#[test]
fn edit_past_two_variants_marks_the_preview_truncated() {
    let env = setup_test_environment();
    let store = store_for(&env);

    store.upsert("hello", text_record(&["Hi!", "Hey there!"]), UpsertMode::Add).unwrap();
    store.upsert("hello", text_record(&["Hi!", "Hey there!", "Yo!"]), UpsertMode::Edit).unwrap();

    let rows = store.list().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].preview, "Hi!, Hey there!...");
}

#[test]
fn add_mode_duplicate_fails_and_leaves_the_store_unchanged() {
    let env = setup_test_environment();
    let store = store_for(&env);

    store.upsert("hello", text_record(&["Hi!"]), UpsertMode::Add).unwrap();

    let result = store.upsert("hello", text_record(&["changed"]), UpsertMode::Add);
    assert!(matches!(result, Err(Error::DuplicateKey(_))));

    let rows = store.list().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].preview, "Hi!");
}

#[test]
fn delete_missing_keyword_fails_and_leaves_the_store_unchanged() {
    let env = setup_test_environment();
    let store = store_for(&env);

    store.upsert("hello", text_record(&["Hi!"]), UpsertMode::Add).unwrap();

    assert!(matches!(store.delete("goodbye"), Err(Error::NotFound(_))));

    let rows = store.list().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].keyword, "hello");
}

#[test]
fn delete_without_a_backing_file_is_not_found() {
    let env = setup_test_environment();
    let store = store_for(&env);

    assert!(matches!(store.delete("hello"), Err(Error::NotFound(_))));
}

#[test]
fn scalar_preview_truncates_at_fifty_characters() {
    let env = setup_test_environment();
    let store = store_for(&env);

    let long_name = format!("{}.png", "x".repeat(60));
    store
        .upsert("pic", ResponseRecord::Image { content: long_name.clone(), caption: None }, UpsertMode::Add)
        .unwrap();

    let rows = store.list().unwrap();
    let expected: String = long_name.chars().take(50).collect();
    assert_eq!(rows[0].preview, format!("{expected}..."));
}

#[test]
fn write_back_round_trips_the_document_in_order() {
    let env = setup_test_environment();
    let store = store_for(&env);

    let raw = r#"{
        "zeta": {"type": "text", "content": ["z one", "z two"]},
        "alpha": {"type": "image", "content": "cat.png", "caption": "a cat"},
        "mid": {"type": "audio", "content": "meow.mp3"}
    }"#;
    fs::write(&env.config.responses_file, raw).unwrap();

    let first = store.load().unwrap();

    // An edit-mode upsert with the identical record is a write-back of an
    // unmodified document.
    store.upsert("zeta", first.get("zeta").unwrap().clone(), UpsertMode::Edit).unwrap();

    let second = store.load().unwrap();
    assert_eq!(first, second);

    let keywords: Vec<_> = second.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keywords, ["zeta", "alpha", "mid"]);
}

#[test]
fn load_surfaces_missing_and_malformed_documents() {
    let env = setup_test_environment();
    let store = store_for(&env);

    assert!(matches!(store.load(), Err(Error::NotFound(_))));

    fs::write(&env.config.responses_file, "{ not json").unwrap();
    assert!(matches!(store.load(), Err(Error::Format(_))));
}

// Media library.

#[test]
fn listing_a_missing_directory_is_empty() {
    let env = setup_test_environment();
    let media = media_for(&env);

    assert_eq!(media.list(MediaKind::Image).unwrap(), Vec::<String>::new());
    assert_eq!(media.list(MediaKind::Audio).unwrap(), Vec::<String>::new());
}

#[test]
fn upload_stores_under_the_base_name_and_overwrites_silently() {
    let env = setup_test_environment();
    let media = media_for(&env);

    let source = env.dir.path().join("cat.png");
    fs::write(&source, b"first").unwrap();

    let stored = media.upload(MediaKind::Image, &source).unwrap();
    assert_eq!(stored, "cat.png");
    assert_eq!(media.list(MediaKind::Image).unwrap(), ["cat.png"]);

    // Same base name again: the existing file is replaced, not renamed.
    fs::write(&source, b"second").unwrap();
    media.upload(MediaKind::Image, &source).unwrap();

    assert_eq!(media.list(MediaKind::Image).unwrap(), ["cat.png"]);
    let stored_path = env.config.images_dir.join("cat.png");
    assert_eq!(fs::read(stored_path).unwrap(), b"second");
}

#[test]
fn delete_of_a_missing_media_file_is_not_found() {
    let env = setup_test_environment();
    let media = media_for(&env);

    assert!(matches!(media.delete(MediaKind::Audio, "ghost.mp3"), Err(Error::NotFound(_))));
}

#[test]
fn delete_removes_an_uploaded_file() {
    let env = setup_test_environment();
    let media = media_for(&env);

    let source = env.dir.path().join("meow.mp3");
    fs::write(&source, b"audio").unwrap();
    media.upload(MediaKind::Audio, &source).unwrap();

    media.delete(MediaKind::Audio, "meow.mp3").unwrap();
    assert_eq!(media.list(MediaKind::Audio).unwrap(), Vec::<String>::new());
}

// Log relay.

#[test]
fn relay_preserves_enqueue_order_within_a_producer() {
    let (relay, mut drain) = relay::channel();

    relay.enqueue(LogLine::incoming("L1"));
    relay.enqueue(LogLine::incoming("L2"));
    relay.enqueue(LogLine::incoming("L3"));

    assert_eq!(drain.drain_one().unwrap().message, "L1");
    assert_eq!(drain.drain_one().unwrap().message, "L2");
    assert_eq!(drain.drain_one().unwrap().message, "L3");
    assert!(drain.drain_one().is_none());
}

#[test]
fn relay_preserves_order_across_a_worker_thread() {
    let (relay, mut drain) = relay::channel();

    let producer = std::thread::spawn(move || {
        for i in 0..100 {
            relay.enqueue(LogLine::system(format!("line {i}")));
        }
    });
    producer.join().unwrap();

    for i in 0..100 {
        assert_eq!(drain.drain_one().unwrap().message, format!("line {i}"));
    }
    assert!(drain.drain_one().is_none());
}

// Reply path.

#[test]
fn responder_rotates_text_variants() {
    let env = setup_test_environment();
    let store = store_for(&env);
    store.upsert("hello", text_record(&["Hi!", "Hey there!"]), UpsertMode::Add).unwrap();

    let responder = Responder::new(store, media_for(&env));

    let first = responder.reply_to("tester", "well hello friend").unwrap().unwrap();
    let second = responder.reply_to("tester", "hello again").unwrap().unwrap();
    let third = responder.reply_to("tester", "hello once more").unwrap().unwrap();

    assert_eq!(first, Reply::Text { text: "Hi!".into() });
    assert_eq!(second, Reply::Text { text: "Hey there!".into() });
    assert_eq!(third, Reply::Text { text: "Hi!".into() });
}

#[test]
fn responder_is_quiet_without_a_match_or_a_store() {
    let env = setup_test_environment();
    let responder = Responder::new(store_for(&env), media_for(&env));

    // No store file at all: no responses yet, not an error.
    assert_eq!(responder.reply_to("tester", "anyone here?").unwrap(), None);

    store_for(&env).upsert("hello", text_record(&["Hi!"]), UpsertMode::Add).unwrap();
    assert_eq!(responder.reply_to("tester", "goodbye").unwrap(), None);
}

#[test]
fn responder_resolves_media_at_use_time() {
    let env = setup_test_environment();
    let store = store_for(&env);
    let media = media_for(&env);

    store
        .upsert("cat", ResponseRecord::Image { content: "cat.png".into(), caption: Some("a cat".into()) }, UpsertMode::Add)
        .unwrap();

    let responder = Responder::new(store, media.clone());

    // The backing file does not exist yet.
    assert!(matches!(responder.reply_to("tester", "send cat please"), Err(Error::NotFound(_))));

    let source = env.dir.path().join("cat.png");
    fs::write(&source, b"png").unwrap();
    media.upload(MediaKind::Image, &source).unwrap();

    let reply = responder.reply_to("tester", "send cat please").unwrap().unwrap();
    assert_eq!(
        reply,
        Reply::Image {
            filename: "cat.png".into(),
            caption: Some("a cat".into()),
        }
    );
}

// Worker boundary.

#[tokio::test]
async fn a_failing_messenger_surfaces_as_a_system_line() {
    let (relay, mut drain) = relay::channel();

    let mut mock = MockMessenger::new();
    mock.expect_run().returning(|_| Err(anyhow::anyhow!("connection refused")));

    let worker = Worker::spawn(MessengerClient::new(Arc::new(mock)), relay).unwrap();

    // Wait for the worker thread to wind down.
    let mut attempts = 0;
    while worker.is_running() && attempts < 200 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        attempts += 1;
    }
    assert!(!worker.is_running());

    let line = drain.drain_one().expect("expected a system line");
    assert_eq!(line.category, LogCategory::System);
    assert!(line.message.contains("connection refused"));
}

#[tokio::test]
async fn the_worker_stops_cooperatively() {
    let (relay, mut drain) = relay::channel();

    let mut mock = MockMessenger::new();
    mock.expect_run().returning(|stop| {
        while !stop.is_stopped() {
            std::thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    });

    let worker = Worker::spawn(MessengerClient::new(Arc::new(mock)), relay).unwrap();
    assert!(worker.is_running());

    worker.stop();

    // A clean exit leaves nothing on the feed.
    assert!(drain.drain_one().is_none());
}

// Runtime wiring.

#[tokio::test]
async fn the_runtime_wires_up_and_stops() {
    let env = setup_test_environment();
    let (relay, _drain) = relay::channel();

    let runtime = Runtime::new(env.config.clone(), relay).unwrap();
    let worker = runtime.start().unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    worker.stop();
}
