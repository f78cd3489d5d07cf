//! Shell transcript tests

mod common;

use common::*;
use tazanet_core::AgeClass;
use tazanet_gate::{run_shell, QueuedRecognizer};

async fn run(script: &str, recognizer: &QueuedRecognizer) -> String {
    let (gate, _) = ready_gate(AgeClass::Adult);
    let mut output = Vec::new();

    run_shell(&gate, recognizer, script.as_bytes(), &mut output)
        .await
        .unwrap();

    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn test_query_and_age_switch() {
    let out = run(
        "funny cats\n:age child\nyou are stupid\n:status\n",
        &QueuedRecognizer::default(),
    )
    .await;

    assert!(out.contains("[ADULT] SAFE -> https://www.youtube.com/results?search_query=funny+cats"));
    assert!(out.contains("Age class: CHILD"));
    assert!(out.contains("[CHILD] BLOCKED!\nReason: toxic (35%) | insult (35%)"));
    assert!(out.contains("Model: AI SECURE ONLINE | Age: CHILD"));
}

#[tokio::test]
async fn test_warning_is_rendered() {
    let out = run("you are stupid\n", &QueuedRecognizer::default()).await;

    assert!(out.contains(">>> WARNING: toxic (35%) | insult (35%) (Allowed for Adult)"));
}

#[tokio::test]
async fn test_listen_command() {
    let recognizer = QueuedRecognizer::new(["роблокс"]);
    let out = run(":listen\n:listen\n", &recognizer).await;

    assert!(out.contains("\"роблокс\"\n[ADULT] BLOCKED!\nReason: Blacklist (Manual Ban)"));
    assert!(out.contains("No query heard."));
}

#[tokio::test]
async fn test_quit_stops_reading() {
    let out = run("hello\n:quit\nnever decided\n", &QueuedRecognizer::default()).await;

    assert!(out.contains("search_query=hello"));
    assert!(!out.contains("never"));
}

#[tokio::test]
async fn test_history_and_invalid_commands() {
    let out = run(":history\nкровь\n:history\n:fly\n:age teen\n", &QueuedRecognizer::default()).await;

    assert!(out.contains("No queries yet."));
    assert!(out.contains("DENY  кровь (Blacklist (Manual Ban))"));
    assert!(out.contains("unknown command ':fly'"));
    assert!(out.contains("unknown age class 'teen'"));
}
