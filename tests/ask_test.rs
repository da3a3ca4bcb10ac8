mod helpers;

use helpers::{unlocked_vault, vault_with_ai, TEST_PIN};
use notevault::embedding::{Retrieval, NO_NOTES_MESSAGE};
use notevault::ledger::FeedbackStatus;
use notevault::notes::NoteDraft;
use notevault::Vault;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-2.5-flash-lite:generateContent";

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    }))
}

fn unlocked_with_ai(tmp: &TempDir, server: &MockServer) -> Vault {
    let mut vault = vault_with_ai(tmp, &server.uri(), Some("test-key"));
    vault.initialize(TEST_PIN, TEST_PIN).unwrap();
    vault.unlock(TEST_PIN).unwrap();
    vault
}

#[tokio::test]
async fn ask_sends_retrieved_context_and_records_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_string_contains("hunter2"))
        .and(body_string_contains("User Question: what is the wifi password?"))
        .respond_with(reply("The wifi password is hunter2."))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_with_ai(&tmp, &server);
    vault
        .save_note(NoteDraft::new("Home", "wifi password is hunter2").secret(true))
        .unwrap();
    assert!(vault.usage().unwrap().is_none());

    let answer = vault.ask("what is the wifi password?").await.unwrap();
    assert_eq!(answer.text, "The wifi password is hunter2.");
    assert!(answer.context.contains("wifi password is hunter2"));

    let stats = vault.usage().unwrap().expect("usage recorded");
    assert!(stats.total_tokens > 0.0);
    assert!(stats.total_cost > 0.0);
}

#[tokio::test]
async fn empty_vault_answers_without_calling_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_with_ai(&tmp, &server);

    let answer = vault.ask("anything there?").await.unwrap();
    assert_eq!(answer.retrieval, Retrieval::NoNotes);
    assert_eq!(answer.text, NO_NOTES_MESSAGE);
    assert!(vault.usage().unwrap().is_none());
}

#[tokio::test]
async fn missing_api_key_becomes_answer_text() {
    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_vault(&tmp);
    vault.save_note(NoteDraft::new("Shop", "grocery: milk")).unwrap();

    let answer = vault.ask("what do I need from the grocery?").await.unwrap();
    assert_eq!(answer.text, "⚠️ Error: GEMINI_API_KEY not found.");
    assert!(vault.usage().unwrap().is_none());
}

#[tokio::test]
async fn provider_error_becomes_answer_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_with_ai(&tmp, &server);
    vault.save_note(NoteDraft::new("Shop", "grocery: milk")).unwrap();

    let answer = vault.ask("grocery?").await.unwrap();
    assert!(answer.text.starts_with("❌ AI Engine Error:"), "{}", answer.text);
    assert!(answer.text.contains("429"));
    assert!(vault.usage().unwrap().is_none());
}

#[tokio::test]
async fn feedback_is_appended_with_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(reply("Milk."))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_with_ai(&tmp, &server);
    vault.save_note(NoteDraft::new("Shop", "grocery: milk")).unwrap();

    let first = vault.ask("grocery list?").await.unwrap();
    vault.record_feedback(&first, FeedbackStatus::Correct).unwrap();
    let second = vault.ask("milk?").await.unwrap();
    vault.record_feedback(&second, FeedbackStatus::Wrong).unwrap();

    let entries = vault.feedback_log().entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].query, "grocery list?");
    assert_eq!(entries[0].answer, "Milk.");
    assert_eq!(entries[0].context_used, "grocery: milk");
    assert_eq!(entries[0].status, FeedbackStatus::Correct);
    assert_eq!(entries[1].status, FeedbackStatus::Wrong);
}

#[test]
fn summarize_long_text_records_usage() {
    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_vault(&tmp);

    let short = vault.summarize("Too short to bother.");
    assert_eq!(short, "Too short to bother.");
    assert!(vault.usage().unwrap().is_none());

    let summary = vault.summarize(
        "The meeting moved to Thursday. Bring the quarterly numbers. Parking is closed. Lunch is provided.",
    );
    assert!(summary.starts_with("✨ AI Summary:\n• "), "{summary}");
    assert!(summary.contains("Thursday"));
    assert!(!summary.contains("Lunch"));
    assert!(vault.usage().unwrap().is_some());
}
