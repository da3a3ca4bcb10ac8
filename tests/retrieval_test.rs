mod helpers;

use std::sync::Arc;

use helpers::{test_config, unlocked_vault, KeywordEmbedder, TEST_PIN};
use notevault::Vault;
use notevault::embedding::Retrieval;
use notevault::notes::NoteDraft;
use notevault::VaultError;
use tempfile::TempDir;

fn texts_of(retrieval: Retrieval) -> Vec<String> {
    match retrieval {
        Retrieval::Matches(texts) => texts,
        Retrieval::NoNotes => panic!("expected matches"),
    }
}

#[test]
fn nearest_note_comes_first() {
    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_vault(&tmp);
    vault.save_note(NoteDraft::new("Home", "wifi password is hunter2")).unwrap();
    vault.save_note(NoteDraft::new("Shop", "grocery run: milk and bread")).unwrap();
    vault.save_note(NoteDraft::new("Study", "rust ownership chapter")).unwrap();

    let texts = texts_of(vault.retrieve("what is my wifi password?").unwrap());
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0], "wifi password is hunter2");
}

#[test]
fn secret_notes_are_searched_as_plaintext() {
    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_vault(&tmp);
    vault.save_note(NoteDraft::new("Shop", "grocery: milk")).unwrap();
    vault
        .save_note(NoteDraft::new("Health", "dentist on tuesday").secret(true))
        .unwrap();

    let texts = texts_of(vault.retrieve("when is the dentist").unwrap());
    assert_eq!(texts[0], "dentist on tuesday");
}

#[test]
fn fewer_notes_than_k_returns_all() {
    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_vault(&tmp);
    vault.save_note(NoteDraft::new("Only", "flight to Lisbon")).unwrap();

    let texts = texts_of(vault.retrieve("flight").unwrap());
    assert_eq!(texts, vec!["flight to Lisbon".to_string()]);
}

#[test]
fn empty_vault_has_no_notes() {
    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_vault(&tmp);
    let retrieval = vault.retrieve("anything").unwrap();
    assert_eq!(retrieval, Retrieval::NoNotes);
    assert_eq!(retrieval.context(), "No notes found to search.");
}

#[test]
fn retrieval_requires_unlock() {
    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_vault(&tmp);
    vault.save_note(NoteDraft::new("a", "wifi")).unwrap();
    vault.lock();
    assert!(matches!(vault.retrieve("wifi"), Err(VaultError::Locked)));
}

#[test]
fn new_notes_are_visible_to_the_next_query() {
    let tmp = TempDir::new().unwrap();
    let mut vault = unlocked_vault(&tmp);
    vault.save_note(NoteDraft::new("Shop", "grocery: milk")).unwrap();
    let before = texts_of(vault.retrieve("rust").unwrap());
    assert_eq!(before, vec!["grocery: milk".to_string()]);

    vault.save_note(NoteDraft::new("Study", "rust traits")).unwrap();
    let after = texts_of(vault.retrieve("rust").unwrap());
    assert_eq!(after[0], "rust traits");
}

#[test]
fn zero_top_k_still_returns_the_nearest_note() {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(tmp.path());
    config.retrieval.top_k = 0;
    let mut vault = Vault::open(config)
        .unwrap()
        .with_embedder(Arc::new(KeywordEmbedder::default()));
    vault.initialize(TEST_PIN, TEST_PIN).unwrap();
    vault.unlock(TEST_PIN).unwrap();
    vault.save_note(NoteDraft::new("Home", "wifi password is hunter2")).unwrap();
    vault.save_note(NoteDraft::new("Shop", "grocery: milk")).unwrap();

    let texts = texts_of(vault.retrieve("wifi").unwrap());
    assert_eq!(texts, vec!["wifi password is hunter2".to_string()]);
}
