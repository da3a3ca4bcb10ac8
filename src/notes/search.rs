//! Listing filter: lock-state visibility plus case-insensitive substring search.

use super::types::Note;

/// Notes visible for the lock state that match `query`.
///
/// Locked: secret notes are dropped entirely. The query is matched against the
/// title and the content *as stored*, so a secret note's ciphertext is what
/// gets searched.
pub fn filter_notes<'a>(notes: &'a [Note], unlocked: bool, query: &str) -> Vec<&'a Note> {
    let query = query.to_lowercase();
    notes
        .iter()
        .filter(|n| unlocked || !n.secret)
        .filter(|n| {
            n.title.to_lowercase().contains(&query) || n.content.to_lowercase().contains(&query)
        })
        .collect()
}
