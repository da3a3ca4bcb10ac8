//! Extractive "AI Summarize" for note drafts.
//!
//! Texts under [`MIN_SUMMARY_CHARS`] characters, or with two sentences or
//! fewer, come back unchanged. Longer texts are reduced to their first two
//! sentences as a bulleted summary, and the usage ledger is charged for the
//! input and the output.

use crate::ledger::UsageLedger;

pub const MIN_SUMMARY_CHARS: usize = 50;
const SUMMARY_SENTENCES: usize = 2;
const SUMMARY_HEADER: &str = "✨ AI Summary:";

/// Split on `.`, `!` or `?` followed by whitespace or end of text.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let terminal = matches!(c, '.' | '!' | '?');
        let boundary = chars.peek().map_or(true, |next| next.is_whitespace());
        if terminal && boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

pub fn summarize(text: &str, usage: &UsageLedger) -> String {
    if text.chars().count() < MIN_SUMMARY_CHARS {
        return text.to_string();
    }

    let sentences = split_sentences(text);
    if sentences.len() <= SUMMARY_SENTENCES {
        return text.to_string();
    }

    let bullets: Vec<String> = sentences
        .iter()
        .take(SUMMARY_SENTENCES)
        .map(|s| format!("• {s}"))
        .collect();
    let summary = format!("{SUMMARY_HEADER}\n{}", bullets.join("\n"));

    usage.track_quietly(text);
    usage.track_quietly(&summary);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ledger(tmp: &TempDir) -> UsageLedger {
        UsageLedger::new(tmp.path().join("usage_stats.json"), 0.000125)
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let s = split_sentences("First one. Second one!  Third? trailing words");
        assert_eq!(s, vec!["First one.", "Second one!", "Third?", "trailing words"]);
    }

    #[test]
    fn decimal_points_do_not_split() {
        let s = split_sentences("Version 2.5 shipped. Done.");
        assert_eq!(s, vec!["Version 2.5 shipped.", "Done."]);
    }

    #[test]
    fn short_text_is_untouched_and_not_tracked() {
        let tmp = TempDir::new().unwrap();
        let usage = ledger(&tmp);
        assert_eq!(summarize("Too short. Really. Yes.", &usage), "Too short. Really. Yes.");
        assert!(usage.load().unwrap().is_none());
    }

    #[test]
    fn two_sentences_are_untouched() {
        let tmp = TempDir::new().unwrap();
        let text = "This note has exactly two sentences in it. It is long enough to qualify.";
        assert_eq!(summarize(text, &ledger(&tmp)), text);
    }

    #[test]
    fn long_text_keeps_first_two_sentences() {
        let tmp = TempDir::new().unwrap();
        let usage = ledger(&tmp);
        let text = "Plan the garden in March. Order seeds before April. \
                    Build the raised beds. Water daily in summer.";

        let summary = summarize(text, &usage);
        assert_eq!(
            summary,
            "✨ AI Summary:\n• Plan the garden in March.\n• Order seeds before April."
        );
        let stats = usage.load().unwrap().unwrap();
        assert!(stats.total_tokens > 0.0);
    }
}
