//! The static vocabulary: membership queries and challenge-word draws.

use std::collections::HashSet;
use std::path::Path;

use rand::prelude::IndexedRandom;

/// How many of the longest vocabulary entries form the challenge pool.
pub const DEFAULT_CHALLENGE_POOL: usize = 300;

/// A fixed word set loaded once at startup and shared read-only across
/// all rooms.
///
/// Alongside the membership set, the dictionary pre-ranks a pool of the
/// longest entries; every round's given word is drawn uniformly from that
/// pool, so challenges are long by construction.
pub struct Dictionary {
    words: HashSet<String>,
    challenge_pool: Vec<String>,
}

impl Dictionary {
    /// Builds a dictionary from an iterator of words. Entries are
    /// lowercased and trimmed; empty lines are skipped.
    pub fn from_words<I, S>(words: I, pool_size: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        let mut by_length: Vec<&String> = words.iter().collect();
        by_length.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.as_str().cmp(b.as_str()))
        });
        let challenge_pool = by_length
            .into_iter()
            .take(pool_size)
            .cloned()
            .collect();

        Self {
            words,
            challenge_pool,
        }
    }

    /// Loads a newline-separated word list from disk.
    ///
    /// A missing or unreadable file is a degraded mode, not a fatal error:
    /// the dictionary starts empty (every submission will be rejected as
    /// unrecognized) and a startup warning is logged.
    pub fn load(path: impl AsRef<Path>, pool_size: usize) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let dict = Self::from_words(contents.lines(), pool_size);
                tracing::info!(
                    path = %path.display(),
                    words = dict.len(),
                    pool = dict.challenge_pool.len(),
                    "dictionary loaded"
                );
                dict
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to load dictionary; starting with empty vocabulary, \
                     all words will be rejected"
                );
                Self::from_words(std::iter::empty::<&str>(), pool_size)
            }
        }
    }

    /// Exact membership query. The input must already be lowercased.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Draws a challenge word uniformly from the longest-word pool.
    /// `None` when the vocabulary is empty.
    pub fn pick_challenge(&self) -> Option<&str> {
        self.challenge_pool
            .choose(&mut rand::rng())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_lowercase_exact() {
        let dict = Dictionary::from_words(["Молоко", "ОКО"], 300);
        assert!(dict.contains("молоко"));
        assert!(dict.contains("око"));
        assert!(!dict.contains("Молоко"), "queries are pre-lowercased");
        assert!(!dict.contains("кот"));
    }

    #[test]
    fn test_challenge_pool_takes_longest_entries() {
        let dict = Dictionary::from_words(
            ["кот", "колокольчик", "молоко", "дом"],
            2,
        );
        // Pool of 2 → only the two longest words may be drawn.
        for _ in 0..20 {
            let word = dict.pick_challenge().unwrap();
            assert!(
                word == "колокольчик" || word == "молоко",
                "unexpected challenge {word}"
            );
        }
    }

    #[test]
    fn test_empty_dictionary_yields_no_challenge() {
        let dict = Dictionary::from_words(std::iter::empty::<&str>(), 300);
        assert!(dict.is_empty());
        assert_eq!(dict.pick_challenge(), None);
    }

    #[test]
    fn test_load_missing_file_degrades_to_empty() {
        let dict = Dictionary::load("/nonexistent/words.txt", 300);
        assert!(dict.is_empty());
        assert!(!dict.contains("молоко"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let dict = Dictionary::from_words(["", "  ", "дом"], 300);
        assert_eq!(dict.len(), 1);
    }
}
