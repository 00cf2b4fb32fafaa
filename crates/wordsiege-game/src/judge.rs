//! Word validation: the ordered checks a submission must pass.

use std::collections::HashMap;

use wordsiege_protocol::RejectReason;

use crate::Dictionary;
use crate::scorer;

/// The outcome of judging a submitted word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The word passed every check. Carries the normalized word and the
    /// base damage (before the combo multiplier).
    Accepted { word: String, damage: u32 },
    /// The word failed; the reason names the first check that failed.
    Rejected(RejectReason),
}

/// Returns `true` when every letter of `candidate` occurs in `given` at
/// least as many times as in the candidate (multiset containment).
pub fn can_form(given: &str, candidate: &str) -> bool {
    let mut available: HashMap<char, usize> = HashMap::new();
    for c in given.chars() {
        *available.entry(c).or_insert(0) += 1;
    }
    for c in candidate.chars() {
        match available.get_mut(&c) {
            Some(n) if *n > 0 => *n -= 1,
            _ => return false,
        }
    }
    true
}

/// Validates `raw` against the round's given word and the slot's used-word
/// set. Checks run in a fixed order and the first failure wins:
/// normalize → length → given-word reuse → already-used → letter
/// availability → dictionary membership.
///
/// The caller records an accepted word as used immediately — acceptance is
/// final even if the resulting damage is later discarded.
pub fn judge(
    dictionary: &Dictionary,
    given_word: &str,
    used_words: &impl Fn(&str) -> bool,
    raw: &str,
) -> Verdict {
    let word = raw.trim().to_lowercase();

    if word.chars().count() < 3 {
        return Verdict::Rejected(RejectReason::TooShort);
    }
    if word == given_word.to_lowercase() {
        return Verdict::Rejected(RejectReason::GivenWord);
    }
    if used_words(&word) {
        return Verdict::Rejected(RejectReason::AlreadyUsed);
    }
    if !can_form(given_word, &word) {
        return Verdict::Rejected(RejectReason::NotFormable);
    }
    if !dictionary.contains(&word) {
        return Verdict::Rejected(RejectReason::NotInDictionary);
    }

    let damage = scorer::score(given_word, &word);
    Verdict::Accepted { word, damage }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> Dictionary {
        Dictionary::from_words(["око", "кол", "лом", "молоко", "оклом"], 300)
    }

    fn no_used(_: &str) -> bool {
        false
    }

    #[test]
    fn test_can_form_respects_letter_counts() {
        assert!(can_form("молоко", "око"));
        assert!(can_form("молоко", "кол"));
        // "м" occurs once in the given word; four are over-use.
        assert!(!can_form("молоко", "мммм"));
        // Letter absent entirely.
        assert!(!can_form("молоко", "кот"));
    }

    #[test]
    fn test_judge_accepts_borderline_length() {
        let verdict = judge(&dict(), "молоко", &no_used, "око");
        assert!(matches!(verdict, Verdict::Accepted { .. }));
    }

    #[test]
    fn test_judge_rejects_short_word_first() {
        // Two letters — fails the length check before anything else.
        let verdict = judge(&dict(), "молоко", &no_used, "ок");
        assert_eq!(verdict, Verdict::Rejected(RejectReason::TooShort));
    }

    #[test]
    fn test_judge_rejects_given_word_case_insensitive() {
        let verdict = judge(&dict(), "молоко", &no_used, "МОЛОКО");
        assert_eq!(verdict, Verdict::Rejected(RejectReason::GivenWord));
    }

    #[test]
    fn test_judge_rejects_already_used() {
        let used = |w: &str| w == "око";
        let verdict = judge(&dict(), "молоко", &used, "Око");
        assert_eq!(verdict, Verdict::Rejected(RejectReason::AlreadyUsed));
    }

    #[test]
    fn test_judge_rejects_overused_letters() {
        let verdict = judge(&dict(), "молоко", &no_used, "мммм");
        assert_eq!(verdict, Verdict::Rejected(RejectReason::NotFormable));
    }

    #[test]
    fn test_judge_checks_formability_before_dictionary() {
        // "ммм" is formable-failing AND absent from the dictionary;
        // the formability reason must win (check order).
        let verdict = judge(&dict(), "молоко", &no_used, "ммм");
        assert_eq!(verdict, Verdict::Rejected(RejectReason::NotFormable));
    }

    #[test]
    fn test_judge_rejects_unknown_word() {
        // "мол" is formable from "молоко" but not in the vocabulary.
        let verdict = judge(&dict(), "молоко", &no_used, "мол");
        assert_eq!(verdict, Verdict::Rejected(RejectReason::NotInDictionary));
    }

    #[test]
    fn test_judge_normalizes_input() {
        let verdict = judge(&dict(), "молоко", &no_used, "  КОЛ  ");
        match verdict {
            Verdict::Accepted { word, damage } => {
                assert_eq!(word, "кол");
                assert!(damage >= 1);
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_dictionary_rejects_everything() {
        let empty = Dictionary::from_words(std::iter::empty::<&str>(), 300);
        let verdict = judge(&empty, "молоко", &no_used, "око");
        assert_eq!(verdict, Verdict::Rejected(RejectReason::NotInDictionary));
    }
}
