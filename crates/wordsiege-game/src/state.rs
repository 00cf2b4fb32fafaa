//! The room's match aggregate: HP, used words, the pending-damage ledger,
//! server-side combo multipliers, and the end-of-match phase machine.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use wordsiege_protocol::{HpPair, PlayerId, RejectReason, Slot, WordScore};

use crate::judge::{self, Verdict};
use crate::{Dictionary, scorer};

/// Starting hit points per castle.
pub const STARTING_HP: u32 = 100;

/// Combo growth per accepted word.
const COMBO_STEP: f64 = 0.2;
/// Multiplicative decay applied per 100 ms without an accepted word.
const COMBO_DECAY_PER_100MS: f64 = 0.999;

/// A judged-but-unconfirmed hit awaiting the submitter's confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDamage {
    pub damage: u32,
    pub target: Slot,
}

/// Where the match is in its lifecycle. `Ended` is entered exactly once
/// per round; a restart returns to `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Ended { winner: Option<Slot> },
}

/// Result of a word submission, final damage included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Accepted { word: String, damage: u32 },
    Rejected { reason: RejectReason },
}

/// Result of committing a pending hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    Applied { hp: HpPair },
    Ended { hp: HpPair, winner: Option<Slot> },
}

/// Per-slot word listings for post-game stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchStats {
    pub your_unique_words: Vec<WordScore>,
    pub opponent_unique_words: Vec<WordScore>,
    pub common_words: Vec<WordScore>,
}

/// The server-authoritative combo multiplier for one slot.
///
/// Grows by [`COMBO_STEP`] per accepted word, resets to 1.0 on a rejected
/// one, and decays multiplicatively with time since the last accepted
/// word — the same curve the presentation layer animates, but owned here
/// so the client never supplies a magnitude.
#[derive(Debug, Clone, Copy)]
struct Combo {
    value: f64,
    last_accept: Option<Instant>,
}

impl Combo {
    fn new() -> Self {
        Self {
            value: 1.0,
            last_accept: None,
        }
    }

    fn current(&self, now: Instant) -> f64 {
        let Some(last) = self.last_accept else {
            return self.value;
        };
        let elapsed_ms = now.saturating_duration_since(last).as_millis() as f64;
        (self.value * COMBO_DECAY_PER_100MS.powf(elapsed_ms / 100.0)).max(1.0)
    }

    fn on_accept(&mut self, now: Instant) {
        self.value = self.current(now) + COMBO_STEP;
        self.last_accept = Some(now);
    }

    fn reset(&mut self) {
        self.value = 1.0;
        self.last_accept = None;
    }
}

/// All mutable state of one round. Owned exclusively by the room actor;
/// no locking here.
pub struct MatchState {
    given_word: String,
    hp: HpPair,
    used: [HashSet<String>; 2],
    pending: HashMap<PlayerId, PendingDamage>,
    combos: [Combo; 2],
    phase: Phase,
}

impl MatchState {
    pub fn new(given_word: impl Into<String>) -> Self {
        Self {
            given_word: given_word.into().to_lowercase(),
            hp: HpPair {
                player1: STARTING_HP,
                player2: STARTING_HP,
            },
            used: [HashSet::new(), HashSet::new()],
            pending: HashMap::new(),
            combos: [Combo::new(), Combo::new()],
            phase: Phase::Playing,
        }
    }

    pub fn given_word(&self) -> &str {
        &self.given_word
    }

    pub fn hp(&self) -> HpPair {
        self.hp
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended { .. })
    }

    /// The slot's current combo multiplier at `now`.
    pub fn multiplier(&self, slot: Slot, now: Instant) -> f64 {
        self.combos[slot.index()].current(now)
    }

    #[cfg(test)]
    pub(crate) fn pending_for(&self, player: PlayerId) -> Option<PendingDamage> {
        self.pending.get(&player).copied()
    }

    /// Judges a submission and, on acceptance, records the word as used
    /// and replaces the submitter's pending entry.
    ///
    /// The word is marked used the moment it is accepted — before the
    /// damage is confirmed — so it can never be resubmitted this round,
    /// even if the pending entry is later overwritten or cancelled.
    /// Returns `None` once the match has ended (no judging until restart).
    pub fn submit(
        &mut self,
        dictionary: &Dictionary,
        player: PlayerId,
        slot: Slot,
        raw: &str,
        now: Instant,
    ) -> Option<Submission> {
        if self.is_ended() {
            return None;
        }

        let used = &self.used[slot.index()];
        let verdict = judge::judge(
            dictionary,
            &self.given_word,
            &|w: &str| used.contains(w),
            raw,
        );

        Some(match verdict {
            Verdict::Accepted { word, damage } => {
                self.used[slot.index()].insert(word.clone());

                let combo = &mut self.combos[slot.index()];
                let multiplier = combo.current(now);
                combo.on_accept(now);
                let damage = ((damage as f64 * multiplier).floor() as u32).max(1);

                // A newer accepted word discards an unconfirmed older hit:
                // only the most recent one may land.
                self.pending.insert(
                    player,
                    PendingDamage {
                        damage,
                        target: slot.opponent(),
                    },
                );

                Submission::Accepted { word, damage }
            }
            Verdict::Rejected(reason) => {
                self.combos[slot.index()].reset();
                Submission::Rejected { reason }
            }
        })
    }

    /// Commits the submitter's pending damage, if any.
    ///
    /// A confirmation with no matching entry (late, duplicate, after a
    /// restart or disconnect) is a benign no-op and returns `None`.
    /// Reaching zero HP ends the match exactly once; the winner is the
    /// slot whose HP is still positive, or a draw when both are down.
    pub fn confirm(&mut self, player: PlayerId) -> Option<HitResult> {
        if self.is_ended() {
            return None;
        }
        let pending = self.pending.remove(&player)?;

        let remaining = self.hp.get(pending.target).saturating_sub(pending.damage);
        self.hp.set(pending.target, remaining);

        if self.hp.player1 == 0 || self.hp.player2 == 0 {
            let winner = match (self.hp.player1, self.hp.player2) {
                (0, 0) => None,
                (0, _) => Some(Slot::Player2),
                (_, 0) => Some(Slot::Player1),
                _ => unreachable!(),
            };
            self.phase = Phase::Ended { winner };
            // Pending hits never leak across the end of a round.
            self.pending.clear();
            Some(HitResult::Ended {
                hp: self.hp,
                winner,
            })
        } else {
            Some(HitResult::Applied { hp: self.hp })
        }
    }

    /// Discards a player's unconfirmed hit, e.g. on disconnect.
    pub fn cancel_pending(&mut self, player: PlayerId) {
        self.pending.remove(&player);
    }

    /// Re-initializes the round with a fresh challenge word: full HP,
    /// cleared used sets, empty pending ledger, reset combos.
    pub fn restart(&mut self, given_word: impl Into<String>) {
        *self = MatchState::new(given_word);
    }

    /// Word listings for the requesting slot, damage recomputed against
    /// the *current* given word. Only meaningful before a restart — the
    /// room actor serializes stats requests ahead of any restart intent,
    /// so the given word here is the one the listed words were played
    /// under.
    pub fn stats(&self, slot: Slot) -> MatchStats {
        let yours = &self.used[slot.index()];
        let theirs = &self.used[slot.opponent().index()];

        let score_sorted = |words: Vec<&String>| -> Vec<WordScore> {
            let mut scored: Vec<WordScore> = words
                .into_iter()
                .map(|w| WordScore {
                    word: w.clone(),
                    damage: scorer::score(&self.given_word, w),
                })
                .collect();
            scored.sort_by(|a, b| {
                b.damage.cmp(&a.damage).then_with(|| a.word.cmp(&b.word))
            });
            scored
        };

        MatchStats {
            your_unique_words: score_sorted(
                yours.iter().filter(|w| !theirs.contains(*w)).collect(),
            ),
            opponent_unique_words: score_sorted(
                theirs.iter().filter(|w| !yours.contains(*w)).collect(),
            ),
            common_words: score_sorted(
                yours.iter().filter(|w| theirs.contains(*w)).collect(),
            ),
        }
    }
}
