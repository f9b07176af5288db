//! The scorecard store.
//!
//! On the host a [`Scoreboard`] is authoritative: answers are recorded
//! into it and it is broadcast every tick. On a player it is a mirror that
//! is only ever replaced wholesale by [`apply_snapshot`], which reports
//! whether anything visible actually changed.
//!
//! [`apply_snapshot`]: Scoreboard::apply_snapshot

use std::collections::HashMap;
use std::time::Duration;

use quizcast_protocol::{AnswerStatus, PlayerId, Scorecard};

/// An ordered set of scorecards, at most one per [`PlayerId`].
///
/// Insertion order is kept; it decides ties wherever ordering matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    cards: Vec<Scorecard>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps existing cards (e.g. a roster received in `GameStarted`).
    pub fn from_cards(cards: Vec<Scorecard>) -> Self {
        Self { cards }
    }

    /// Adds a card. Returns `false`, and changes nothing, if that player
    /// already has one.
    pub fn add(&mut self, card: Scorecard) -> bool {
        if self.get(card.player_id).is_some() {
            return false;
        }
        self.cards.push(card);
        true
    }

    /// Removes a player's card.
    pub fn remove(&mut self, player_id: PlayerId) -> Option<Scorecard> {
        let pos = self.cards.iter().position(|c| c.player_id == player_id)?;
        Some(self.cards.remove(pos))
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&Scorecard> {
        self.cards.iter().find(|c| c.player_id == player_id)
    }

    pub fn get_mut(&mut self, player_id: PlayerId) -> Option<&mut Scorecard> {
        self.cards.iter_mut().find(|c| c.player_id == player_id)
    }

    pub fn cards(&self) -> &[Scorecard] {
        &self.cards
    }

    /// A copy of every card, for a broadcast.
    pub fn snapshot(&self) -> Vec<Scorecard> {
        self.cards.clone()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Accumulates one answer into a player's totals.
    ///
    /// Score, time and correct count only ever grow; the status is
    /// overwritten. Returns `None` for an unknown player.
    pub fn record_answer(
        &mut self,
        player_id: PlayerId,
        is_correct: bool,
        answer_time: Duration,
        points: u32,
    ) -> Option<&Scorecard> {
        let card = self.get_mut(player_id)?;
        card.total_time += answer_time;
        card.total_score += points;
        if is_correct {
            card.total_correct_answers += 1;
            card.answer_status = AnswerStatus::AnsweredCorrectly;
        } else {
            card.answer_status = AnswerStatus::AnsweredIncorrectly;
        }
        Some(card)
    }

    /// Everyone back to `Unanswered`; totals untouched.
    pub fn reset_statuses(&mut self) {
        for card in &mut self.cards {
            card.answer_status = AnswerStatus::Unanswered;
        }
    }

    /// `true` when nobody is still `Unanswered` (and there is somebody).
    pub fn all_answered(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|c| !c.is_waiting())
    }

    /// Cards by descending score. Stable: equal scores keep insertion
    /// order.
    pub fn ordered_desc(&self) -> Vec<Scorecard> {
        let mut ordered = self.cards.clone();
        ordered.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        ordered
    }

    /// Sets exactly one leader: the first card in [`ordered_desc`] order.
    /// An empty board has no leader.
    ///
    /// [`ordered_desc`]: Scoreboard::ordered_desc
    pub fn recompute_leader(&mut self) -> Option<PlayerId> {
        let mut leader: Option<(usize, u32)> = None;
        for (i, card) in self.cards.iter().enumerate() {
            if leader.is_none_or(|(_, best)| card.total_score > best) {
                leader = Some((i, card.total_score));
            }
        }
        for (i, card) in self.cards.iter_mut().enumerate() {
            card.is_leader = leader.is_some_and(|(l, _)| l == i);
        }
        leader.map(|(i, _)| self.cards[i].player_id)
    }

    /// The card currently flagged as leader.
    pub fn leader(&self) -> Option<&Scorecard> {
        self.cards.iter().find(|c| c.is_leader)
    }

    /// Replaces the mirror with `cards` if they differ in anything a
    /// viewer can see. Returns whether it changed.
    pub fn apply_snapshot(&mut self, cards: Vec<Scorecard>) -> bool {
        if same_standings(&self.cards, &cards) {
            return false;
        }
        self.cards = cards;
        true
    }
}

/// What a viewer can see on one card; the player id is deliberately left
/// out.
type Standing<'a> = (&'a str, AnswerStatus, u32, Duration, u32, bool);

fn standing(card: &Scorecard) -> Standing<'_> {
    (
        card.player_name.as_str(),
        card.answer_status,
        card.total_correct_answers,
        card.total_time,
        card.total_score,
        card.is_leader,
    )
}

/// Order-insensitive comparison of two card sets by name, status, correct
/// count, total time, score and leader flag.
pub fn same_standings(a: &[Scorecard], b: &[Scorecard]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut counts: HashMap<Standing<'_>, i32> = HashMap::new();
    for card in a {
        *counts.entry(standing(card)).or_default() += 1;
    }
    for card in b {
        *counts.entry(standing(card)).or_default() -= 1;
    }
    counts.values().all(|&n| n == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: u64, name: &str, score: u32) -> Scorecard {
        let mut c = Scorecard::new(PlayerId(id), name);
        c.total_score = score;
        c
    }

    // =====================================================================
    // add() / remove()
    // =====================================================================

    #[test]
    fn test_add_duplicate_player_is_ignored() {
        let mut board = Scoreboard::new();
        assert!(board.add(card(1, "Ada", 0)));
        assert!(!board.add(card(1, "Ada again", 5)));
        assert_eq!(board.len(), 1);
        assert_eq!(board.cards()[0].player_name, "Ada");
    }

    #[test]
    fn test_add_same_name_different_id_keeps_both() {
        let mut board = Scoreboard::new();
        board.add(card(1, "Sam", 0));
        board.add(card(2, "Sam", 0));
        assert_eq!(board.len(), 2);

        board.remove(PlayerId(1));
        assert_eq!(board.cards()[0].player_id, PlayerId(2));
    }

    #[test]
    fn test_add_then_remove_restores_size() {
        let mut board = Scoreboard::new();
        board.add(card(1, "Ada", 0));
        board.add(card(2, "Bob", 0));
        board.remove(PlayerId(2));
        assert_eq!(board.len(), 1);
        assert!(board.remove(PlayerId(99)).is_none());
    }

    // =====================================================================
    // record_answer() / reset_statuses()
    // =====================================================================

    #[test]
    fn test_record_answer_accumulates_totals() {
        let mut board = Scoreboard::new();
        board.add(card(1, "Ada", 0));

        board.record_answer(PlayerId(1), true, Duration::from_secs(5), 9);
        board.reset_statuses();
        let c = board
            .record_answer(PlayerId(1), false, Duration::from_secs(3), 0)
            .unwrap();

        assert_eq!(c.total_score, 9);
        assert_eq!(c.total_correct_answers, 1);
        assert_eq!(c.total_time, Duration::from_secs(8));
        assert!(c.is_incorrect());
    }

    #[test]
    fn test_record_answer_unknown_player_returns_none() {
        let mut board = Scoreboard::new();
        assert!(board.record_answer(PlayerId(1), true, Duration::ZERO, 11).is_none());
    }

    #[test]
    fn test_reset_statuses_keeps_scores() {
        let mut board = Scoreboard::new();
        board.add(card(1, "Ada", 0));
        board.record_answer(PlayerId(1), true, Duration::from_secs(1), 10);

        board.reset_statuses();

        let c = board.get(PlayerId(1)).unwrap();
        assert!(c.is_waiting());
        assert_eq!(c.total_score, 10);
    }

    #[test]
    fn test_all_answered() {
        let mut board = Scoreboard::new();
        assert!(!board.all_answered());

        board.add(card(1, "Ada", 0));
        board.add(card(2, "Bob", 0));
        board.record_answer(PlayerId(1), true, Duration::ZERO, 11);
        assert!(!board.all_answered());
        board.record_answer(PlayerId(2), false, Duration::ZERO, 0);
        assert!(board.all_answered());
    }

    // =====================================================================
    // ordered_desc() / recompute_leader()
    // =====================================================================

    #[test]
    fn test_ordered_desc_is_stable_on_ties() {
        let board = Scoreboard::from_cards(vec![
            card(1, "Ada", 5),
            card(2, "Bob", 9),
            card(3, "Cy", 5),
        ]);
        let names: Vec<_> = board
            .ordered_desc()
            .into_iter()
            .map(|c| c.player_name)
            .collect();
        assert_eq!(names, ["Bob", "Ada", "Cy"]);
    }

    #[test]
    fn test_recompute_leader_picks_single_highest() {
        let mut board = Scoreboard::from_cards(vec![
            card(1, "Ada", 5),
            card(2, "Bob", 9),
            card(3, "Cy", 9),
        ]);
        assert_eq!(board.recompute_leader(), Some(PlayerId(2)));

        let leaders: Vec<_> = board.cards().iter().filter(|c| c.is_leader).collect();
        assert_eq!(leaders.len(), 1);
        assert_eq!(leaders[0].player_name, "Bob");
    }

    #[test]
    fn test_recompute_leader_moves_flag() {
        let mut board = Scoreboard::from_cards(vec![card(1, "Ada", 5), card(2, "Bob", 0)]);
        board.recompute_leader();
        board.record_answer(PlayerId(2), true, Duration::ZERO, 11);

        board.recompute_leader();

        assert_eq!(board.leader().map(|c| c.player_id), Some(PlayerId(2)));
        assert!(!board.get(PlayerId(1)).unwrap().is_leader);
    }

    #[test]
    fn test_recompute_leader_all_zero_still_one_leader() {
        let mut board = Scoreboard::from_cards(vec![card(1, "Ada", 0), card(2, "Bob", 0)]);
        assert_eq!(board.recompute_leader(), Some(PlayerId(1)));
    }

    #[test]
    fn test_recompute_leader_empty_has_none() {
        let mut board = Scoreboard::new();
        assert_eq!(board.recompute_leader(), None);
    }

    // =====================================================================
    // apply_snapshot() / same_standings()
    // =====================================================================

    #[test]
    fn test_apply_snapshot_same_twice_changes_once() {
        let mut mirror = Scoreboard::new();
        let snapshot = vec![card(1, "Ada", 3), card(2, "Bob", 1)];

        assert!(mirror.apply_snapshot(snapshot.clone()));
        assert!(!mirror.apply_snapshot(snapshot));
    }

    #[test]
    fn test_apply_snapshot_reordered_is_unchanged() {
        let mut mirror = Scoreboard::from_cards(vec![card(1, "Ada", 3), card(2, "Bob", 1)]);
        assert!(!mirror.apply_snapshot(vec![card(2, "Bob", 1), card(1, "Ada", 3)]));
    }

    #[test]
    fn test_apply_snapshot_status_change_is_changed() {
        let mut mirror = Scoreboard::from_cards(vec![card(1, "Ada", 3)]);
        let mut next = card(1, "Ada", 3);
        next.answer_status = AnswerStatus::AnsweredIncorrectly;
        assert!(mirror.apply_snapshot(vec![next]));
    }

    #[test]
    fn test_same_standings_is_a_multiset_comparison() {
        let a = vec![card(1, "Sam", 0), card(2, "Sam", 0), card(3, "Ada", 0)];
        let b = vec![card(1, "Sam", 0), card(3, "Ada", 0), card(4, "Ada", 0)];
        assert!(!same_standings(&a, &b));
    }

    #[test]
    fn test_same_standings_ignores_player_id() {
        assert!(same_standings(&[card(1, "Ada", 3)], &[card(7, "Ada", 3)]));
    }
}
