//! The host's ordered question list.

use quizcast_protocol::{AnswerOption, Question, QuestionId};
use serde::Deserialize;

use crate::GameError;

/// One question as authored, before ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionSpec {
    pub text: String,
    pub options: Vec<OptionSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OptionSpec {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl QuestionSpec {
    pub fn new(text: impl Into<String>, options: Vec<OptionSpec>) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }
}

impl OptionSpec {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

/// Questions in play order, each with a [`QuestionId`] assigned from 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Builds a bank, assigning ids in order.
    pub fn new(specs: impl IntoIterator<Item = QuestionSpec>) -> Self {
        let questions = specs
            .into_iter()
            .zip(1u32..)
            .map(|(spec, n)| {
                let options = spec
                    .options
                    .into_iter()
                    .map(|o| AnswerOption::new(o.text, o.is_correct))
                    .collect();
                Question::new(QuestionId(n), spec.text, options)
            })
            .collect();
        Self { questions }
    }

    /// Parses a JSON array of
    /// `{ "text": ..., "options": [{ "text": ..., "is_correct": ... }] }`.
    /// `is_correct` may be omitted on wrong options.
    pub fn from_json(data: &[u8]) -> Result<Self, GameError> {
        let specs: Vec<QuestionSpec> = serde_json::from_slice(data)?;
        Ok(Self::new(specs))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn first(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Play position of `id`.
    pub fn position(&self, id: QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_questions() -> QuestionBank {
        QuestionBank::new([
            QuestionSpec::new(
                "Same?",
                vec![OptionSpec::new("yes", true), OptionSpec::new("no", false)],
            ),
            QuestionSpec::new(
                "Same?",
                vec![OptionSpec::new("no", false), OptionSpec::new("yes", true)],
            ),
        ])
    }

    #[test]
    fn test_new_assigns_ids_from_one() {
        let bank = two_questions();
        let ids: Vec<_> = bank.iter().map(|q| q.id).collect();
        assert_eq!(ids, [QuestionId(1), QuestionId(2)]);
    }

    #[test]
    fn test_new_identical_text_still_distinct_positions() {
        let bank = two_questions();
        assert_eq!(bank.position(QuestionId(2)), Some(1));
        assert_eq!(bank.get(1).map(|q| q.correct_index), Some(1));
    }

    #[test]
    fn test_from_json_parses_and_defaults_is_correct() {
        let json = br#"[
            { "text": "Capital of France?",
              "options": [ { "text": "Lyon" }, { "text": "Paris", "is_correct": true } ] }
        ]"#;
        let bank = QuestionBank::from_json(json).unwrap();

        assert_eq!(bank.len(), 1);
        let q = bank.first().unwrap();
        assert_eq!(q.text, "Capital of France?");
        assert!(!q.options[0].is_correct);
        assert_eq!(q.correct_index, 1);
    }

    #[test]
    fn test_from_json_malformed_returns_invalid_bank() {
        let result = QuestionBank::from_json(b"{ not a list");
        assert!(matches!(result, Err(GameError::InvalidBank(_))));
    }

    #[test]
    fn test_empty_bank() {
        let bank = QuestionBank::new(Vec::new());
        assert!(bank.is_empty());
        assert!(bank.first().is_none());
    }
}
