use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Running trait totals, keyed by trait name. Ordered so breakdowns print
/// the same way every run.
pub type TraitMap = BTreeMap<String, i64>;

/// Recorded answers: question id -> chosen option value.
pub type Answers = HashMap<String, String>;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub id: String,

    #[serde(default)]
    pub emoji: String,

    pub prompt: String,

    pub options: Vec<AnswerOption>,
}

/// One selectable answer. `traits` is sparse: anything not listed adds 0.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnswerOption {
    pub value: String,
    pub label: String,

    #[serde(default)]
    pub traits: BTreeMap<String, i32>,
}

impl Question {
    pub fn option(&self, value: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// Accumulate trait weights for the given answers.
///
/// Every trait mentioned by any option starts at 0. Unanswered questions and
/// unknown option values are skipped. Totals are floored at zero once all
/// answers are applied, so a negative weight can cancel a positive one but
/// never drive a trait below zero.
pub fn score(answers: &Answers, questions: &[Question]) -> TraitMap {
    let mut traits = TraitMap::new();

    for question in questions {
        for option in &question.options {
            for name in option.traits.keys() {
                traits.entry(name.clone()).or_insert(0);
            }
        }
    }

    for question in questions {
        let chosen = match answers.get(&question.id).and_then(|v| question.option(v)) {
            Some(option) => option,
            None => continue,
        };

        for (name, weight) in &chosen.traits {
            *traits.entry(name.clone()).or_insert(0) += i64::from(*weight);
        }
    }

    for total in traits.values_mut() {
        *total = (*total).max(0);
    }

    traits
}

/// Upper bound any single trait can reach: the largest weight seen in any
/// option times the number of questions.
pub fn trait_ceiling(questions: &[Question]) -> i64 {
    let max_weight = questions
        .iter()
        .flat_map(|q| q.options.iter())
        .flat_map(|o| o.traits.values())
        .map(|w| i64::from(*w))
        .max()
        .unwrap_or(0)
        .max(0);

    max_weight * questions.len() as i64
}
