//! Quiz session state machine.
//!
//! `intro -> quiz(0..N-1) -> calculating -> result`, with `restart` returning
//! to intro. The session is a pure reducer: it never sleeps or spawns. When it
//! enters `calculating` it hands back [`Effect::StartTimer`] carrying a fresh
//! epoch, and only a [`SessionEvent::TimerFired`] with that same epoch moves
//! it on. A timer that fires after a restart is ignored.

use std::collections::BTreeSet;

use super::catalog::{QuizDefinition, QuizKind};
use crate::scoring::{Answers, ConfigurationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Intro,
    Quiz(usize),
    Calculating,
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// Pick exactly one of `values`; picking advances
    Choice { values: Vec<String> },
    /// Free text, trimmed and cut to `max_len` characters
    Text { max_len: usize },
    /// Toggle any subset of `items`, then move on with Next
    Checklist { items: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub id: String,
    pub kind: StepKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    Answer { value: String },
    Toggle { item: String },
    Next,
    Back,
    TimerFired { epoch: u64 },
    Restart,
}

/// What the driver should do after an event has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    StartTimer { epoch: u64 },
    CancelTimer,
    ShowResult,
}

#[derive(Debug, Clone)]
pub struct Session {
    steps: Vec<Step>,
    allow_back: bool,
    phase: Phase,
    answers: Answers,
    checked: BTreeSet<String>,
    epoch: u64,
}

impl Session {
    pub fn new(steps: Vec<Step>, allow_back: bool) -> Result<Self, ConfigurationError> {
        if steps.is_empty() {
            return Err(ConfigurationError::NoQuestions);
        }
        Ok(Self {
            steps,
            allow_back,
            phase: Phase::Intro,
            answers: Answers::new(),
            checked: BTreeSet::new(),
            epoch: 0,
        })
    }

    /// Build the step list for a quiz definition.
    ///
    /// Trait-match quizzes are one choice per question with no way back.
    /// Checklists are one step per category. Pitch quizzes start with the
    /// free-text theme, followed by one choice per field.
    pub fn for_quiz(quiz: &QuizDefinition) -> Result<Self, ConfigurationError> {
        match &quiz.kind {
            QuizKind::TraitMatch(kind) => {
                let steps = kind
                    .questions
                    .iter()
                    .map(|q| Step {
                        id: q.id.clone(),
                        kind: StepKind::Choice {
                            values: q.options.iter().map(|o| o.value.clone()).collect(),
                        },
                    })
                    .collect();
                Self::new(steps, false)
            }
            QuizKind::Checklist(kind) => {
                let steps = kind
                    .categories
                    .iter()
                    .map(|c| Step {
                        id: c.key.clone(),
                        kind: StepKind::Checklist {
                            items: c.items.iter().map(|i| i.id.clone()).collect(),
                        },
                    })
                    .collect();
                Self::new(steps, true)
            }
            QuizKind::Pitch(kind) => {
                if kind.fields.is_empty() {
                    return Err(ConfigurationError::NoQuestions);
                }
                let mut steps = vec![Step {
                    id: PITCH_THEME_STEP.to_string(),
                    kind: StepKind::Text {
                        max_len: kind.theme.max_len,
                    },
                }];
                steps.extend(kind.fields.iter().map(|f| Step {
                    id: f.id.clone(),
                    kind: StepKind::Choice {
                        values: f.options.iter().map(|o| o.value.clone()).collect(),
                    },
                }));
                Self::new(steps, true)
            }
        }
    }

    pub fn apply(&mut self, event: SessionEvent) -> Effect {
        match (self.phase, event) {
            (Phase::Intro, SessionEvent::Start) => {
                self.phase = Phase::Quiz(0);
                Effect::None
            }

            (Phase::Quiz(i), SessionEvent::Answer { value }) => match &self.steps[i].kind {
                StepKind::Choice { values } if values.contains(&value) => {
                    let id = self.steps[i].id.clone();
                    self.answers.insert(id, value);
                    self.advance(i)
                }
                StepKind::Text { max_len } => {
                    let max_len = *max_len;
                    let text: String = value.trim().chars().take(max_len).collect();
                    if text.trim().is_empty() {
                        return Effect::None;
                    }
                    let id = self.steps[i].id.clone();
                    self.answers.insert(id, text.trim_end().to_string());
                    self.advance(i)
                }
                _ => Effect::None,
            },

            (Phase::Quiz(i), SessionEvent::Toggle { item }) => {
                if let StepKind::Checklist { items } = &self.steps[i].kind {
                    if items.contains(&item) && !self.checked.remove(&item) {
                        self.checked.insert(item);
                    }
                }
                Effect::None
            }

            (Phase::Quiz(i), SessionEvent::Next) => {
                let step = &self.steps[i];
                let ready = matches!(step.kind, StepKind::Checklist { .. })
                    || self.answers.contains_key(&step.id);
                if ready {
                    self.advance(i)
                } else {
                    Effect::None
                }
            }

            (Phase::Quiz(i), SessionEvent::Back) => {
                if self.allow_back && i > 0 {
                    self.phase = Phase::Quiz(i - 1);
                }
                Effect::None
            }

            (Phase::Calculating, SessionEvent::TimerFired { epoch }) if epoch == self.epoch => {
                self.phase = Phase::Result;
                Effect::ShowResult
            }

            (Phase::Intro, SessionEvent::Restart) => Effect::None,

            (_, SessionEvent::Restart) => {
                self.answers.clear();
                self.checked.clear();
                self.phase = Phase::Intro;
                self.epoch += 1;
                Effect::CancelTimer
            }

            _ => Effect::None,
        }
    }

    fn advance(&mut self, i: usize) -> Effect {
        if i + 1 < self.steps.len() {
            self.phase = Phase::Quiz(i + 1);
            Effect::None
        } else {
            self.epoch += 1;
            self.phase = Phase::Calculating;
            Effect::StartTimer { epoch: self.epoch }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_step(&self) -> Option<&Step> {
        match self.phase {
            Phase::Quiz(i) => self.steps.get(i),
            _ => None,
        }
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn answer(&self, step_id: &str) -> Option<&str> {
        self.answers.get(step_id).map(String::as_str)
    }

    pub fn checked(&self) -> &BTreeSet<String> {
        &self.checked
    }

    pub fn is_checked(&self, item: &str) -> bool {
        self.checked.contains(item)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn can_go_back(&self) -> bool {
        matches!(self.phase, Phase::Quiz(i) if self.allow_back && i > 0)
    }

    /// (1-based step number, total steps) while answering.
    pub fn progress(&self) -> Option<(usize, usize)> {
        match self.phase {
            Phase::Quiz(i) => Some((i + 1, self.steps.len())),
            _ => None,
        }
    }
}

/// Step id under which a pitch quiz stores its free-text theme.
pub const PITCH_THEME_STEP: &str = "theme";
