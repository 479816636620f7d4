use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::quiz::{
    evaluate, share_links, share_text, share_url, Effect, Outcome, Phase, QuizDefinition, QuizKind, Session,
    SessionEvent, ShareLink, StepKind,
};

const FALLBACK_MESSAGE: &str = "Calculating...";

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Help,
    Breakdown,
    Share,
}

/// One row of the option list on a question screen.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionView {
    pub label: String,
    /// Chosen earlier (choice steps) or ticked (checklists)
    pub marked: bool,
    pub severity: Option<u32>,
}

pub struct StepView {
    pub emoji: String,
    pub prompt: String,
    pub options: Vec<OptionView>,
    pub placeholder: Option<String>,
}

pub struct App {
    pub quiz: QuizDefinition,
    pub session: Session,
    pub outcome: Option<Outcome>,
    pub cursor: usize,
    pub text_input: String,
    pub input_mode: InputMode,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
    pub spinner_frame: usize,
    pub message_index: usize,
    pub last_rotation: Instant,
    pub message_interval: Duration,
    pub calculating_delay: Duration,
    pub site_url: String,
    rng: StdRng,
}

impl App {
    /// `seed` pins every cosmetic draw so a run can be replayed.
    pub fn new(quiz: QuizDefinition, config: &Config, seed: Option<u64>) -> Result<Self> {
        let session = Session::for_quiz(&quiz)?;
        let message_interval = quiz.message_interval(config.message_interval()?);
        let calculating_delay = quiz.calculating_delay(config.calculating_delay()?);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            quiz,
            session,
            outcome: None,
            cursor: 0,
            text_input: String::new(),
            input_mode: InputMode::Normal,
            flash_message: None,
            should_quit: false,
            spinner_frame: 0,
            message_index: 0,
            last_rotation: Instant::now(),
            message_interval,
            calculating_delay,
            site_url: config.site_url.clone(),
            rng,
        })
    }

    /// Feed an event to the session and keep the screen state in step with it.
    pub fn dispatch(&mut self, event: SessionEvent) -> Effect {
        let before = self.session.phase();
        let effect = self.session.apply(event);

        match effect {
            Effect::StartTimer { .. } => {
                self.message_index = 0;
                self.last_rotation = Instant::now();
            }
            Effect::ShowResult => match evaluate(&self.quiz, &self.session, &mut self.rng) {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(e) => {
                    crate::buffered_eprintln!("Warning: could not score {}: {}", self.quiz.slug, e);
                    self.show_flash(format!("Could not score this run: {}", e));
                }
            },
            Effect::CancelTimer => {
                self.outcome = None;
                self.input_mode = InputMode::Normal;
            }
            Effect::None => {}
        }

        if self.session.phase() != before {
            self.enter_step();
        }
        effect
    }

    /// Put the cursor on the previous answer (if any) when a step is shown.
    fn enter_step(&mut self) {
        self.cursor = 0;
        self.text_input.clear();

        let Some(step) = self.session.current_step() else {
            return;
        };
        let previous = self.session.answer(&step.id).map(str::to_string);
        match &step.kind {
            StepKind::Choice { values } => {
                if let Some(prev) = previous {
                    self.cursor = values.iter().position(|v| *v == prev).unwrap_or(0);
                }
            }
            StepKind::Text { .. } => {
                self.text_input = previous.unwrap_or_default();
            }
            StepKind::Checklist { .. } => {}
        }
    }

    pub fn is_typing(&self) -> bool {
        matches!(
            self.session.current_step().map(|s| &s.kind),
            Some(StepKind::Text { .. })
        )
    }

    /// Prompt and options for the step being answered.
    pub fn step_view(&self) -> Option<StepView> {
        let Phase::Quiz(i) = self.session.phase() else {
            return None;
        };

        match &self.quiz.kind {
            QuizKind::TraitMatch(kind) => {
                let q = kind.questions.get(i)?;
                let chosen = self.session.answer(&q.id);
                Some(StepView {
                    emoji: q.emoji.clone(),
                    prompt: q.prompt.clone(),
                    options: q
                        .options
                        .iter()
                        .map(|o| OptionView {
                            label: o.label.clone(),
                            marked: chosen == Some(o.value.as_str()),
                            severity: None,
                        })
                        .collect(),
                    placeholder: None,
                })
            }
            QuizKind::Checklist(kind) => {
                let cat = kind.categories.get(i)?;
                Some(StepView {
                    emoji: cat.emoji.clone(),
                    prompt: cat.name.clone(),
                    options: cat
                        .items
                        .iter()
                        .map(|item| OptionView {
                            label: format!("{} {}", item.emoji, item.text),
                            marked: self.session.is_checked(&item.id),
                            severity: Some(item.severity),
                        })
                        .collect(),
                    placeholder: None,
                })
            }
            QuizKind::Pitch(kind) => {
                if i == 0 {
                    return Some(StepView {
                        emoji: self.quiz.emoji.clone(),
                        prompt: kind.theme.prompt.clone(),
                        options: Vec::new(),
                        placeholder: Some(kind.theme.placeholder.clone()),
                    });
                }
                let field = kind.fields.get(i - 1)?;
                let chosen = self.session.answer(&field.id);
                Some(StepView {
                    emoji: String::new(),
                    prompt: field.prompt.clone(),
                    options: field
                        .options
                        .iter()
                        .map(|o| OptionView {
                            label: o.label.clone(),
                            marked: chosen == Some(o.value.as_str()),
                            severity: None,
                        })
                        .collect(),
                    placeholder: None,
                })
            }
        }
    }

    fn option_count(&self) -> usize {
        match self.session.current_step().map(|s| &s.kind) {
            Some(StepKind::Choice { values }) => values.len(),
            Some(StepKind::Checklist { items }) => items.len(),
            _ => 0,
        }
    }

    pub fn next_option(&mut self) {
        let count = self.option_count();
        if count == 0 {
            return;
        }
        self.cursor = if self.cursor >= count - 1 { 0 } else { self.cursor + 1 };
    }

    pub fn previous_option(&mut self) {
        let count = self.option_count();
        if count == 0 {
            return;
        }
        self.cursor = if self.cursor == 0 { count - 1 } else { self.cursor - 1 };
    }

    /// Enter: start from the intro, answer a choice or text step, or move past
    /// a checklist page.
    pub fn confirm(&mut self) -> Effect {
        match self.session.phase() {
            Phase::Intro => self.dispatch(SessionEvent::Start),
            Phase::Quiz(_) => {
                let event = match self.session.current_step().map(|s| &s.kind) {
                    Some(StepKind::Choice { values }) => match values.get(self.cursor) {
                        Some(value) => SessionEvent::Answer { value: value.clone() },
                        None => return Effect::None,
                    },
                    Some(StepKind::Text { .. }) => {
                        if self.text_input.trim().is_empty() {
                            self.show_flash("Type something first".to_string());
                            return Effect::None;
                        }
                        SessionEvent::Answer {
                            value: self.text_input.clone(),
                        }
                    }
                    Some(StepKind::Checklist { .. }) => SessionEvent::Next,
                    None => return Effect::None,
                };
                self.dispatch(event)
            }
            Phase::Calculating | Phase::Result => Effect::None,
        }
    }

    /// Number keys jump straight to an option and pick it.
    pub fn pick_number(&mut self, n: usize) -> Effect {
        if n == 0 || n > self.option_count() {
            return Effect::None;
        }
        self.cursor = n - 1;
        match self.session.current_step().map(|s| &s.kind) {
            Some(StepKind::Checklist { .. }) => self.toggle_selected(),
            _ => self.confirm(),
        }
    }

    pub fn toggle_selected(&mut self) -> Effect {
        let item = match self.session.current_step().map(|s| &s.kind) {
            Some(StepKind::Checklist { items }) => items.get(self.cursor).cloned(),
            _ => None,
        };
        match item {
            Some(item) => self.dispatch(SessionEvent::Toggle { item }),
            None => Effect::None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(StepKind::Text { max_len }) = self.session.current_step().map(|s| &s.kind) {
            if self.text_input.chars().count() < *max_len {
                self.text_input.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        self.text_input.pop();
    }

    /// Rotate the calculating message once the interval has passed.
    pub fn rotate_message(&mut self, now: Instant) {
        if self.session.phase() != Phase::Calculating || self.quiz.calculating_messages.is_empty() {
            return;
        }
        if now.duration_since(self.last_rotation) >= self.message_interval {
            self.message_index = (self.message_index + 1) % self.quiz.calculating_messages.len();
            self.last_rotation = now;
        }
    }

    pub fn current_message(&self) -> &str {
        self.quiz
            .calculating_messages
            .get(self.message_index)
            .map(String::as_str)
            .unwrap_or(FALLBACK_MESSAGE)
    }

    pub fn share_links(&self) -> Vec<ShareLink> {
        match &self.outcome {
            Some(outcome) => {
                let text = share_text(&self.quiz, outcome);
                share_links(&text, &share_url(&self.site_url, &self.quiz))
            }
            None => Vec::new(),
        }
    }

    /// Open the n-th share link (1-based, as listed in the share popup).
    pub fn open_share(&mut self, n: usize) {
        let links = self.share_links();
        let Some(link) = n.checked_sub(1).and_then(|i| links.get(i)) else {
            return;
        };
        match crate::browser::open_url(&link.url) {
            Ok(()) => self.show_flash(format!("Opened {} share", link.network.name())),
            Err(e) => {
                crate::buffered_eprintln!("Share link for {}: {}", link.network.name(), link.url);
                self.show_flash(format!("Failed to open browser: {}", e));
            }
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn show_breakdown(&mut self) {
        if self.outcome.is_some() {
            self.input_mode = InputMode::Breakdown;
        }
    }

    pub fn show_share(&mut self) {
        if self.outcome.is_some() {
            self.input_mode = InputMode::Share;
        }
    }

    pub fn dismiss_popup(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Advance the calculating spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Catalog;

    fn app(slug: &str) -> App {
        let catalog = Catalog::builtin().unwrap();
        let quiz = catalog.quiz(slug).unwrap().clone();
        App::new(quiz, &Config::default(), Some(7)).unwrap()
    }

    fn finish(app: &mut App, effect: Effect) {
        let Effect::StartTimer { epoch } = effect else {
            panic!("expected the calculating timer, got {:?}", effect);
        };
        assert_eq!(app.dispatch(SessionEvent::TimerFired { epoch }), Effect::ShowResult);
    }

    #[test]
    fn test_trait_match_run() {
        let mut app = app("food");
        assert_eq!(app.confirm(), Effect::None);
        assert_eq!(app.session.phase(), Phase::Quiz(0));

        let steps = app.session.steps().len();
        let mut last = Effect::None;
        for _ in 0..steps {
            app.next_option();
            last = app.confirm();
        }
        assert_eq!(app.session.phase(), Phase::Calculating);
        finish(&mut app, last);

        assert!(matches!(app.outcome, Some(Outcome::Match(_))));
        assert_eq!(app.share_links().len(), 5);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut app = app("food");
        app.confirm();
        let count = app.step_view().unwrap().options.len();
        app.previous_option();
        assert_eq!(app.cursor, count - 1);
        app.next_option();
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_checklist_toggle_and_pages() {
        let mut app = app("redflags");
        app.confirm();

        app.pick_number(1);
        app.pick_number(3);
        let view = app.step_view().unwrap();
        assert!(view.options[0].marked);
        assert!(!view.options[1].marked);
        assert!(view.options[2].marked);
        assert!(view.options[0].severity.is_some());

        // Enter on a checklist page moves to the next category
        app.confirm();
        assert_eq!(app.session.phase(), Phase::Quiz(1));
        assert_eq!(app.cursor, 0);

        let mut last = Effect::None;
        while app.session.phase() != Phase::Calculating {
            last = app.confirm();
        }
        finish(&mut app, last);

        let Some(Outcome::Tiered(ref tiered)) = app.outcome else {
            panic!("expected a tiered outcome");
        };
        assert_eq!(tiered.total_checked, 2);
    }

    #[test]
    fn test_pitch_text_input() {
        let mut app = app("shitcoin");
        app.confirm();
        assert!(app.is_typing());

        // Blank input does not advance
        app.confirm();
        assert_eq!(app.session.phase(), Phase::Quiz(0));
        assert!(app.flash_message.is_some());

        for c in "doge".chars() {
            app.push_char(c);
        }
        app.push_char('x');
        app.pop_char();
        app.confirm();
        assert_eq!(app.session.answer("theme"), Some("doge"));
        assert!(!app.is_typing());

        // Going back restores the typed theme
        app.dispatch(SessionEvent::Back);
        assert_eq!(app.text_input, "doge");
    }

    #[test]
    fn test_restart_clears_outcome() {
        let mut app = app("food");
        app.confirm();
        let mut last = Effect::None;
        while app.session.phase() != Phase::Calculating {
            last = app.confirm();
        }
        finish(&mut app, last);
        app.show_breakdown();
        assert_eq!(app.input_mode, InputMode::Breakdown);

        assert_eq!(app.dispatch(SessionEvent::Restart), Effect::CancelTimer);
        assert!(app.outcome.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.session.phase(), Phase::Intro);
    }

    #[test]
    fn test_popups_need_an_outcome() {
        let mut app = app("food");
        app.show_share();
        app.show_breakdown();
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_message_rotation() {
        let mut app = app("food");
        let start = Instant::now();

        // Nothing rotates outside the calculating phase
        app.rotate_message(start + Duration::from_secs(10));
        assert_eq!(app.message_index, 0);

        app.confirm();
        while app.session.phase() != Phase::Calculating {
            app.confirm();
        }
        let first = app.current_message().to_string();
        let base = app.last_rotation;

        app.rotate_message(base + app.message_interval / 2);
        assert_eq!(app.current_message(), first);

        app.rotate_message(base + app.message_interval);
        assert_eq!(app.message_index, 1 % app.quiz.calculating_messages.len());
    }
}
