use rand::Rng;
use serde::Serialize;
use std::collections::BTreeSet;

use super::catalog::{ChecklistQuiz, QuizDefinition, QuizKind, TraitMatchQuiz};
use super::pitch::{self, Listing};
use super::session::Session;
use crate::scoring::{find_tier, normalize, score, select_result, Answers, ResultCandidate, Tier, TraitMap};

/// What a finished quiz hands to the result screen and the share builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Match(MatchOutcome),
    Tiered(TieredOutcome),
    Pitch(Listing),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub candidate: ResultCandidate,
    pub meter_label: String,
    /// Cosmetic percentage, not derived from the score
    pub meter: u64,
    pub traits: TraitMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub key: String,
    pub emoji: String,
    pub name: String,
    pub color: String,
    pub checked: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TieredOutcome {
    pub score_label: String,
    pub score: u8,
    pub severity: u32,
    pub max_severity: u32,
    pub tier: Tier,
    pub verdict: String,
    pub grade: Option<String>,
    pub categories: Vec<CategoryCount>,
    /// Index into `categories` of the one with the most checked items
    pub worst: usize,
    pub total_checked: usize,
}

impl TieredOutcome {
    pub fn worst_category(&self) -> Option<&CategoryCount> {
        self.categories.get(self.worst)
    }
}

/// Score a completed session. The rng covers every cosmetic draw: jitter,
/// meter, verdict, grade and listing details.
pub fn evaluate<R: Rng>(
    quiz: &QuizDefinition,
    session: &Session,
    rng: &mut R,
) -> Result<Outcome, crate::scoring::ConfigurationError> {
    evaluate_answers(quiz, session.answers(), session.checked(), rng)
}

/// Same as [`evaluate`] but from raw answers, for `dafuqbro score`.
pub fn evaluate_answers<R: Rng>(
    quiz: &QuizDefinition,
    answers: &Answers,
    checked: &BTreeSet<String>,
    rng: &mut R,
) -> Result<Outcome, crate::scoring::ConfigurationError> {
    match &quiz.kind {
        QuizKind::TraitMatch(kind) => evaluate_match(kind, answers, rng).map(Outcome::Match),
        QuizKind::Checklist(kind) => evaluate_checklist(kind, checked, rng).map(Outcome::Tiered),
        QuizKind::Pitch(kind) => pitch::generate(kind, answers, rng).map(Outcome::Pitch),
    }
}

fn evaluate_match<R: Rng>(
    quiz: &TraitMatchQuiz,
    answers: &Answers,
    rng: &mut R,
) -> Result<MatchOutcome, crate::scoring::ConfigurationError> {
    let traits = score(answers, &quiz.questions);
    let candidate = select_result(&traits, &quiz.results, || rng.gen::<f64>())?.clone();

    Ok(MatchOutcome {
        candidate,
        meter_label: quiz.meter_label.clone(),
        meter: quiz.meter.draw(rng),
        traits,
    })
}

fn evaluate_checklist<R: Rng>(
    quiz: &ChecklistQuiz,
    checked: &BTreeSet<String>,
    rng: &mut R,
) -> Result<TieredOutcome, crate::scoring::ConfigurationError> {
    let mut severity = 0;
    let mut categories = Vec::with_capacity(quiz.categories.len());

    for cat in &quiz.categories {
        let mut count = 0;
        for item in cat.items.iter().filter(|i| checked.contains(&i.id)) {
            severity += item.severity;
            count += 1;
        }
        categories.push(CategoryCount {
            key: cat.key.clone(),
            emoji: cat.emoji.clone(),
            name: cat.name.clone(),
            color: cat.color.clone(),
            checked: count,
            total: cat.items.len(),
        });
    }

    let max_severity = quiz.max_severity();
    let score = normalize(severity, max_severity);
    let tier = find_tier(score, &quiz.tiers)?;

    // Strictly greater, so the earliest category wins a tie
    let mut worst = 0;
    for (i, c) in categories.iter().enumerate() {
        if c.checked > categories[worst].checked {
            worst = i;
        }
    }

    Ok(TieredOutcome {
        score_label: quiz.score_label.clone(),
        score,
        severity,
        max_severity,
        verdict: tier.pick_verdict(rng).unwrap_or_default().to_string(),
        grade: tier.pick_grade(rng).map(str::to_string),
        tier: tier.clone(),
        total_checked: categories.iter().map(|c| c.checked).sum(),
        categories,
        worst,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::session::SessionEvent;
    use crate::quiz::Catalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    fn checklist(quiz: &QuizDefinition) -> &ChecklistQuiz {
        match &quiz.kind {
            QuizKind::Checklist(c) => c,
            _ => panic!("expected checklist"),
        }
    }

    #[test]
    fn test_no_flags_is_suspiciously_perfect() {
        let catalog = catalog();
        let quiz = catalog.quiz("redflags").unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let Outcome::Tiered(out) = evaluate_answers(quiz, &Answers::new(), &BTreeSet::new(), &mut rng).unwrap()
        else {
            panic!("expected tiered outcome");
        };
        assert_eq!(out.score, 0);
        assert_eq!(out.tier.label, "Suspiciously Perfect");
        assert_eq!(out.total_checked, 0);
        // All zero: first category is the worst
        assert_eq!(out.worst, 0);
        assert!(out.grade.is_none());
    }

    #[test]
    fn test_every_flag_is_max_tier() {
        let catalog = catalog();
        let quiz = catalog.quiz("redflags").unwrap();
        let all: BTreeSet<String> = checklist(quiz)
            .categories
            .iter()
            .flat_map(|c| c.items.iter().map(|i| i.id.clone()))
            .collect();
        let mut rng = StdRng::seed_from_u64(1);

        let Outcome::Tiered(out) = evaluate_answers(quiz, &Answers::new(), &all, &mut rng).unwrap() else {
            panic!("expected tiered outcome");
        };
        assert_eq!(out.score, 100);
        assert_eq!(out.tier.label, "Emotional Hazmat Zone");
        assert_eq!(out.total_checked, 48);
        assert_eq!(out.severity, out.max_severity);
        assert!(out.tier.verdicts.contains(&out.verdict));
    }

    #[test]
    fn test_worst_category_and_counts() {
        let catalog = catalog();
        let quiz = catalog.quiz("redflags").unwrap();
        let cats = &checklist(quiz).categories;

        // One in the first category, two in the third
        let mut picked = BTreeSet::new();
        picked.insert(cats[0].items[0].id.clone());
        picked.insert(cats[2].items[0].id.clone());
        picked.insert(cats[2].items[1].id.clone());

        let mut rng = StdRng::seed_from_u64(2);
        let Outcome::Tiered(out) = evaluate_answers(quiz, &Answers::new(), &picked, &mut rng).unwrap() else {
            panic!("expected tiered outcome");
        };
        assert_eq!(out.categories[0].checked, 1);
        assert_eq!(out.categories[2].checked, 2);
        assert_eq!(out.categories[2].total, 12);
        assert_eq!(out.worst_category().unwrap().key, cats[2].key);
        assert_eq!(out.total_checked, 3);
    }

    #[test]
    fn test_roast_has_grade() {
        let catalog = catalog();
        let quiz = catalog.quiz("roast").unwrap();
        let mut rng = StdRng::seed_from_u64(4);

        let Outcome::Tiered(out) = evaluate_answers(quiz, &Answers::new(), &BTreeSet::new(), &mut rng).unwrap()
        else {
            panic!("expected tiered outcome");
        };
        let grade = out.grade.unwrap();
        assert!(out.tier.grades.contains(&grade));
    }

    #[test]
    fn test_food_session_to_match() {
        let catalog = catalog();
        let quiz = catalog.quiz("food").unwrap();
        let mut session = Session::for_quiz(quiz).unwrap();
        session.apply(SessionEvent::Start);
        while let Some(step) = session.current_step().cloned() {
            let crate::quiz::session::StepKind::Choice { values } = step.kind else {
                panic!("food steps are choices");
            };
            session.apply(SessionEvent::Answer { value: values[0].clone() });
        }

        let mut rng = StdRng::seed_from_u64(8);
        let Outcome::Match(out) = evaluate(quiz, &session, &mut rng).unwrap() else {
            panic!("expected match outcome");
        };
        assert!((72..=95).contains(&out.meter));
        assert_eq!(out.meter_label, "Match");
        assert!(out.traits.values().all(|v| *v >= 0));
    }

    #[test]
    fn test_pitch_outcome() {
        let catalog = catalog();
        let quiz = catalog.quiz("shitcoin").unwrap();
        let answers: Answers = [("theme", "moon frogs"), ("vibe", "meme")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut rng = StdRng::seed_from_u64(8);
        let Outcome::Pitch(listing) = evaluate_answers(quiz, &answers, &BTreeSet::new(), &mut rng).unwrap() else {
            panic!("expected listing");
        };
        assert_eq!(listing.ticker, "$MOON");
        assert_eq!(listing.points, 3);
    }
}
