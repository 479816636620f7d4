use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

use dafuqbro::quiz::{
    evaluate, evaluate_answers, share_links, share_text, share_url, validate_catalog, Catalog, Effect, Outcome,
    Phase, QuizKind, Session, SessionEvent, StepKind,
};
use dafuqbro::scoring::{find_tier, normalize, Answers};

/// Play a session to the result, picking the first value of every choice
/// step, typing `theme` into text steps and ticking nothing.
fn play_first_options(session: &mut Session, theme: &str) {
    assert_eq!(session.apply(SessionEvent::Start), Effect::None);

    let mut epoch = None;
    while let Some(step) = session.current_step().cloned() {
        let event = match step.kind {
            StepKind::Choice { values } => SessionEvent::Answer {
                value: values[0].clone(),
            },
            StepKind::Text { .. } => SessionEvent::Answer {
                value: theme.to_string(),
            },
            StepKind::Checklist { .. } => SessionEvent::Next,
        };
        if let Effect::StartTimer { epoch: e } = session.apply(event) {
            epoch = Some(e);
        }
    }

    assert_eq!(session.phase(), Phase::Calculating);
    let epoch = epoch.expect("last step should start the calculating timer");
    assert_eq!(session.apply(SessionEvent::TimerFired { epoch }), Effect::ShowResult);
    assert_eq!(session.phase(), Phase::Result);
}

fn checklist_ids(catalog: &Catalog, slug: &str, categories: &[&str]) -> BTreeSet<String> {
    let QuizKind::Checklist(ref quiz) = catalog.quiz(slug).unwrap().kind else {
        panic!("{} should be a checklist", slug);
    };
    quiz.categories
        .iter()
        .filter(|c| categories.contains(&c.key.as_str()))
        .flat_map(|c| c.items.iter().map(|i| i.id.clone()))
        .collect()
}

#[test]
fn builtin_catalog_is_valid() {
    let catalog = Catalog::builtin().unwrap();
    assert_eq!(validate_catalog(&catalog), Ok(()));
}

#[test]
fn every_quiz_plays_to_a_shareable_result() {
    let catalog = Catalog::builtin().unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    for quiz in &catalog.quizzes {
        let mut session = Session::for_quiz(quiz).unwrap();
        play_first_options(&mut session, "Moon Cats");

        let outcome = evaluate(quiz, &session, &mut rng).unwrap();
        let text = share_text(quiz, &outcome);
        assert!(!text.contains('{'), "{}: unfilled placeholder in {:?}", quiz.slug, text);

        let links = share_links(&text, &share_url("https://dafuqbro.com", quiz));
        assert_eq!(links.len(), 5);
        assert!(links.iter().all(|l| l.url.contains(&quiz.slug)));
    }
}

#[test]
fn restart_mid_calculation_drops_the_run() {
    let catalog = Catalog::builtin().unwrap();
    let quiz = catalog.quiz("energy").unwrap();
    let mut session = Session::for_quiz(quiz).unwrap();
    session.apply(SessionEvent::Start);

    let mut effect = Effect::None;
    while let Some(step) = session.current_step().cloned() {
        let StepKind::Choice { values } = step.kind else {
            panic!("energy is single choice");
        };
        effect = session.apply(SessionEvent::Answer {
            value: values[1].clone(),
        });
    }
    let Effect::StartTimer { epoch } = effect else {
        panic!("expected the calculating timer");
    };

    assert_eq!(session.apply(SessionEvent::Restart), Effect::CancelTimer);
    // The timer from the abandoned run lands after the restart
    assert_eq!(session.apply(SessionEvent::TimerFired { epoch }), Effect::None);
    assert_eq!(session.phase(), Phase::Intro);
    assert!(session.answers().is_empty());
}

#[test]
fn red_flags_one_full_category() {
    let catalog = Catalog::builtin().unwrap();
    let quiz = catalog.quiz("redflags").unwrap();
    let checked = checklist_ids(&catalog, "redflags", &["dating"]);
    assert_eq!(checked.len(), 12);

    let outcome = evaluate_answers(quiz, &Answers::new(), &checked, &mut StdRng::seed_from_u64(1)).unwrap();
    let Outcome::Tiered(t) = outcome else {
        panic!("expected a tiered outcome");
    };

    // 40 of 137 severity points
    assert_eq!(t.severity, 40);
    assert_eq!(t.max_severity, 137);
    assert_eq!(t.score, 29);
    assert_eq!(t.tier.label, "Proceed With Caution");
    assert_eq!(t.total_checked, 12);
    assert_eq!(t.worst_category().unwrap().key, "dating");
}

#[test]
fn red_flags_shipped_tiers_place_46_of_100() {
    let catalog = Catalog::builtin().unwrap();
    let QuizKind::Checklist(ref quiz) = catalog.quiz("redflags").unwrap().kind else {
        panic!("redflags should be a checklist");
    };

    let tier = find_tier(normalize(46, 100), &quiz.tiers).unwrap();
    assert_eq!(tier.label, "Walking Red Flag");
    assert_eq!(tier.color, "#fb923c");
}

#[test]
fn red_flags_tied_categories_report_the_first() {
    let catalog = Catalog::builtin().unwrap();
    let quiz = catalog.quiz("redflags").unwrap();
    let checked = checklist_ids(&catalog, "redflags", &["dating", "social"]);

    let outcome = evaluate_answers(quiz, &Answers::new(), &checked, &mut StdRng::seed_from_u64(2)).unwrap();
    let Outcome::Tiered(t) = outcome else {
        panic!("expected a tiered outcome");
    };

    assert_eq!(t.score, 58);
    assert_eq!(t.tier.label, "Walking Red Flag");
    assert_eq!(t.tier.color, "#fb923c");
    assert_eq!(t.categories[0].checked, t.categories[1].checked);
    assert_eq!(t.worst, 0);
    assert_eq!(t.total_checked, 24);
}

#[test]
fn pitch_listing_from_raw_answers() {
    let catalog = Catalog::builtin().unwrap();
    let quiz = catalog.quiz("shitcoin").unwrap();

    let mut answers = Answers::new();
    answers.insert("theme".to_string(), "doge but sadder".to_string());

    let outcome = evaluate_answers(quiz, &answers, &BTreeSet::new(), &mut StdRng::seed_from_u64(9)).unwrap();
    let Outcome::Pitch(ref listing) = outcome else {
        panic!("expected a listing");
    };
    assert_eq!(listing.ticker, "$DOGE");
    assert!(listing.coin_name.starts_with("Doge"));
    assert!(listing.score <= 100);
    assert!(share_text(quiz, &outcome).contains("$DOGE"));
}

#[test]
fn seeded_runs_are_reproducible() {
    let catalog = Catalog::builtin().unwrap();
    let quiz = catalog.quiz("food").unwrap();
    let mut session = Session::for_quiz(quiz).unwrap();
    play_first_options(&mut session, "");

    let a = evaluate(quiz, &session, &mut StdRng::seed_from_u64(5)).unwrap();
    let b = evaluate(quiz, &session, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn outcome_serializes_with_kind_tag() {
    let catalog = Catalog::builtin().unwrap();
    let quiz = catalog.quiz("roast").unwrap();
    let outcome = evaluate_answers(quiz, &Answers::new(), &BTreeSet::new(), &mut StdRng::seed_from_u64(3)).unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["kind"], "tiered");
    assert_eq!(json["score"], 0);
}
