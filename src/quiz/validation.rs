use std::collections::HashSet;

use super::catalog::{
    parse_hex_color, Catalog, ChecklistQuiz, PitchQuiz, QuizDefinition, QuizKind, SpanRule,
    TraitMatchQuiz,
};
use crate::scoring::{check_coverage, ConfigurationError, Tier};

/// Validate the whole catalog at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_catalog(catalog: &Catalog) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let mut slugs = HashSet::new();
    for tool in &catalog.tools {
        if !slugs.insert(tool.slug.as_str()) {
            errors.push(format!("tools.{}: duplicate slug", tool.slug));
        }
        match catalog.accents.get(&tool.accent) {
            None => errors.push(format!(
                "tools.{}.accent: unknown accent '{}'",
                tool.slug, tool.accent
            )),
            Some(hex) if parse_hex_color(hex).is_none() => errors.push(format!(
                "accents.{}: invalid color '{}'",
                tool.accent, hex
            )),
            Some(_) => {}
        }
        if tool.active && catalog.quiz(&tool.slug).is_none() {
            errors.push(format!("tools.{}: active but no quiz data", tool.slug));
        }
    }

    let mut quiz_slugs = HashSet::new();
    for quiz in &catalog.quizzes {
        if !quiz_slugs.insert(quiz.slug.as_str()) {
            errors.push(format!("{}: duplicate quiz slug", quiz.slug));
        }
        if catalog.tool(&quiz.slug).is_none() {
            errors.push(format!("{}: missing from tools.yaml", quiz.slug));
        }
        validate_quiz(quiz, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a single quiz definition, appending problems to `errors`.
pub fn validate_quiz(quiz: &QuizDefinition, errors: &mut Vec<String>) {
    let at = quiz.slug.as_str();

    if quiz.slug.trim().is_empty() {
        errors.push("quiz slug must not be empty".to_string());
    }
    if quiz.calculating_messages.is_empty() {
        errors.push(format!("{}.calculating_messages: must not be empty", at));
    }
    check_color(&format!("{}.accent", at), &quiz.accent, errors);

    match &quiz.kind {
        QuizKind::TraitMatch(kind) => validate_trait_match(at, kind, errors),
        QuizKind::Checklist(kind) => validate_checklist(at, kind, errors),
        QuizKind::Pitch(kind) => validate_pitch(at, kind, errors),
    }
}

fn validate_trait_match(at: &str, quiz: &TraitMatchQuiz, errors: &mut Vec<String>) {
    let declared: HashSet<&str> = quiz.traits.iter().map(String::as_str).collect();

    if quiz.questions.is_empty() {
        errors.push(format!("{}: {}", at, ConfigurationError::NoQuestions));
    }
    if quiz.results.is_empty() {
        errors.push(format!("{}: {}", at, ConfigurationError::NoCandidates));
    }
    if quiz.meter.min > quiz.meter.max {
        errors.push(format!("{}.meter: min is above max", at));
    }

    let mut question_ids = HashSet::new();
    for (qi, question) in quiz.questions.iter().enumerate() {
        if !question_ids.insert(question.id.as_str()) {
            errors.push(format!("{}.questions[{}]: duplicate id '{}'", at, qi, question.id));
        }
        if question.options.is_empty() {
            errors.push(format!("{}.questions[{}]: no options", at, qi));
        }

        let mut values = HashSet::new();
        for (oi, option) in question.options.iter().enumerate() {
            if !values.insert(option.value.as_str()) {
                errors.push(format!(
                    "{}.questions[{}].options[{}]: duplicate value '{}'",
                    at, qi, oi, option.value
                ));
            }
            for name in option.traits.keys() {
                if !declared.contains(name.as_str()) {
                    errors.push(format!(
                        "{}.questions[{}].options[{}]: unknown trait '{}'",
                        at, qi, oi, name
                    ));
                }
            }
        }
    }

    let mut result_ids = HashSet::new();
    for (ri, result) in quiz.results.iter().enumerate() {
        if !result_ids.insert(result.id.as_str()) {
            errors.push(format!("{}.results[{}]: duplicate id '{}'", at, ri, result.id));
        }
        let count = result.dominant_traits.len();
        if !(2..=3).contains(&count) {
            errors.push(format!(
                "{}.results[{}].dominant_traits: expected 2-3 traits, found {}",
                at, ri, count
            ));
        }
        for name in &result.dominant_traits {
            if !declared.contains(name.as_str()) {
                errors.push(format!(
                    "{}.results[{}].dominant_traits: unknown trait '{}'",
                    at, ri, name
                ));
            }
        }
        check_color(&format!("{}.results[{}].color", at, ri), &result.color, errors);
    }
}

fn validate_checklist(at: &str, quiz: &ChecklistQuiz, errors: &mut Vec<String>) {
    if quiz.categories.is_empty() {
        errors.push(format!("{}: {}", at, ConfigurationError::NoQuestions));
    }

    let mut keys = HashSet::new();
    let mut item_ids = HashSet::new();
    for (ci, category) in quiz.categories.iter().enumerate() {
        if !keys.insert(category.key.as_str()) {
            errors.push(format!("{}.categories[{}]: duplicate key '{}'", at, ci, category.key));
        }
        if category.items.is_empty() {
            errors.push(format!("{}.categories[{}]: no items", at, ci));
        }
        check_color(&format!("{}.categories[{}].color", at, ci), &category.color, errors);

        for (ii, item) in category.items.iter().enumerate() {
            if !item_ids.insert(item.id.as_str()) {
                errors.push(format!(
                    "{}.categories[{}].items[{}]: duplicate id '{}'",
                    at, ci, ii, item.id
                ));
            }
            if !(1..=5).contains(&item.severity) {
                errors.push(format!(
                    "{}.categories[{}].items[{}].severity: must be 1-5, got {}",
                    at, ci, ii, item.severity
                ));
            }
        }
    }

    validate_tiers(at, &quiz.tiers, false, errors);
}

fn validate_pitch(at: &str, quiz: &PitchQuiz, errors: &mut Vec<String>) {
    if quiz.fields.is_empty() {
        errors.push(format!("{}: {}", at, ConfigurationError::NoQuestions));
    }
    if quiz.theme.max_len == 0 {
        errors.push(format!("{}.theme.max_len: must be positive", at));
    }

    let mut field_ids = HashSet::new();
    for (fi, field) in quiz.fields.iter().enumerate() {
        if !field_ids.insert(field.id.as_str()) {
            errors.push(format!("{}.fields[{}]: duplicate id '{}'", at, fi, field.id));
        }
        if field.options.is_empty() {
            errors.push(format!("{}.fields[{}]: no options", at, fi));
        }
        let mut values = HashSet::new();
        for (oi, option) in field.options.iter().enumerate() {
            if !values.insert(option.value.as_str()) {
                errors.push(format!(
                    "{}.fields[{}].options[{}]: duplicate value '{}'",
                    at, fi, oi, option.value
                ));
            }
        }
    }

    for (name, id) in [("pool_field", &quiz.pool_field), ("chain_field", &quiz.chain_field)] {
        if quiz.field(id).is_none() {
            errors.push(format!("{}.{}: unknown field '{}'", at, name, id));
        }
    }

    if !quiz.pools.contains_key(&quiz.default_pool) {
        errors.push(format!(
            "{}.default_pool: no pool named '{}'",
            at, quiz.default_pool
        ));
    }
    for (key, pool) in &quiz.pools {
        if pool.suffixes.is_empty()
            || pool.taglines.is_empty()
            || pool.roadmaps.is_empty()
            || pool.mascots.is_empty()
        {
            errors.push(format!("{}.pools.{}: every list must be non-empty", at, key));
        }
    }

    for (name, rule) in [
        ("rug_risk", &quiz.rug_risk),
        ("holders", &quiz.holders),
        ("market_cap", &quiz.market_cap),
    ] {
        validate_span_rule(at, name, rule, quiz, errors);
    }

    validate_tiers(at, &quiz.tiers, true, errors);
}

fn validate_span_rule(at: &str, name: &str, rule: &SpanRule, quiz: &PitchQuiz, errors: &mut Vec<String>) {
    let field = match quiz.field(&rule.by) {
        Some(f) => f,
        None => {
            errors.push(format!("{}.{}.by: unknown field '{}'", at, name, rule.by));
            return;
        }
    };
    for (value, span) in &rule.spans {
        if field.option(value).is_none() {
            errors.push(format!(
                "{}.{}.spans: '{}' is not an option of '{}'",
                at, name, value, field.id
            ));
        }
        if span.min > span.max {
            errors.push(format!("{}.{}.spans.{}: min is above max", at, name, value));
        }
    }
    if rule.default.min > rule.default.max {
        errors.push(format!("{}.{}.default: min is above max", at, name));
    }
}

fn validate_tiers(at: &str, tiers: &[Tier], needs_grades: bool, errors: &mut Vec<String>) {
    if let Err(coverage) = check_coverage(tiers) {
        for e in coverage {
            errors.push(format!("{}.tiers: {}", at, e));
        }
    }
    for (i, tier) in tiers.iter().enumerate() {
        if tier.verdicts.is_empty() {
            errors.push(format!("{}.tiers[{}]: no verdicts", at, i));
        }
        if needs_grades && tier.grades.is_empty() {
            errors.push(format!("{}.tiers[{}]: no grades", at, i));
        }
        check_color(&format!("{}.tiers[{}].color", at, i), &tier.color, errors);
    }
}

fn check_color(at: &str, color: &str, errors: &mut Vec<String>) {
    if parse_hex_color(color).is_none() {
        errors.push(format!("{}: invalid color '{}' (expected #rrggbb)", at, color));
    }
}
