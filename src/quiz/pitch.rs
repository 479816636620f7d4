//! Fake coin listing generator for pitch quizzes.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::catalog::PitchQuiz;
use super::session::PITCH_THEME_STEP;
use crate::scoring::{find_tier, normalize, Answers, ConfigurationError};

/// Ticker used when the theme has no letters at all.
pub const FALLBACK_TICKER: &str = "$COPE";

const TICKER_MAX: usize = 5;
const TICKER_MIN: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub theme: String,
    pub ticker: String,
    pub coin_name: String,
    pub tagline: String,
    pub chain: String,
    pub mascot: String,
    pub roadmap: Vec<String>,

    pub market_cap: u64,
    pub holders: u64,
    pub rug_risk: u64,

    pub points: u32,
    pub max_points: u32,
    pub score: u8,
    pub grade: String,
    pub grade_color: String,
    pub tier_label: String,
    pub verdict: String,
}

/// Ticker from the first word of the theme, letters only, uppercased.
/// Words of up to five letters are kept whole; longer ones are cut to a
/// random length between three and five.
pub fn ticker<R: Rng + ?Sized>(theme: &str, rng: &mut R) -> String {
    let cleaned: String = theme
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_whitespace())
        .collect();

    let Some(word) = cleaned.split_whitespace().next() else {
        return FALLBACK_TICKER.to_string();
    };

    if word.len() <= TICKER_MAX {
        format!("${}", word)
    } else {
        let len = rng.gen_range(TICKER_MIN..=TICKER_MAX);
        format!("${}", &word[..len])
    }
}

/// First word of the theme, capitalized, with the suffix glued on.
pub fn coin_name(theme: &str, suffix: &str) -> String {
    let base = theme.split_whitespace().next().unwrap_or("");
    let mut chars = base.chars();
    let mut name: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    };
    name.push_str(suffix);
    name
}

/// `$1.2M`, `$450K` or `$999`. Halves round up.
pub fn format_mcap(n: u64) -> String {
    if n >= 1_000_000 {
        let millions = (n as f64 / 100_000.0).round() / 10.0;
        format!("${:.1}M", millions)
    } else if n >= 1_000 {
        format!("${}K", (n as f64 / 1_000.0).round() as u64)
    } else {
        format!("${}", n)
    }
}

/// Group thousands with commas: 12345 -> "12,345".
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Degen points for the chosen options. Unanswered fields score zero.
pub fn points(quiz: &PitchQuiz, answers: &Answers) -> u32 {
    quiz.fields
        .iter()
        .filter_map(|f| answers.get(&f.id).and_then(|v| f.option(v)))
        .map(|o| o.points)
        .sum()
}

/// Best possible points: the top option of every field.
pub fn max_points(quiz: &PitchQuiz) -> u32 {
    quiz.fields
        .iter()
        .map(|f| f.options.iter().map(|o| o.points).max().unwrap_or(0))
        .sum()
}

pub fn generate<R: Rng + ?Sized>(
    quiz: &PitchQuiz,
    answers: &Answers,
    rng: &mut R,
) -> Result<Listing, ConfigurationError> {
    let theme = answers.get(PITCH_THEME_STEP).map(String::as_str).unwrap_or("");
    let answer = |id: &str| answers.get(id).map(String::as_str);

    let points = points(quiz, answers);
    let max_points = max_points(quiz);
    let score = normalize(points, max_points);
    let tier = find_tier(score, &quiz.tiers)?;

    let pool = quiz.pool_for(answer(&quiz.pool_field));
    let draw = |items: Option<&Vec<String>>, rng: &mut R| {
        items
            .and_then(|v| v.choose(rng))
            .cloned()
            .unwrap_or_default()
    };

    let suffix = draw(pool.map(|p| &p.suffixes), rng);
    let tagline = draw(pool.map(|p| &p.taglines), rng);
    let mascot = draw(pool.map(|p| &p.mascots), rng);
    let roadmap = pool
        .and_then(|p| p.roadmaps.choose(rng))
        .cloned()
        .unwrap_or_default();

    let rug_risk = quiz.rug_risk.span_for(answer(&quiz.rug_risk.by)).draw(rng);
    let holders = quiz.holders.span_for(answer(&quiz.holders.by)).draw(rng);
    let market_cap = quiz.market_cap.span_for(answer(&quiz.market_cap.by)).draw(rng);

    Ok(Listing {
        theme: theme.to_string(),
        ticker: ticker(theme, rng),
        coin_name: coin_name(theme, &suffix),
        tagline,
        chain: answer(&quiz.chain_field).unwrap_or_default().to_string(),
        mascot,
        roadmap,
        market_cap,
        holders,
        rug_risk,
        points,
        max_points,
        score,
        grade: tier.pick_grade(rng).unwrap_or(&tier.label).to_string(),
        grade_color: tier.color.clone(),
        tier_label: tier.label.clone(),
        verdict: tier.pick_verdict(rng).unwrap_or_default().to_string(),
    })
}
