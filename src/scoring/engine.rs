use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::error::ConfigurationError;
use super::traits::TraitMap;

/// Multiplier applied to every dominant trait total.
pub const DOMINANT_WEIGHT: f64 = 3.0;
/// Points lost for each strong trait the candidate does not claim.
pub const OFF_TRAIT_PENALTY: f64 = 1.0;
/// A non-dominant trait only counts against a candidate above this total.
pub const OFF_TRAIT_THRESHOLD: i64 = 5;
/// Scale applied to the [0, 1) jitter draw.
pub const JITTER_SCALE: f64 = 0.5;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

/// A possible quiz result. Only `dominant_traits` affects selection; the rest
/// is display text.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ResultCandidate {
    pub id: String,
    pub emoji: String,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub color: String,

    #[serde(default)]
    pub roast: Option<String>,

    /// Physics formula shown above the name (energy quiz)
    #[serde(default)]
    pub formula: Option<String>,

    /// "Scientific fact" footer (energy quiz)
    #[serde(default)]
    pub fact: Option<String>,

    #[serde(default)]
    pub stats: Vec<Stat>,

    pub dominant_traits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub id: String,
    pub dominant_sum: i64,  // Sum of the candidate's dominant trait totals
    pub off_traits: u32,    // Strong traits outside the dominant set
    pub jitter: f64,        // Scaled jitter added last
    pub score: f64,
}

pub fn candidate_score(traits: &TraitMap, candidate: &ResultCandidate, jitter: f64) -> CandidateScore {
    let dominant_sum: i64 = candidate
        .dominant_traits
        .iter()
        .map(|t| traits.get(t).copied().unwrap_or(0))
        .sum();

    let off_traits = traits
        .iter()
        .filter(|(name, total)| {
            **total > OFF_TRAIT_THRESHOLD && !candidate.dominant_traits.contains(*name)
        })
        .count() as u32;

    let jitter = jitter * JITTER_SCALE;
    let score = DOMINANT_WEIGHT * dominant_sum as f64 - OFF_TRAIT_PENALTY * f64::from(off_traits) + jitter;

    CandidateScore {
        id: candidate.id.clone(),
        dominant_sum,
        off_traits,
        jitter,
        score,
    }
}

/// Score every candidate in declaration order, drawing one jitter value each.
pub fn rank_candidates<J>(traits: &TraitMap, candidates: &[ResultCandidate], mut jitter: J) -> Vec<CandidateScore>
where
    J: FnMut() -> f64,
{
    candidates
        .iter()
        .map(|c| candidate_score(traits, c, jitter()))
        .collect()
}

/// Index of the highest score. Only a strictly greater score replaces the
/// current best, so the first candidate wins exact ties.
pub fn pick_best(scores: &[CandidateScore]) -> Option<usize> {
    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;

    for (i, s) in scores.iter().enumerate() {
        if s.score > best_score {
            best_score = s.score;
            best = Some(i);
        }
    }

    best
}

pub fn select_result<'a, J>(
    traits: &TraitMap,
    candidates: &'a [ResultCandidate],
    jitter: J,
) -> Result<&'a ResultCandidate, ConfigurationError>
where
    J: FnMut() -> f64,
{
    let scores = rank_candidates(traits, candidates, jitter);
    pick_best(&scores)
        .map(|i| &candidates[i])
        .ok_or(ConfigurationError::NoCandidates)
}

/// Jitter drawn from the thread-local RNG.
pub fn live_jitter() -> impl FnMut() -> f64 {
    let mut rng = rand::thread_rng();
    move || rng.gen::<f64>()
}

/// Reproducible jitter for `--seed` runs and tests.
pub fn seeded_jitter(seed: u64) -> impl FnMut() -> f64 {
    let mut rng = StdRng::seed_from_u64(seed);
    move || rng.gen::<f64>()
}

pub fn no_jitter() -> impl FnMut() -> f64 {
    || 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TRAITS: [&str; 8] = [
        "basic", "chaotic", "aesthetic", "pretentious",
        "healthy", "mysterious", "controversial", "wholesome",
    ];

    fn candidate(id: &str, dominant: &[&str]) -> ResultCandidate {
        ResultCandidate {
            id: id.to_string(),
            emoji: "🍵".to_string(),
            name: id.to_string(),
            tagline: String::new(),
            description: String::new(),
            color: "#ffffff".to_string(),
            roast: None,
            formula: None,
            fact: None,
            stats: Vec::new(),
            dominant_traits: dominant.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn sample_candidates() -> Vec<ResultCandidate> {
        vec![
            candidate("matcha", &["aesthetic", "pretentious", "basic"]),
            candidate("kombucha", &["healthy", "pretentious"]),
            candidate("beef_tallow", &["controversial", "chaotic", "healthy"]),
            candidate("miso", &["wholesome", "mysterious", "healthy"]),
        ]
    }

    fn traits(pairs: &[(&str, i64)]) -> TraitMap {
        let mut map: TraitMap = TRAITS.iter().map(|t| (t.to_string(), 0)).collect();
        for (k, v) in pairs {
            map.insert(k.to_string(), *v);
        }
        map
    }

    #[test]
    fn test_candidate_score_formula() {
        let t = traits(&[("aesthetic", 10), ("pretentious", 4), ("chaotic", 6), ("healthy", 7)]);
        let s = candidate_score(&t, &candidate("matcha", &["aesthetic", "pretentious", "basic"]), 0.0);
        assert_eq!(s.dominant_sum, 14);
        assert_eq!(s.off_traits, 2); // chaotic 6, healthy 7
        assert_eq!(s.score, 3.0 * 14.0 - 2.0);
    }

    #[test]
    fn test_off_trait_threshold_is_strict() {
        let t = traits(&[("chaotic", 5)]);
        let s = candidate_score(&t, &candidate("kombucha", &["healthy", "pretentious"]), 0.0);
        assert_eq!(s.off_traits, 0);
    }

    #[test]
    fn test_jitter_is_scaled() {
        let s = candidate_score(&traits(&[]), &candidate("x", &["basic", "chaotic"]), 0.8);
        assert!((s.jitter - 0.4).abs() < f64::EPSILON);
        assert!((s.score - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_candidates_is_configuration_error() {
        let result = select_result(&traits(&[]), &[], no_jitter());
        assert_eq!(result, Err(ConfigurationError::NoCandidates));
    }

    #[test]
    fn test_first_seen_wins_exact_tie() {
        let candidates = vec![
            candidate("first", &["basic", "chaotic"]),
            candidate("second", &["chaotic", "basic"]),
        ];
        let winner = select_result(&traits(&[("basic", 4)]), &candidates, no_jitter()).unwrap();
        assert_eq!(winner.id, "first");
    }

    #[test]
    fn test_all_zero_traits_picks_first() {
        let candidates = sample_candidates();
        let winner = select_result(&traits(&[]), &candidates, no_jitter()).unwrap();
        assert_eq!(winner.id, "matcha");
    }

    #[test]
    fn test_deterministic_with_zero_jitter() {
        let candidates = sample_candidates();
        let t = traits(&[("healthy", 9), ("pretentious", 8), ("aesthetic", 3)]);
        let first = select_result(&t, &candidates, no_jitter()).unwrap().id.clone();
        for _ in 0..50 {
            assert_eq!(select_result(&t, &candidates, no_jitter()).unwrap().id, first);
        }
        assert_eq!(first, "kombucha");
    }

    #[test]
    fn test_landslide_survives_live_jitter() {
        let candidates = sample_candidates();
        let t = traits(&[("controversial", 18), ("chaotic", 12), ("healthy", 6)]);
        for _ in 0..1000 {
            let winner = select_result(&t, &candidates, live_jitter()).unwrap();
            assert_eq!(winner.id, "beef_tallow");
        }
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let mut a = seeded_jitter(42);
        let mut b = seeded_jitter(42);
        for _ in 0..10 {
            let (x, y) = (a(), b());
            assert_eq!(x, y);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_pick_best_empty() {
        assert_eq!(pick_best(&[]), None);
    }

    fn trait_map_strategy() -> impl Strategy<Value = TraitMap> {
        proptest::collection::vec(0i64..=24, TRAITS.len()).prop_map(|values| {
            TRAITS
                .iter()
                .zip(values)
                .map(|(k, v)| (k.to_string(), v))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_raising_own_dominant_trait_keeps_selection(
            t in trait_map_strategy(),
            bump_index in 0usize..3,
        ) {
            let candidates = sample_candidates();
            let winner = select_result(&t, &candidates, no_jitter()).unwrap().clone();

            let trait_name = &winner.dominant_traits[bump_index % winner.dominant_traits.len()];
            let mut raised = t.clone();
            *raised.get_mut(trait_name).unwrap() += 1;

            let after = select_result(&raised, &candidates, no_jitter()).unwrap();
            prop_assert_eq!(&after.id, &winner.id);
        }

        #[test]
        fn prop_jitter_never_moves_score_by_more_than_half(
            t in trait_map_strategy(),
            j in 0.0f64..1.0,
        ) {
            for c in sample_candidates() {
                let base = candidate_score(&t, &c, 0.0).score;
                let jittered = candidate_score(&t, &c, j).score;
                prop_assert!(jittered >= base);
                prop_assert!(jittered - base <= JITTER_SCALE);
            }
        }
    }
}
