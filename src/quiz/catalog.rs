use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::scoring::{Question, ResultCandidate, Tier};

const TOOLS_FILE: &str = "tools.yaml";
const BUILTIN_TOOLS: &str = include_str!("../../data/tools.yaml");

const BUILTIN_QUIZZES: [(&str, &str); 5] = [
    ("shitcoin.yaml", include_str!("../../data/shitcoin.yaml")),
    ("roast.yaml", include_str!("../../data/roast.yaml")),
    ("redflags.yaml", include_str!("../../data/redflags.yaml")),
    ("food.yaml", include_str!("../../data/food.yaml")),
    ("energy.yaml", include_str!("../../data/energy.yaml")),
];

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Hot,
    New,
    Soon,
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Badge::Hot => write!(f, "HOT"),
            Badge::New => write!(f, "NEW"),
            Badge::Soon => write!(f, "SOON"),
        }
    }
}

/// Entry in the tool directory shown by `dafuqbro list`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Tool {
    pub slug: String,
    pub emoji: String,
    pub name: String,
    pub description: String,

    /// Key into the accent palette (e.g. "yellow")
    pub accent: String,

    #[serde(default)]
    pub badge: Option<Badge>,

    pub active: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ToolDirectory {
    accents: BTreeMap<String, String>,
    tools: Vec<Tool>,
}

/// Inclusive integer span used for cosmetic random draws.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Span {
    pub min: u64,
    pub max: u64,
}

impl Span {
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

/// A quiz loaded from `data/<slug>.yaml`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QuizDefinition {
    pub slug: String,
    pub title: String,
    pub emoji: String,
    pub accent: String,
    pub intro: String,

    /// Share copy with `{placeholders}` filled from the outcome
    pub share_template: String,

    /// Status lines rotated while the result is "calculating"
    pub calculating_messages: Vec<String>,

    #[serde(default)]
    pub message_interval_ms: Option<u64>,

    #[serde(default)]
    pub calculating_delay_ms: Option<u64>,

    pub kind: QuizKind,
}

impl QuizDefinition {
    pub fn message_interval(&self, default: Duration) -> Duration {
        self.message_interval_ms.map(Duration::from_millis).unwrap_or(default)
    }

    pub fn calculating_delay(&self, default: Duration) -> Duration {
        self.calculating_delay_ms.map(Duration::from_millis).unwrap_or(default)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
    /// Weighted single-choice questions matched against result candidates
    TraitMatch(TraitMatchQuiz),
    /// Categories of severity-weighted items bucketed into tiers
    Checklist(ChecklistQuiz),
    /// Free-text theme plus choices, generating a fake coin listing
    Pitch(PitchQuiz),
}

impl QuizKind {
    pub fn name(&self) -> &'static str {
        match self {
            QuizKind::TraitMatch(_) => "trait_match",
            QuizKind::Checklist(_) => "checklist",
            QuizKind::Pitch(_) => "pitch",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TraitMatchQuiz {
    /// Label for the cosmetic percentage ("Match", "Power Level")
    pub meter_label: String,
    pub meter: Span,

    /// Closed set of trait names options may reference
    pub traits: Vec<String>,

    pub questions: Vec<Question>,
    pub results: Vec<ResultCandidate>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChecklistQuiz {
    pub score_label: String,
    pub categories: Vec<Category>,
    pub tiers: Vec<Tier>,
}

impl ChecklistQuiz {
    pub fn max_severity(&self) -> u32 {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .map(|i| i.severity)
            .sum()
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub key: String,
    pub emoji: String,
    pub name: String,
    pub color: String,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChecklistItem {
    pub id: String,
    pub emoji: String,
    pub text: String,
    pub severity: u32, // 1-5
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PitchQuiz {
    pub theme: ThemePrompt,
    pub fields: Vec<PitchField>,

    /// Field whose value selects the name/tagline/mascot pool
    pub pool_field: String,
    /// Field echoed verbatim as the listing's chain
    pub chain_field: String,
    /// Pool used when the chosen value has none of its own
    pub default_pool: String,
    pub pools: BTreeMap<String, VibePool>,

    pub rug_risk: SpanRule,
    pub holders: SpanRule,
    pub market_cap: SpanRule,

    pub tiers: Vec<Tier>,
}

impl PitchQuiz {
    pub fn field(&self, id: &str) -> Option<&PitchField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn pool_for(&self, value: Option<&str>) -> Option<&VibePool> {
        value
            .and_then(|v| self.pools.get(v))
            .or_else(|| self.pools.get(&self.default_pool))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThemePrompt {
    pub prompt: String,

    #[serde(default)]
    pub placeholder: String,

    pub max_len: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PitchField {
    pub id: String,
    pub prompt: String,
    pub options: Vec<PitchOption>,
}

impl PitchField {
    pub fn option(&self, value: &str) -> Option<&PitchOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PitchOption {
    pub value: String,
    pub label: String,

    #[serde(default)]
    pub points: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VibePool {
    pub suffixes: Vec<String>,
    pub taglines: Vec<String>,
    pub roadmaps: Vec<Vec<String>>,
    pub mascots: Vec<String>,
}

/// Picks a span based on the answer to field `by`, falling back to `default`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SpanRule {
    pub by: String,

    #[serde(default)]
    pub spans: BTreeMap<String, Span>,

    pub default: Span,
}

impl SpanRule {
    pub fn span_for(&self, value: Option<&str>) -> Span {
        value
            .and_then(|v| self.spans.get(v))
            .copied()
            .unwrap_or(self.default)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no tool named '{0}'")]
    Unknown(String),

    #[error("'{0}' is coming soon")]
    ComingSoon(String),
}

/// Everything the binary can play: the tool directory plus quiz definitions.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub accents: BTreeMap<String, String>,
    pub tools: Vec<Tool>,
    pub quizzes: Vec<QuizDefinition>,
}

impl Catalog {
    /// Parse the quiz data compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::load(None)
    }

    /// Parse quiz data, preferring files in `data_dir` over the built-in copies.
    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        let source = read_source(data_dir, TOOLS_FILE, BUILTIN_TOOLS)?;
        let directory: ToolDirectory = serde_saphyr::from_str(&source)
            .with_context(|| format!("Failed to parse {}", TOOLS_FILE))?;

        let mut quizzes = Vec::with_capacity(BUILTIN_QUIZZES.len());
        for (file, builtin) in BUILTIN_QUIZZES {
            let source = read_source(data_dir, file, builtin)?;
            let quiz: QuizDefinition = serde_saphyr::from_str(&source)
                .with_context(|| format!("Failed to parse {}", file))?;
            quizzes.push(quiz);
        }

        Ok(Self {
            accents: directory.accents,
            tools: directory.tools,
            quizzes,
        })
    }

    pub fn quiz(&self, slug: &str) -> Option<&QuizDefinition> {
        self.quizzes.iter().find(|q| q.slug == slug)
    }

    pub fn tool(&self, slug: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.slug == slug)
    }

    /// Resolve a slug to a quiz the user is allowed to play.
    pub fn playable(&self, slug: &str) -> Result<&QuizDefinition, LookupError> {
        if let Some(tool) = self.tool(slug) {
            if !tool.active {
                return Err(LookupError::ComingSoon(tool.name.clone()));
            }
        }
        self.quiz(slug)
            .ok_or_else(|| LookupError::Unknown(slug.to_string()))
    }

    /// Hex color for a tool's accent key.
    pub fn accent_color(&self, tool: &Tool) -> &str {
        self.accents
            .get(&tool.accent)
            .map(String::as_str)
            .unwrap_or("#a1a1aa")
    }
}

fn read_source<'a>(data_dir: Option<&Path>, file: &str, builtin: &'a str) -> Result<Cow<'a, str>> {
    if let Some(dir) = data_dir {
        let path = dir.join(file);
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read quiz data at {}", path.display()))?;
            return Ok(Cow::Owned(content));
        }
    }
    Ok(Cow::Borrowed(builtin))
}

/// Parse "#rrggbb" into its components.
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
