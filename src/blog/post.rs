use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest slug `slugify` will produce.
pub const SLUG_MAX: usize = 80;
/// Words per minute assumed by `reading_time`.
pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Guides,
    Memes,
    Updates,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Guides, Category::Memes, Category::Updates];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Guides => "guides",
            Category::Memes => "memes",
            Category::Updates => "updates",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Guides => "Guides & How-To",
            Category::Memes => "Memes & Culture",
            Category::Updates => "Tool Updates",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Guides => "📖",
            Category::Memes => "🐸",
            Category::Updates => "🚀",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown category '{}' (expected guides, memes or updates)", s))
    }
}

/// Category filter for the public listing. "all" means no filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(Category),
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn toggled(self) -> Self {
        match self {
            PostStatus::Draft => PostStatus::Published,
            PostStatus::Published => PostStatus::Draft,
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Draft => write!(f, "draft"),
            PostStatus::Published => write!(f, "published"),
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown status '{}' (expected draft or published)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    pub category: Category,
    pub cover_emoji: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn reading_time(&self) -> usize {
        reading_time(&self.content)
    }
}

/// Editable fields of a post. `slug` may be left empty, in which case it
/// is derived from the title.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub category: Category,
    pub cover_emoji: String,
    pub status: PostStatus,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            slug: String::new(),
            content: String::new(),
            excerpt: String::new(),
            category: Category::Guides,
            cover_emoji: "📝".to_string(),
            status: PostStatus::Draft,
        }
    }
}

impl From<&Post> for PostDraft {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone(),
            category: post.category,
            cover_emoji: post.cover_emoji.clone(),
            status: post.status,
        }
    }
}

impl PostDraft {
    /// The slug this draft will be stored under.
    pub fn effective_slug(&self) -> String {
        if self.slug.trim().is_empty() {
            slugify(&self.title)
        } else {
            slugify(&self.slug)
        }
    }
}

/// Lowercase, collapse every run of characters outside `[a-z0-9]` into a
/// single `-`, trim dashes from both ends, then cut to 80 characters.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_gap = false;

    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if in_gap && !slug.is_empty() {
                slug.push('-');
            }
            in_gap = false;
            slug.push(c);
        } else {
            in_gap = true;
        }
    }

    // Dashes are only emitted between kept characters, so the cut is the
    // last step
    slug.chars().take(SLUG_MAX).collect()
}

/// Minutes to read `content` at 200 words per minute, never less than one.
pub fn reading_time(content: &str) -> usize {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}
