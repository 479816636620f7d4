use anyhow::{Context, Result};
use std::fs;
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;

use crate::blog::{Category, PostDraft, PostStatus};

pub fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

pub fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

pub fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Field overrides for a post, as given on the command line. `None` keeps
/// whatever the base draft has.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftFields {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub cover_emoji: Option<String>,
    pub status: Option<String>,
    /// Markdown file to use as the body; `-` reads stdin
    pub content_file: Option<PathBuf>,
}

impl DraftFields {
    pub fn is_empty(&self) -> bool {
        *self == DraftFields::default()
    }

    /// Apply the overrides on top of `base`.
    pub fn apply(self, mut base: PostDraft) -> Result<PostDraft> {
        if let Some(title) = self.title {
            base.title = title;
        }
        if let Some(slug) = self.slug {
            base.slug = slug;
        }
        if let Some(excerpt) = self.excerpt {
            base.excerpt = excerpt;
        }
        if let Some(category) = self.category {
            base.category = category.parse::<Category>().map_err(anyhow::Error::msg)?;
        }
        if let Some(emoji) = self.cover_emoji {
            base.cover_emoji = emoji;
        }
        if let Some(status) = self.status {
            base.status = status.parse::<PostStatus>().map_err(anyhow::Error::msg)?;
        }
        if let Some(path) = self.content_file {
            base.content = read_content(&path)?;
        }
        Ok(base)
    }
}

/// Read a post body from a file, or from stdin when the path is `-`.
pub fn read_content(path: &std::path::Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut content)
            .context("Failed to read post content from stdin")?;
        Ok(content)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read post content from {}", path.display()))
    }
}

/// Walk through every field, offering the current value as the default.
/// The body is given as a path to a Markdown file; blank keeps the old body.
pub fn prompt_draft(base: PostDraft) -> Result<PostDraft> {
    let title = prompt_with_default("Title", &base.title)?;
    let slug_default = if base.slug.is_empty() {
        crate::blog::slugify(&title)
    } else {
        base.slug.clone()
    };
    let slug = prompt_with_default("Slug", &slug_default)?;
    let excerpt = prompt_with_default("Excerpt", &base.excerpt)?;

    let category = loop {
        let input = prompt_with_default("Category (guides/memes/updates)", base.category.as_str())?;
        match input.parse::<Category>() {
            Ok(c) => break c,
            Err(e) => println!("  {}", e),
        }
    };

    let cover_emoji = prompt_with_default("Cover emoji", &base.cover_emoji)?;

    let content_path = prompt("Markdown file for the body (blank keeps current): ")?;
    let content = if content_path.is_empty() {
        base.content
    } else {
        read_content(std::path::Path::new(&content_path))?
    };

    let publish = prompt_yes_no("Publish now?", base.status == PostStatus::Published)?;

    Ok(PostDraft {
        title,
        slug,
        content,
        excerpt,
        category,
        cover_emoji,
        status: if publish { PostStatus::Published } else { PostStatus::Draft },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_keep_base() {
        let fields = DraftFields::default();
        assert!(fields.is_empty());
        let draft = fields.apply(PostDraft::default()).unwrap();
        assert_eq!(draft, PostDraft::default());
    }

    #[test]
    fn test_fields_override() {
        let dir = tempfile::tempdir().unwrap();
        let body = dir.path().join("post.md");
        fs::write(&body, "# Hello\n\nBody text").unwrap();

        let fields = DraftFields {
            title: Some("Hello".to_string()),
            category: Some("memes".to_string()),
            status: Some("published".to_string()),
            content_file: Some(body),
            ..DraftFields::default()
        };
        assert!(!fields.is_empty());

        let draft = fields.apply(PostDraft::default()).unwrap();
        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.category, Category::Memes);
        assert_eq!(draft.status, PostStatus::Published);
        assert_eq!(draft.content, "# Hello\n\nBody text");
        assert_eq!(draft.cover_emoji, "📝");
    }

    #[test]
    fn test_bad_category_rejected() {
        let fields = DraftFields {
            category: Some("recipes".to_string()),
            ..DraftFields::default()
        };
        let err = fields.apply(PostDraft::default()).unwrap_err();
        assert!(err.to_string().contains("unknown category 'recipes'"));
    }

    #[test]
    fn test_missing_content_file() {
        let fields = DraftFields {
            content_file: Some(PathBuf::from("/no/such/post.md")),
            ..DraftFields::default()
        };
        assert!(fields.apply(PostDraft::default()).is_err());
    }
}
