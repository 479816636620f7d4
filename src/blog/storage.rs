use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::post::{CategoryFilter, Post, PostDraft, PostStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no post with id {0}")]
    NotFound(u64),

    #[error("no published post with slug '{0}'")]
    SlugNotFound(String),

    #[error("slug '{0}' is already used by another post")]
    DuplicateSlug(String),

    #[error("title and slug produce an empty slug")]
    EmptySlug,
}

/// Every post, persisted as one versioned JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogState {
    pub version: u32,
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default)]
    pub posts: Vec<Post>,
}

fn first_id() -> u64 {
    1
}

impl Default for BlogState {
    fn default() -> Self {
        Self::new()
    }
}

impl BlogState {
    pub fn new() -> Self {
        Self {
            version: 1,
            next_id: first_id(),
            posts: Vec::new(),
        }
    }

    /// All posts, newest first by creation time.
    pub fn list_all(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }

    /// Published posts, newest first by publish time.
    pub fn list_published(&self, filter: CategoryFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .filter(|p| p.is_published() && filter.matches(p.category))
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(b.id.cmp(&a.id)));
        posts
    }

    pub fn get(&self, id: u64) -> Result<&Post, StoreError> {
        self.posts
            .iter()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Drafts are invisible here, so a draft's slug reads as not found.
    pub fn published_by_slug(&self, slug: &str) -> Result<&Post, StoreError> {
        self.posts
            .iter()
            .find(|p| p.slug == slug && p.is_published())
            .ok_or_else(|| StoreError::SlugNotFound(slug.to_string()))
    }

    fn checked_slug(&self, draft: &PostDraft, own_id: Option<u64>) -> Result<String, StoreError> {
        let slug = draft.effective_slug();
        if slug.is_empty() {
            return Err(StoreError::EmptySlug);
        }
        if self.posts.iter().any(|p| p.slug == slug && Some(p.id) != own_id) {
            return Err(StoreError::DuplicateSlug(slug));
        }
        Ok(slug)
    }

    pub fn create(&mut self, draft: PostDraft, now: DateTime<Utc>) -> Result<&Post, StoreError> {
        let slug = self.checked_slug(&draft, None)?;
        let id = self.next_id;
        self.next_id += 1;

        let published_at = (draft.status == PostStatus::Published).then_some(now);
        self.posts.push(Post {
            id,
            title: draft.title,
            slug,
            content: draft.content,
            excerpt: draft.excerpt,
            category: draft.category,
            cover_emoji: draft.cover_emoji,
            status: draft.status,
            created_at: now,
            updated_at: now,
            published_at,
        });
        self.get(id)
    }

    /// Replace a post's editable fields. Saving a post as published stamps
    /// `published_at` with `now`; saving a draft keeps the last publish time.
    pub fn update(&mut self, id: u64, draft: PostDraft, now: DateTime<Utc>) -> Result<&Post, StoreError> {
        let slug = self.checked_slug(&draft, Some(id))?;
        let post = self
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;

        post.title = draft.title;
        post.slug = slug;
        post.content = draft.content;
        post.excerpt = draft.excerpt;
        post.category = draft.category;
        post.cover_emoji = draft.cover_emoji;
        post.status = draft.status;
        post.updated_at = now;
        if post.status == PostStatus::Published {
            post.published_at = Some(now);
        }
        Ok(&*post)
    }

    pub fn delete(&mut self, id: u64) -> Result<Post, StoreError> {
        let index = self
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(self.posts.remove(index))
    }

    /// Flip draft/published. Returns the new status. Republishing moves
    /// `published_at` to `now`.
    pub fn toggle_status(&mut self, id: u64, now: DateTime<Utc>) -> Result<PostStatus, StoreError> {
        let post = self
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;

        post.status = post.status.toggled();
        post.updated_at = now;
        if post.status == PostStatus::Published {
            post.published_at = Some(now);
        }
        Ok(post.status)
    }
}

/// Get the default blog file path (~/.config/dafuqbro/posts.json)
pub fn get_blog_path() -> PathBuf {
    crate::config::get_config_dir().join("posts.json")
}

/// Load the blog from a JSON file.
///
/// A missing file is an empty blog. An unsupported version is an error.
pub fn load_blog(path: &Path) -> Result<BlogState> {
    if !path.exists() {
        return Ok(BlogState::new());
    }

    let file = File::open(path).with_context(|| format!("Failed to open blog file at {}", path.display()))?;
    let state: BlogState = serde_json::from_reader(file).context("Failed to load blog posts")?;

    if state.version != 1 {
        anyhow::bail!("Unsupported blog file version: {}", state.version);
    }

    Ok(state)
}

/// Save the blog atomically, creating the parent directory if needed.
pub fn save_blog(path: &Path, state: &BlogState) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, state).context("Failed to serialize blog posts")?;
    file.commit().context("Failed to save blog posts")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::post::Category;
    use chrono::{Duration, TimeZone};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn draft(title: &str, category: Category, status: PostStatus) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            content: "Some words here".to_string(),
            category,
            status,
            ..PostDraft::default()
        }
    }

    #[test]
    fn test_create_assigns_ids_and_slug() {
        let mut blog = BlogState::new();
        let first = blog.create(draft("Hello World", Category::Guides, PostStatus::Draft), t(0)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.slug, "hello-world");
        assert!(first.published_at.is_none());

        let second = blog.create(draft("Other", Category::Memes, PostStatus::Published), t(1)).unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(second.published_at, Some(t(1)));
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let mut blog = BlogState::new();
        blog.create(draft("Same", Category::Guides, PostStatus::Draft), t(0)).unwrap();
        let err = blog.create(draft("same!", Category::Guides, PostStatus::Draft), t(1)).unwrap_err();
        assert_eq!(err, StoreError::DuplicateSlug("same".to_string()));
    }

    #[test]
    fn test_empty_slug_rejected() {
        let mut blog = BlogState::new();
        let err = blog.create(draft("🔥🔥", Category::Guides, PostStatus::Draft), t(0)).unwrap_err();
        assert_eq!(err, StoreError::EmptySlug);
    }

    #[test]
    fn test_update_can_keep_own_slug() {
        let mut blog = BlogState::new();
        blog.create(draft("Keep Me", Category::Guides, PostStatus::Draft), t(0)).unwrap();
        let mut d = draft("Keep Me", Category::Memes, PostStatus::Draft);
        d.content = "new body".to_string();
        let post = blog.update(1, d, t(5)).unwrap();
        assert_eq!(post.slug, "keep-me");
        assert_eq!(post.category, Category::Memes);
        assert_eq!(post.updated_at, t(5));
        assert_eq!(post.created_at, t(0));
    }

    #[test]
    fn test_update_sets_publish_time_when_going_live() {
        let mut blog = BlogState::new();
        blog.create(draft("Post", Category::Guides, PostStatus::Draft), t(0)).unwrap();
        let post = blog.update(1, draft("Post", Category::Guides, PostStatus::Published), t(10)).unwrap();
        assert_eq!(post.published_at, Some(t(10)));
    }

    #[test]
    fn test_update_missing() {
        let mut blog = BlogState::new();
        assert_eq!(
            blog.update(9, PostDraft::default(), t(0)).unwrap_err(),
            StoreError::NotFound(9)
        );
    }

    #[test]
    fn test_toggle_status() {
        let mut blog = BlogState::new();
        blog.create(draft("Post", Category::Guides, PostStatus::Draft), t(0)).unwrap();

        assert_eq!(blog.toggle_status(1, t(1)).unwrap(), PostStatus::Published);
        assert_eq!(blog.get(1).unwrap().published_at, Some(t(1)));

        assert_eq!(blog.toggle_status(1, t(2)).unwrap(), PostStatus::Draft);
        // Unpublishing keeps the last publish time
        assert_eq!(blog.get(1).unwrap().published_at, Some(t(1)));

        assert_eq!(blog.toggle_status(1, t(3)).unwrap(), PostStatus::Published);
        assert_eq!(blog.get(1).unwrap().published_at, Some(t(3)));
    }

    #[test]
    fn test_update_restamps_published_post() {
        let mut blog = BlogState::new();
        blog.create(draft("Post", Category::Guides, PostStatus::Published), t(0)).unwrap();

        let post = blog.update(1, draft("Post v2", Category::Guides, PostStatus::Published), t(3)).unwrap();
        assert_eq!(post.published_at, Some(t(3)));

        let post = blog.update(1, draft("Post v3", Category::Guides, PostStatus::Draft), t(4)).unwrap();
        assert_eq!(post.published_at, Some(t(3)));
    }

    #[test]
    fn test_resaved_post_moves_to_top_of_listing() {
        let mut blog = BlogState::new();
        blog.create(draft("First", Category::Guides, PostStatus::Published), t(0)).unwrap();
        blog.create(draft("Second", Category::Guides, PostStatus::Published), t(1)).unwrap();
        blog.update(1, draft("First", Category::Guides, PostStatus::Published), t(2)).unwrap();

        let slugs: Vec<&str> = blog
            .list_published(CategoryFilter::All)
            .iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["first", "second"]);
    }

    #[test]
    fn test_delete() {
        let mut blog = BlogState::new();
        blog.create(draft("Gone", Category::Guides, PostStatus::Draft), t(0)).unwrap();
        assert_eq!(blog.delete(1).unwrap().slug, "gone");
        assert_eq!(blog.delete(1).unwrap_err(), StoreError::NotFound(1));
        // Ids are never reused
        let next = blog.create(draft("New", Category::Guides, PostStatus::Draft), t(1)).unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_list_orders_and_filters() {
        let mut blog = BlogState::new();
        blog.create(draft("Old Guide", Category::Guides, PostStatus::Published), t(0)).unwrap();
        blog.create(draft("Meme", Category::Memes, PostStatus::Published), t(1)).unwrap();
        blog.create(draft("Draft", Category::Guides, PostStatus::Draft), t(2)).unwrap();
        blog.create(draft("New Guide", Category::Guides, PostStatus::Draft), t(3)).unwrap();
        blog.toggle_status(4, t(4)).unwrap();

        let all: Vec<&str> = blog.list_all().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(all, vec!["new-guide", "draft", "meme", "old-guide"]);

        let published: Vec<&str> = blog
            .list_published(CategoryFilter::All)
            .iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(published, vec!["new-guide", "meme", "old-guide"]);

        let guides: Vec<&str> = blog
            .list_published(CategoryFilter::Only(Category::Guides))
            .iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(guides, vec!["new-guide", "old-guide"]);
    }

    #[test]
    fn test_published_by_slug_hides_drafts() {
        let mut blog = BlogState::new();
        blog.create(draft("Live", Category::Guides, PostStatus::Published), t(0)).unwrap();
        blog.create(draft("Hidden", Category::Guides, PostStatus::Draft), t(1)).unwrap();

        assert_eq!(blog.published_by_slug("live").unwrap().id, 1);
        assert_eq!(
            blog.published_by_slug("hidden").unwrap_err(),
            StoreError::SlugNotFound("hidden".to_string())
        );
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let blog = load_blog(&dir.path().join("posts.json")).unwrap();
        assert_eq!(blog.version, 1);
        assert!(blog.posts.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("posts.json");

        let mut blog = BlogState::new();
        blog.create(draft("Saved", Category::Updates, PostStatus::Published), t(0)).unwrap();
        save_blog(&path, &blog).unwrap();

        let loaded = load_blog(&path).unwrap();
        assert_eq!(loaded.posts, blog.posts);
        assert_eq!(loaded.next_id, 2);
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(&path, r#"{"version": 2, "posts": []}"#).unwrap();

        let err = load_blog(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported blog file version"));
    }
}
