pub mod markdown;
pub mod post;
pub mod storage;

pub use markdown::{escape_html, markdown_to_html};
pub use post::{reading_time, slugify, Category, CategoryFilter, Post, PostDraft, PostStatus};
pub use storage::{get_blog_path, load_blog, save_blog, BlogState, StoreError};
