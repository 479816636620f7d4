pub mod admin;
pub mod blog;
pub mod browser;
pub mod config;
pub mod output;
pub mod quiz;
pub mod scoring;
pub mod stderr_buffer;
pub mod tui;
