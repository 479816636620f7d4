use std::io::IsTerminal;
use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::blog::{markdown_to_html, Post, PostStatus};
use crate::quiz::{
    format_count, format_mcap, Catalog, Listing, MatchOutcome, Outcome, QuizDefinition, ShareLink, TieredOutcome,
};

/// Format the tool directory, one line per tool
/// Format: "{emoji} {slug}  {name}  {badge}", with the description below in verbose mode
pub fn format_tool_list(catalog: &Catalog, verbose: bool, use_colors: bool) -> String {
    if catalog.tools.is_empty() {
        return "No tools found.".to_string();
    }

    let slug_width = catalog.tools.iter().map(|t| t.slug.len()).max().unwrap_or(0);

    catalog
        .tools
        .iter()
        .map(|tool| {
            let slug = format!("{:<width$}", tool.slug, width = slug_width);
            let badge = tool.badge.map(|b| b.to_string()).unwrap_or_default();

            let mut line = if use_colors {
                let name = if tool.active {
                    tool.name.bold().to_string()
                } else {
                    tool.name.dimmed().to_string()
                };
                format!("{} {}  {}  {}", tool.emoji, slug.cyan(), name, badge.yellow())
            } else {
                format!("{} {}  {}  {}", tool.emoji, slug, tool.name, badge)
            };
            let trimmed_len = line.trim_end().len();
            line.truncate(trimmed_len);

            if verbose {
                let description = match get_terminal_width() {
                    Some(width) if width > 16 => truncate_title(&tool.description, width - 6),
                    _ => tool.description.clone(),
                };
                line.push_str("\n     ");
                if use_colors {
                    line.push_str(&description.dimmed().to_string());
                } else {
                    line.push_str(&description);
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a finished quiz as plain text for `dafuqbro score`
pub fn format_outcome(quiz: &QuizDefinition, outcome: &Outcome, use_colors: bool) -> String {
    let header = format!("{} {}", quiz.emoji, quiz.title);
    let header = if use_colors { header.bold().to_string() } else { header };

    let body = match outcome {
        Outcome::Match(m) => format_match(m, use_colors),
        Outcome::Tiered(t) => format_tiered(t, use_colors),
        Outcome::Pitch(l) => format_listing(l, use_colors),
    };
    format!("{}\n\n{}", header, body)
}

fn format_match(m: &MatchOutcome, use_colors: bool) -> String {
    let c = &m.candidate;
    let mut lines = Vec::new();
    if let Some(formula) = &c.formula {
        lines.push(formula.clone());
    }
    if use_colors {
        lines.push(format!("{} {}", c.emoji, c.name.bold()));
        lines.push(c.tagline.italic().to_string());
    } else {
        lines.push(format!("{} {}", c.emoji, c.name));
        lines.push(c.tagline.clone());
    }
    lines.push(format!("{}: {}%", m.meter_label, m.meter));
    lines.push(String::new());
    lines.push(c.description.clone());

    for stat in &c.stats {
        lines.push(format!("  {}: {}", stat.label, stat.value));
    }
    if let Some(roast) = &c.roast {
        lines.push(format!("\n🔥 {}", roast));
    }
    if let Some(fact) = &c.fact {
        lines.push(format!("\n{}", fact));
    }
    lines.join("\n")
}

fn format_tiered(t: &TieredOutcome, use_colors: bool) -> String {
    let score = format!("{}/100", t.score);
    let mut lines = vec![
        if use_colors {
            format!("{} {} {}", t.tier.emoji, score.bold(), t.tier.label.bold())
        } else {
            format!("{} {} {}", t.tier.emoji, score, t.tier.label)
        },
        t.score_label.clone(),
    ];
    if let Some(grade) = &t.grade {
        lines.push(format!("Grade: {}", grade));
    }
    lines.push(format!("\"{}\"", t.verdict));
    lines.push(String::new());

    for (i, cat) in t.categories.iter().enumerate() {
        let worst = if i == t.worst && t.total_checked > 0 { "  <- worst" } else { "" };
        lines.push(format!("  {} {}: {}/{}{}", cat.emoji, cat.name, cat.checked, cat.total, worst));
    }
    lines.push(format!("  {} checked in total", t.total_checked));
    lines.join("\n")
}

fn format_listing(l: &Listing, use_colors: bool) -> String {
    let mut lines = vec![
        if use_colors {
            format!("{} {}", l.ticker.bold(), l.coin_name.bold())
        } else {
            format!("{} {}", l.ticker, l.coin_name)
        },
        format!("\"{}\"", l.tagline),
        String::new(),
        format!("  Chain:      {}", l.chain),
        format!("  Mascot:     {}", l.mascot),
        format!("  Market cap: {}", format_mcap(l.market_cap)),
        format!("  Holders:    {}", format_count(l.holders)),
        format!("  Rug risk:   {}%", l.rug_risk),
        String::new(),
        "Roadmap".to_string(),
    ];
    for (i, step) in l.roadmap.iter().enumerate() {
        lines.push(format!("  Q{}: {}", i + 1, step));
    }
    lines.push(String::new());
    lines.push(format!("Degen grade {} ({}) {}/100", l.grade, l.tier_label, l.score));
    lines.push(format!("\"{}\"", l.verdict));
    lines.join("\n")
}

/// Share text followed by one intent link per network
pub fn format_share(text: &str, links: &[ShareLink], use_colors: bool) -> String {
    let mut lines = vec![text.to_string(), String::new()];
    for link in links {
        if use_colors {
            lines.push(format!("{:<9} {}", link.network.name(), link.url.underline()));
        } else {
            lines.push(format!("{:<9} {}", link.network.name(), link.url));
        }
    }
    lines.join("\n")
}

/// Public post listing: "{emoji} {title} | {category} | {date} | {n} min read"
pub fn format_post_list(posts: &[&Post], use_colors: bool) -> String {
    if posts.is_empty() {
        return "No posts yet.".to_string();
    }

    posts
        .iter()
        .map(|post| {
            let date = post
                .published_at
                .unwrap_or(post.created_at)
                .format("%b %-d, %Y")
                .to_string();
            let meta = format!("{} | {} | {} min read", post.category.label(), date, post.reading_time());
            let mut line = if use_colors {
                format!("{} {}  {}\n   {}", post.cover_emoji, post.title.bold(), meta.dimmed(), post.slug.cyan())
            } else {
                format!("{} {}  {}\n   {}", post.cover_emoji, post.title, meta, post.slug)
            };
            if !post.excerpt.is_empty() {
                line.push_str("\n   ");
                line.push_str(&post.excerpt);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Single post: a metadata header, then the body rendered to HTML
pub fn format_post_detail(post: &Post, use_colors: bool) -> String {
    let date = post
        .published_at
        .unwrap_or(post.created_at)
        .format("%B %-d, %Y")
        .to_string();
    let title = format!("{} {}", post.cover_emoji, post.title);
    let title = if use_colors { title.bold().to_string() } else { title };

    format!(
        "{}\n{} {} | {} | {} min read\n\n{}",
        title,
        post.category.emoji(),
        post.category.label(),
        date,
        post.reading_time(),
        markdown_to_html(&post.content)
    )
}

/// Admin table of every post, drafts included, newest first
/// Index column is the post id, right-aligned
pub fn format_admin_table(posts: &[&Post], now: DateTime<Utc>, use_colors: bool) -> String {
    if posts.is_empty() {
        return "No posts yet.".to_string();
    }

    let term_width = get_terminal_width();
    let id_width = posts.iter().map(|p| p.id.to_string().len()).max().unwrap_or(1);
    let separator = "  ";

    posts
        .iter()
        .map(|post| {
            let id_str = format!("{:>width$}.", post.id, width = id_width);
            let status = format!("{:<9}", post.status.to_string());
            let age = format_age(now - post.updated_at);

            let fixed_width = id_width + 2 + status.len() + 4 + separator.len() * 2 + post.slug.len();
            let title = match term_width {
                Some(width) if width > fixed_width + 10 => truncate_title(&post.title, width - fixed_width),
                // Very narrow terminal, show truncated
                Some(_) => truncate_title(&post.title, 20),
                // No terminal (pipe), don't truncate
                None => post.title.clone(),
            };

            if use_colors {
                let status = match post.status {
                    PostStatus::Published => status.green().to_string(),
                    PostStatus::Draft => status.yellow().to_string(),
                };
                format!(
                    "{} {} {:>4}{}{}{}{}",
                    id_str.dimmed(),
                    status,
                    age.dimmed(),
                    separator,
                    title.bold(),
                    separator,
                    post.slug.underline()
                )
            } else {
                format!(
                    "{} {} {:>4}{}{}{}{}",
                    id_str, status, age, separator, title, separator, post.slug
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format posts as tab-separated values for scripting
/// Columns: id, status, category, slug, title (no headers, no colors)
pub fn format_tsv(posts: &[&Post]) -> String {
    if posts.is_empty() {
        return String::new();
    }

    posts
        .iter()
        .map(|post| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                post.id,
                post.status,
                post.category.as_str(),
                post.slug,
                post.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate title to fit available width, accounting for Unicode
fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}
