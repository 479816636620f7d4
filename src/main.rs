use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;

use dafuqbro::admin::editor::DraftFields;
use dafuqbro::blog::{BlogState, CategoryFilter, PostDraft, StoreError};
use dafuqbro::config::Config;
use dafuqbro::quiz::{Catalog, LookupError};
use dafuqbro::scoring::Answers;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_CONFIG: i32 = 4;
const EXIT_NOT_FOUND: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the quiz tools (default if no subcommand)
    List,
    /// Play a quiz in the terminal
    Play {
        /// Tool slug, as shown by `list`
        slug: String,

        /// Fix every random draw so the run can be replayed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Score answers without the TUI and print the result
    Score {
        slug: String,

        /// Answer a question or pitch field (repeatable), e.g. `-a q1=sushi`
        #[arg(short, long = "answer", value_name = "ID=VALUE")]
        answers: Vec<String>,

        /// Tick a checklist item (repeatable)
        #[arg(short = 'x', long = "check", value_name = "ITEM")]
        checked: Vec<String>,

        #[arg(long)]
        seed: Option<u64>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,

        /// Also print the share text and share links
        #[arg(long)]
        share: bool,
    },
    /// Check the config and quiz data, reporting every problem
    Validate,
    /// Read the blog
    Blog {
        #[command(subcommand)]
        command: BlogCommand,
    },
    /// Manage blog posts (requires `admin login`)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
enum BlogCommand {
    /// List published posts, newest first
    List {
        /// guides, memes, updates or all
        #[arg(short = 't', long, default_value = "all")]
        category: String,
    },
    /// Show a published post rendered to HTML
    Show { slug: String },
    /// Render a Markdown file (or `-` for stdin) to HTML
    Render { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Log in and save a session token for the other admin commands
    Login,
    /// Revoke the saved session
    Logout,
    /// List every post, drafts included
    Posts {
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Create a post (prompts for fields when none are given on a terminal)
    New(PostArgs),
    /// Edit a post by id
    Edit {
        id: u64,
        #[command(flatten)]
        fields: PostArgs,
    },
    /// Delete a post by id
    Delete {
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Flip a post between draft and published
    Toggle { id: u64 },
}

#[derive(Args, Debug, Default)]
struct PostArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    slug: Option<String>,
    #[arg(long)]
    excerpt: Option<String>,
    /// guides, memes or updates
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    emoji: Option<String>,
    /// draft or published
    #[arg(long)]
    status: Option<String>,
    /// Markdown file for the body, `-` for stdin
    #[arg(long, value_name = "FILE")]
    content: Option<PathBuf>,
}

impl From<PostArgs> for DraftFields {
    fn from(args: PostArgs) -> Self {
        DraftFields {
            title: args.title,
            slug: args.slug,
            excerpt: args.excerpt,
            category: args.category,
            cover_emoji: args.emoji,
            status: args.status,
            content_file: args.content,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dafuqbro")]
#[command(about = "Unhinged personality quizzes and a tiny blog, in your terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/dafuqbro/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::List);
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match dafuqbro::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = dafuqbro::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if cli.verbose {
        match &config.data_dir {
            Some(dir) => eprintln!("Quiz data from {} (built-ins for missing files)", dir.display()),
            None => eprintln!("Using built-in quiz data"),
        }
    }

    // Load and validate the quiz catalog at startup
    let catalog = match Catalog::load(config.data_dir.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Quiz data error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Err(errors) = dafuqbro::quiz::validate_catalog(&catalog) {
        eprintln!("Quiz data errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if cli.verbose {
        eprintln!(
            "Loaded {} tools and {} quizzes in {:?}",
            catalog.tools.len(),
            catalog.quizzes.len(),
            start_time.elapsed()
        );
    }

    let use_colors = dafuqbro::output::should_use_colors();

    // Route based on subcommand
    match command {
        Commands::List => {
            println!("{}", dafuqbro::output::format_tool_list(&catalog, cli.verbose, use_colors));
        }
        Commands::Play { slug, seed } => {
            let quiz = playable_or_exit(&catalog, &slug).clone();
            let app = match dafuqbro::tui::App::new(quiz, &config, seed) {
                Ok(app) => app,
                Err(e) => {
                    eprintln!("Cannot start quiz: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            if cli.verbose {
                eprintln!(
                    "Calculating delay {:?}, message interval {:?}",
                    app.calculating_delay, app.message_interval
                );
            }

            let colors = dafuqbro::tui::resolve_theme(config.theme);
            if let Err(e) = dafuqbro::tui::run_tui(app, colors).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
        Commands::Score {
            slug,
            answers,
            checked,
            seed,
            json,
            share,
        } => {
            let quiz = playable_or_exit(&catalog, &slug);
            run_score(&config, quiz, answers, checked, seed, json, share, use_colors, cli.verbose);
        }
        Commands::Validate => {
            // Config and catalog were validated above
            println!(
                "OK: config and {} quizzes ({} tools) are valid",
                catalog.quizzes.len(),
                catalog.tools.len()
            );
        }
        Commands::Blog { command } => run_blog(&config, command, use_colors, cli.verbose),
        Commands::Admin { command } => run_admin(&config, command, use_colors, cli.verbose),
    }

    std::process::exit(EXIT_SUCCESS);
}

fn playable_or_exit<'a>(catalog: &'a Catalog, slug: &str) -> &'a dafuqbro::quiz::QuizDefinition {
    match catalog.playable(slug) {
        Ok(quiz) => quiz,
        Err(e) => {
            eprintln!("{}", e);
            if matches!(e, LookupError::Unknown(_)) {
                let slugs: Vec<&str> = catalog
                    .tools
                    .iter()
                    .filter(|t| t.active)
                    .map(|t| t.slug.as_str())
                    .collect();
                eprintln!("Available: {}", slugs.join(", "));
            }
            std::process::exit(EXIT_NOT_FOUND);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_score(
    config: &Config,
    quiz: &dafuqbro::quiz::QuizDefinition,
    raw_answers: Vec<String>,
    checked: Vec<String>,
    seed: Option<u64>,
    json: bool,
    share: bool,
    use_colors: bool,
    verbose: bool,
) {
    let mut answers = Answers::new();
    for raw in raw_answers {
        match raw.split_once('=') {
            Some((id, value)) => {
                answers.insert(id.trim().to_string(), value.trim().to_string());
            }
            None => {
                eprintln!("Invalid answer '{}': expected ID=VALUE", raw);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }
    let checked: BTreeSet<String> = checked.into_iter().collect();

    if verbose {
        eprintln!("Scoring {} with {} answers and {} checked items", quiz.slug, answers.len(), checked.len());
    }

    let mut rng: rand::rngs::StdRng = match seed {
        Some(seed) => rand::SeedableRng::seed_from_u64(seed),
        None => rand::SeedableRng::from_entropy(),
    };
    let outcome = match dafuqbro::quiz::evaluate_answers(quiz, &answers, &checked, &mut rng) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Quiz data error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Failed to serialize outcome: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    } else {
        println!("{}", dafuqbro::output::format_outcome(quiz, &outcome, use_colors));
    }

    if share {
        let text = dafuqbro::quiz::share_text(quiz, &outcome);
        let url = dafuqbro::quiz::share_url(&config.site_url, quiz);
        let links = dafuqbro::quiz::share_links(&text, &url);
        println!();
        println!("{}", dafuqbro::output::format_share(&text, &links, use_colors));
    }
}

fn load_blog_or_exit(config: &Config, verbose: bool) -> (PathBuf, BlogState) {
    let path = config.blog_path();
    if verbose {
        eprintln!("Blog file: {}", path.display());
    }
    match dafuqbro::blog::load_blog(&path) {
        Ok(state) => (path, state),
        Err(e) => {
            eprintln!("Blog error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn run_blog(config: &Config, command: BlogCommand, use_colors: bool, verbose: bool) {
    match command {
        BlogCommand::List { category } => {
            let filter: CategoryFilter = match category.parse() {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            let (_, state) = load_blog_or_exit(config, verbose);
            let posts = state.list_published(filter);
            println!("{}", dafuqbro::output::format_post_list(&posts, use_colors));
        }
        BlogCommand::Show { slug } => {
            let (_, state) = load_blog_or_exit(config, verbose);
            match state.published_by_slug(&slug) {
                Ok(post) => println!("{}", dafuqbro::output::format_post_detail(post, use_colors)),
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_NOT_FOUND);
                }
            }
        }
        BlogCommand::Render { file } => match dafuqbro::admin::editor::read_content(&file) {
            Ok(md) => println!("{}", dafuqbro::blog::markdown_to_html(&md)),
            Err(e) => {
                eprintln!("{:#}", e);
                std::process::exit(EXIT_NOT_FOUND);
            }
        },
    }
}

/// Exit unless the saved token opens a live session.
fn require_admin(config: &Config, verbose: bool) {
    let token_path = dafuqbro::admin::credentials::get_token_path();
    let token = match dafuqbro::admin::credentials::load_saved_token(&token_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Credential error: {:#}", e);
            std::process::exit(EXIT_AUTH);
        }
    };
    let store = match dafuqbro::admin::load_sessions(&config.sessions_path()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Session error: {:#}", e);
            std::process::exit(EXIT_AUTH);
        }
    };
    if let Err(e) = dafuqbro::admin::require_session(&store, token.as_deref(), Utc::now()) {
        eprintln!("{}", e);
        std::process::exit(EXIT_AUTH);
    }
    if verbose {
        eprintln!("Admin session OK");
    }
}

fn exit_for_store_error(e: StoreError) -> ! {
    eprintln!("{}", e);
    match e {
        StoreError::NotFound(_) | StoreError::SlugNotFound(_) => std::process::exit(EXIT_NOT_FOUND),
        // Bad post fields share the config exit code
        StoreError::DuplicateSlug(_) | StoreError::EmptySlug => std::process::exit(EXIT_CONFIG),
    }
}

fn save_blog_or_exit(path: &std::path::Path, state: &BlogState) {
    if let Err(e) = dafuqbro::blog::save_blog(path, state) {
        eprintln!("Failed to save blog: {:#}", e);
        std::process::exit(EXIT_CONFIG);
    }
}

/// Collect post fields from flags, or interactively when none were given.
fn draft_or_exit(base: PostDraft, fields: DraftFields) -> PostDraft {
    let result = if fields.is_empty() && std::io::stdin().is_terminal() {
        dafuqbro::admin::editor::prompt_draft(base)
    } else {
        fields.apply(base)
    };
    match result {
        Ok(draft) => draft,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn run_admin(config: &Config, command: AdminCommand, use_colors: bool, verbose: bool) {
    match command {
        AdminCommand::Login => {
            let credentials = dafuqbro::admin::AdminCredentials::from_env();
            if credentials.is_default_password() {
                eprintln!(
                    "Warning: using the default admin password. Set {} to change it.",
                    dafuqbro::admin::credentials::ENV_PASSWORD_VAR
                );
            }

            let (username, password) = match dafuqbro::admin::credentials::prompt_login() {
                Ok(pair) => pair,
                Err(e) => {
                    eprintln!("Credential error: {:#}", e);
                    std::process::exit(EXIT_AUTH);
                }
            };

            let sessions_path = config.sessions_path();
            let mut store = match dafuqbro::admin::load_sessions(&sessions_path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Session error: {:#}", e);
                    std::process::exit(EXIT_AUTH);
                }
            };

            let token = match dafuqbro::admin::login(
                &credentials,
                &mut store,
                &username,
                &password,
                Utc::now(),
                &mut rand::rngs::OsRng,
            ) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_AUTH);
                }
            };

            let token_path = dafuqbro::admin::credentials::get_token_path();
            let saved = dafuqbro::admin::save_sessions(&sessions_path, &store)
                .and_then(|()| dafuqbro::admin::credentials::save_token(&token_path, &token));
            if let Err(e) = saved {
                eprintln!("Failed to save session: {:#}", e);
                std::process::exit(EXIT_AUTH);
            }

            if verbose {
                eprintln!("Session saved to {}", sessions_path.display());
            }
            println!(
                "Logged in as {} for {} days",
                credentials.username(),
                dafuqbro::admin::session::SESSION_TTL_DAYS
            );
        }
        AdminCommand::Logout => {
            let token_path = dafuqbro::admin::credentials::get_token_path();
            let token = dafuqbro::admin::credentials::load_saved_token(&token_path).ok().flatten();

            if let Some(token) = token {
                let sessions_path = config.sessions_path();
                match dafuqbro::admin::load_sessions(&sessions_path) {
                    Ok(mut store) => {
                        store.invalidate(&token);
                        if let Err(e) = dafuqbro::admin::save_sessions(&sessions_path, &store) {
                            eprintln!("Failed to save sessions: {:#}", e);
                        }
                    }
                    Err(e) => eprintln!("Session error: {:#}", e),
                }
            }
            if let Err(e) = dafuqbro::admin::credentials::clear_token(&token_path) {
                eprintln!("{:#}", e);
                std::process::exit(EXIT_AUTH);
            }
            println!("Logged out");
        }
        AdminCommand::Posts { tsv } => {
            require_admin(config, verbose);
            let (_, state) = load_blog_or_exit(config, verbose);
            let posts = state.list_all();
            if tsv {
                println!("{}", dafuqbro::output::format_tsv(&posts));
            } else {
                println!("{}", dafuqbro::output::format_admin_table(&posts, Utc::now(), use_colors));
            }
        }
        AdminCommand::New(args) => {
            require_admin(config, verbose);
            let (path, mut state) = load_blog_or_exit(config, verbose);
            let draft = draft_or_exit(PostDraft::default(), args.into());
            let (id, slug) = match state.create(draft, Utc::now()) {
                Ok(post) => (post.id, post.slug.clone()),
                Err(e) => exit_for_store_error(e),
            };
            save_blog_or_exit(&path, &state);
            println!("Created post {} ({})", id, slug);
        }
        AdminCommand::Edit { id, fields } => {
            require_admin(config, verbose);
            let (path, mut state) = load_blog_or_exit(config, verbose);
            let base = match state.get(id) {
                Ok(post) => PostDraft::from(post),
                Err(e) => exit_for_store_error(e),
            };
            let draft = draft_or_exit(base, fields.into());
            let slug = match state.update(id, draft, Utc::now()) {
                Ok(post) => post.slug.clone(),
                Err(e) => exit_for_store_error(e),
            };
            save_blog_or_exit(&path, &state);
            println!("Updated post {} ({})", id, slug);
        }
        AdminCommand::Delete { id, yes } => {
            require_admin(config, verbose);
            let (path, mut state) = load_blog_or_exit(config, verbose);
            let title = match state.get(id) {
                Ok(post) => post.title.clone(),
                Err(e) => exit_for_store_error(e),
            };
            if !yes {
                let confirmed = dafuqbro::admin::editor::prompt_yes_no(&format!("Delete \"{}\"?", title), false)
                    .unwrap_or(false);
                if !confirmed {
                    println!("Cancelled");
                    return;
                }
            }
            if let Err(e) = state.delete(id) {
                exit_for_store_error(e);
            }
            save_blog_or_exit(&path, &state);
            println!("Deleted post {}", id);
        }
        AdminCommand::Toggle { id } => {
            require_admin(config, verbose);
            let (path, mut state) = load_blog_or_exit(config, verbose);
            let status = match state.toggle_status(id, Utc::now()) {
                Ok(s) => s,
                Err(e) => exit_for_store_error(e),
            };
            save_blog_or_exit(&path, &state);
            println!("Post {} is now {}", id, status);
        }
    }
}
