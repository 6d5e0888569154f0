//! Lectern CLI - Read and search the ESV from the command line

use clap::{Parser, Subcommand};
use lectern_client::{Bible, HtmlOptions, TextOptions};
use lectern_core::{Config, LecternError, ParsedChapter, NO_HEADING};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "Read and search the ESV", long_about = None)]
struct Cli {
    /// Config file (defaults apply if it does not exist)
    #[arg(long, global = true, default_value = "lectern.toml")]
    config: PathBuf,

    /// API token (overrides the configured key file)
    #[arg(long, global = true, env = "LECTERN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default lectern.toml
    Init,

    /// List the books of the canon with chapter counts
    Books,

    /// Show the chapter after BOOK CHAPTER
    Next { book: String, chapter: u32 },

    /// Show the chapter before BOOK CHAPTER
    Prev { book: String, chapter: u32 },

    /// Plain-text passage for a free-form query (e.g., "John 11:35")
    Text { query: String },

    /// A whole chapter split into headings and verses
    Chapter {
        book: String,
        chapter: u32,

        /// Skip the chapter cache and validate the response strictly
        #[arg(long)]
        no_cache: bool,
    },

    /// HTML passage for a free-form query
    Html {
        query: String,

        /// Passage HTML only (no footnotes or audio link)
        #[arg(long)]
        basic: bool,
    },

    /// Link to the audio recording of a chapter or verse
    Audio {
        book: String,
        chapter: u32,
        verse: Option<u32>,
    },

    /// Full-text search
    Search {
        query: String,

        /// Results per page (max 100)
        #[arg(long, default_value_t = lectern_client::DEFAULT_SEARCH_PAGE_SIZE)]
        page_size: usize,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Inspect or reset the chapter cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cached chapters and resident verses
    Stats,
    /// Empty every cached chapter
    Clear,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = run(&cli);

    if let Err(e) = result {
        if cli.json {
            let error_json = serde_json::json!({
                "code": error_code(&e),
                "message": e.to_string(),
                "retryable": e.is_retryable(),
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error_json).unwrap_or_else(|_| e.to_string())
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LECTERN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> lectern_core::Result<()> {
    match &cli.command {
        Commands::Init => cmd_init(&cli.config),
        Commands::Books => cmd_books(cli.json),
        Commands::Next { book, chapter } => cmd_adjacent(book, *chapter, true, cli.json),
        Commands::Prev { book, chapter } => cmd_adjacent(book, *chapter, false, cli.json),
        Commands::Text { query } => cmd_text(cli, query),
        Commands::Chapter {
            book,
            chapter,
            no_cache,
        } => cmd_chapter(cli, book, *chapter, *no_cache),
        Commands::Html { query, basic } => cmd_html(cli, query, *basic),
        Commands::Audio {
            book,
            chapter,
            verse,
        } => cmd_audio(cli, book, *chapter, *verse),
        Commands::Search {
            query,
            page_size,
            page,
        } => cmd_search(cli, query, *page_size, *page),
        Commands::Cache { action } => cmd_cache(cli, action),
    }
}

fn error_code(err: &LecternError) -> &'static str {
    match err {
        LecternError::InvalidPassage(_) => "passage_invalid",
        LecternError::PassageNotFound(_) => "passage_not_found",
        LecternError::SearchInvalid(_) => "search_invalid",
        LecternError::SearchError(_) => "search_error",
        LecternError::UnknownBook(_) => "unknown_book",
        LecternError::MissingApiKey(_) => "missing_api_key",
        LecternError::ConfigParse(_) => "config_error",
        _ => "error",
    }
}

fn load_config(path: &Path) -> lectern_core::Result<Config> {
    let config = Config::load_or_default(path)?;
    debug!(config = %path.display(), "loaded config");
    Ok(config)
}

fn make_bible(cli: &Cli) -> lectern_core::Result<Bible> {
    let config = load_config(&cli.config)?;
    let api_key = config.api_key(cli.api_key.as_deref())?;
    Bible::from_config(&config, &api_key)
}

fn print_json<T: serde::Serialize>(value: &T) -> lectern_core::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(config_path: &Path) -> lectern_core::Result<()> {
    use colored::Colorize;

    if config_path.exists() {
        println!("{} {}", "Exists".yellow(), config_path.display());
        return Ok(());
    }
    std::fs::write(config_path, lectern_core::config::DEFAULT_CONFIG)?;
    println!("{} {}", "Created".green(), config_path.display());
    Ok(())
}

fn cmd_books(json: bool) -> lectern_core::Result<()> {
    use colored::Colorize;

    let books = lectern_core::ordered_books();
    if json {
        let list: Vec<_> = books
            .iter()
            .map(|b| serde_json::json!({ "name": b.name, "chapters": b.chapter_count }))
            .collect();
        return print_json(&list);
    }
    for book in books {
        println!("{:<16} {}", book.name, book.chapter_count.to_string().cyan());
    }
    Ok(())
}

fn cmd_adjacent(book: &str, chapter: u32, forward: bool, json: bool) -> lectern_core::Result<()> {
    let (book, chapter) = if forward {
        lectern_core::next_passage(book, chapter)?
    } else {
        lectern_core::previous_passage(book, chapter)?
    };
    if json {
        return print_json(&serde_json::json!({ "book": book, "chapter": chapter }));
    }
    println!("{} {}", book, chapter);
    Ok(())
}

fn cmd_text(cli: &Cli, query: &str) -> lectern_core::Result<()> {
    use colored::Colorize;

    let bible = make_bible(cli)?;
    let passage = bible.api().passage_text(query, &TextOptions::default())?;

    if cli.json {
        return print_json(&serde_json::json!({
            "canonical": passage.canonical,
            "sections": passage.sections,
            "footnotes": passage.footnotes,
        }));
    }
    if passage.is_overloaded() {
        println!("{}", passage.canonical.yellow());
    } else {
        println!("{}", passage.canonical.bold());
    }
    for (heading, text) in passage.sections.iter() {
        if heading != NO_HEADING {
            println!("\n{}", heading.cyan());
        }
        print!("{}", text);
    }
    if !passage.footnotes.is_empty() {
        println!("\n{}", passage.footnotes.dimmed());
    }
    Ok(())
}

fn cmd_chapter(cli: &Cli, book: &str, chapter: u32, no_cache: bool) -> lectern_core::Result<()> {
    let mut bible = make_bible(cli)?;
    let parsed = if no_cache {
        bible.get_chapter_json(book, chapter)?
    } else {
        bible.get_passage(book, chapter)?
    };
    bible.shutdown()?;

    if cli.json {
        return print_json(&parsed);
    }
    print_chapter(&parsed);
    Ok(())
}

fn print_chapter(chapter: &ParsedChapter) {
    use colored::Colorize;

    println!("{}", format!("{} {}", chapter.book, chapter.chapter).bold());
    for (heading, verses) in chapter.verses.iter() {
        if heading != NO_HEADING {
            println!("\n{}", heading.cyan());
        }
        for verse in verses {
            match verse.split_once(' ') {
                Some((number, text)) if number.chars().all(|c| c.is_ascii_digit()) => {
                    println!("{} {}", number.blue(), text);
                }
                _ => println!("{}", verse),
            }
        }
    }
    if !chapter.footnotes.is_empty() {
        println!("\n{}", chapter.footnotes.dimmed());
    }
}

fn cmd_html(cli: &Cli, query: &str, basic: bool) -> lectern_core::Result<()> {
    let bible = make_bible(cli)?;
    if basic {
        let passages = bible.api().passage_html_basic(query)?;
        if cli.json {
            return print_json(&passages);
        }
        for passage in passages {
            println!("{}", passage);
        }
        return Ok(());
    }

    let html = bible.api().passage_html(query, &HtmlOptions::default())?;
    if cli.json {
        return print_json(&html);
    }
    for passage in &html.passages {
        println!("{}", passage);
    }
    Ok(())
}

fn cmd_audio(cli: &Cli, book: &str, chapter: u32, verse: Option<u32>) -> lectern_core::Result<()> {
    let bible = make_bible(cli)?;
    let url = bible.api().audio_url(book, chapter, verse)?;
    if cli.json {
        return print_json(&serde_json::json!({ "url": url }));
    }
    println!("{}", url);
    Ok(())
}

fn cmd_search(cli: &Cli, query: &str, page_size: usize, page: u32) -> lectern_core::Result<()> {
    use colored::Colorize;

    let bible = make_bible(cli)?;
    let results = bible.api().search_page(query, page_size, page)?;
    if cli.json {
        return print_json(&results);
    }
    for result in &results.results {
        println!("{}: {}", result.reference.cyan(), result.content);
    }
    println!(
        "{}: page {} of {} ({} results)",
        "Search".green(),
        results.page,
        results.total_pages,
        results.total_results
    );
    Ok(())
}

fn cmd_cache(cli: &Cli, action: &CacheAction) -> lectern_core::Result<()> {
    use colored::Colorize;

    let config = load_config(&cli.config)?;
    let mut cache =
        lectern_core::ChapterCache::open(&config.cache.path, config.cache.verse_budget);

    match action {
        CacheAction::Stats => {
            if cli.json {
                return print_json(&serde_json::json!({
                    "path": config.cache.path,
                    "chapters": cache.occupied(),
                    "verses": cache.resident_verses(),
                    "budget": cache.budget(),
                }));
            }
            println!("{}: {}", "Cache".blue(), config.cache.path.display());
            println!("{}: {}", "Chapters".blue(), cache.occupied());
            println!(
                "{}: {} / {}",
                "Verses".blue(),
                cache.resident_verses(),
                cache.budget()
            );
        }
        CacheAction::Clear => {
            let cleared = cache.occupied();
            cache.clear();
            cache.flush()?;
            println!("{} {} cached chapters", "Cleared".green(), cleared);
        }
    }
    Ok(())
}
