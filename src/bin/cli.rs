//! Command-line shell for the acervo catalog engine.
//!
//! The shell is the thin external caller: it maps each subcommand onto one
//! engine operation, renders the structured payload as text or JSON, and
//! exits nonzero on engine errors. A store that is unreachable at startup
//! leaves the catalog degraded rather than killing the process; operations
//! then report the unavailable condition.

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use acervo::{Catalog, Config, Driver, EntityKind, NewBook, Params, Value};

#[derive(Parser, Debug)]
#[command(
    name = "acervo",
    version,
    about = "Book catalog over an embedded labeled-property graph",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Store URI: memory: or file:<path> [env: ACERVO_URI]"
    )]
    uri: Option<String>,

    #[arg(long, global = true, help = "Store username [env: ACERVO_USERNAME]")]
    username: Option<String>,

    #[arg(long, global = true, help = "Store password [env: ACERVO_PASSWORD]")]
    password: Option<String>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upsert a book with its author, genres, and optional publisher.
    AddBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long, help = "Comma-separated genre names")]
        genres: String,
        #[arg(long)]
        publisher: Option<String>,
        #[arg(long)]
        year: Option<i64>,
        #[arg(long)]
        pages: Option<i64>,
    },
    /// Recommend books by genre substring, optionally filtered by author.
    Recommend {
        genre: String,
        #[arg(help = "Author substring; omit or pass 'any' for all authors")]
        author: Option<String>,
    },
    /// Dump the whole catalog, one entry per book.
    Dump,
    /// List all genre names.
    Genres,
    /// List all author names.
    Authors,
    /// Execute a raw statement with optional JSON parameters.
    Raw {
        query: String,
        #[arg(long, default_value = "{}", help = "Named parameters as a JSON object")]
        params: String,
    },
    /// Delete every node and relationship. Irreversible.
    Clear,
    /// Verify store connectivity.
    Ping,
    /// Node counts for all four labels.
    Stats,
    /// Authors ranked by number of books written.
    TopAuthors {
        #[arg(long, default_value_t = 3)]
        limit: u64,
    },
    /// Genres ranked by number of books carrying them.
    TopGenres {
        #[arg(long, default_value_t = 3)]
        limit: u64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    // Environment first, explicit flags override.
    let mut config = Config::from_env();
    if let Some(uri) = &cli.uri {
        config.uri = uri.clone();
    }
    if let Some(username) = &cli.username {
        config.credentials.username = Some(username.clone());
    }
    if let Some(password) = &cli.password {
        config.credentials.password = Some(password.clone());
    }
    let catalog = Catalog::new(Driver::connect_or_degraded(&config));

    match run(&catalog, &cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error [{}]: {err}", err.category().as_str());
            ExitCode::FAILURE
        }
    }
}

fn run(catalog: &Catalog, cli: &Cli) -> acervo::Result<()> {
    match &cli.command {
        Command::AddBook {
            title,
            author,
            genres,
            publisher,
            year,
            pages,
        } => {
            let receipt = catalog.add_book(&NewBook {
                title: title.clone(),
                author: author.clone(),
                genres: Catalog::split_genres(genres),
                publisher: publisher.clone(),
                year: *year,
                pages: *pages,
            })?;
            match cli.format {
                OutputFormat::Json => print_json(&receipt),
                OutputFormat::Text => {
                    println!("upserted '{}'", receipt.title);
                    if receipt.summary.is_empty() {
                        println!("  no changes (already present)");
                    } else {
                        println!(
                            "  nodes created: {}, relationships created: {}, properties set: {}",
                            receipt.summary.nodes_created,
                            receipt.summary.relationships_created,
                            receipt.summary.properties_set
                        );
                    }
                }
            }
        }
        Command::Recommend { genre, author } => {
            let results = catalog.recommend(genre, author.as_deref())?;
            match cli.format {
                OutputFormat::Json => print_json(&results),
                OutputFormat::Text => {
                    if results.is_empty() {
                        println!("no matches");
                    }
                    for rec in &results {
                        println!(
                            "{} by {} [{}] year={} pages={}",
                            rec.title, rec.author, rec.genre, rec.year, rec.pages
                        );
                    }
                }
            }
        }
        Command::Dump => {
            let dump = catalog.dump()?;
            match cli.format {
                OutputFormat::Json => print_json(&dump),
                OutputFormat::Text => {
                    println!("{} book(s)", dump.total_books);
                    for book in &dump.books {
                        println!(
                            "{} | authors: {} | genres: {} | publishers: {} | year={} pages={}",
                            book.title,
                            book.authors.join(", "),
                            book.genres.join(", "),
                            book.publishers.join(", "),
                            book.year.map_or("N/A".to_owned(), |y| y.to_string()),
                            book.pages.map_or("N/A".to_owned(), |p| p.to_string()),
                        );
                    }
                }
            }
        }
        Command::Genres => print_names(cli.format, &catalog.genres()?),
        Command::Authors => print_names(cli.format, &catalog.authors()?),
        Command::Raw { query, params } => {
            let params = parse_params(params)?;
            let outcome = catalog.run_raw(query, &params)?;
            let payload = outcome.to_payload();
            match cli.format {
                OutputFormat::Json => println!("{payload}"),
                OutputFormat::Text => println!(
                    "{}",
                    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
                ),
            }
        }
        Command::Clear => {
            let summary = catalog.clear()?;
            match cli.format {
                OutputFormat::Json => print_json(&summary),
                OutputFormat::Text => println!(
                    "cleared: {} node(s), {} relationship(s)",
                    summary.nodes_deleted, summary.relationships_deleted
                ),
            }
        }
        Command::Ping => {
            catalog.ping()?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "connected": true })),
                OutputFormat::Text => println!("store reachable"),
            }
        }
        Command::Stats => {
            let counts: Vec<(&str, u64)> = EntityKind::all()
                .into_iter()
                .map(|kind| (kind.label(), catalog.count(kind)))
                .collect();
            match cli.format {
                OutputFormat::Json => {
                    let object: serde_json::Map<String, serde_json::Value> = counts
                        .iter()
                        .map(|(label, count)| {
                            (label.to_lowercase(), serde_json::Value::from(*count))
                        })
                        .collect();
                    println!("{}", serde_json::Value::Object(object));
                }
                OutputFormat::Text => {
                    for (label, count) in counts {
                        println!("{label}: {count}");
                    }
                }
            }
        }
        Command::TopAuthors { limit } => {
            let ranks = catalog.top_authors(*limit)?;
            match cli.format {
                OutputFormat::Json => print_json(&ranks),
                OutputFormat::Text => {
                    for rank in &ranks {
                        println!("{}: {} book(s)", rank.author, rank.book_count);
                    }
                }
            }
        }
        Command::TopGenres { limit } => {
            let ranks = catalog.top_genres(*limit)?;
            match cli.format {
                OutputFormat::Json => print_json(&ranks),
                OutputFormat::Text => {
                    for rank in &ranks {
                        println!("{}: {} book(s)", rank.genre, rank.book_count);
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_names(format: OutputFormat, names: &[String]) {
    match format {
        OutputFormat::Json => print_json(&names),
        OutputFormat::Text => {
            for name in names {
                println!("{name}");
            }
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => eprintln!("error: failed to render response: {err}"),
    }
}

fn parse_params(raw: &str) -> acervo::Result<Params> {
    let json: serde_json::Value = serde_json::from_str(raw).map_err(|err| {
        acervo::CatalogError::Validation(format!("--params must be a JSON object: {err}"))
    })?;
    match json {
        serde_json::Value::Object(entries) => Ok(entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect()),
        _ => Err(acervo::CatalogError::Validation(
            "--params must be a JSON object".into(),
        )),
    }
}
