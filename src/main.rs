use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use watchlist::config::{self, DB_ENV_VAR};
use watchlist::validate::MAX_RATING;
use watchlist::{Movie, MovieForm, MovieStore, SaveRequest, WatchFilter, Watchlist};

#[derive(Parser)]
#[command(name = "watchlist")]
#[command(about = "Keep a local list of movies to watch")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the database file
    #[arg(long, env = DB_ENV_VAR)]
    db: Option<PathBuf>,

    /// Use a throwaway in-memory database (overrides --db)
    #[arg(long)]
    in_memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show movies, newest first
    List {
        /// Only titles containing this text (case-insensitive)
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(short, long, value_enum, default_value_t = WatchFilter::All)]
        filter: WatchFilter,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a movie
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        year: String,

        /// 1 to 5
        #[arg(short, long, default_value = "")]
        rating: String,

        #[arg(short, long)]
        watched: bool,
    },

    /// Change fields of a movie; omitted fields keep their values
    Edit {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        /// Empty string clears the year
        #[arg(short, long)]
        year: Option<String>,

        /// Empty string clears the rating
        #[arg(short, long)]
        rating: Option<String>,

        #[arg(short, long)]
        watched: Option<bool>,
    },

    /// Flip a movie between watched and unwatched
    Toggle { id: i64 },

    /// Delete a movie
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Check whether a title/year pair is already listed
    Exists {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        year: i32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let store = open_store(&cli)?;

    let mut list = Watchlist::new(store);
    list.reload()?;

    run(&mut list, cli.command)?;

    list.into_store().close()
}

fn open_store(cli: &Cli) -> Result<MovieStore> {
    if cli.in_memory {
        MovieStore::open_in_memory()
    } else {
        MovieStore::open(config::resolve_db_path(cli.db.as_deref()))
    }
}

fn run(list: &mut Watchlist, command: Commands) -> Result<()> {
    match command {
        Commands::List { search, filter, json } => {
            list.set_search(search);
            list.set_filter(filter);
            let view = list.view();

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else if view.is_empty() {
                println!("{}", "No movies".dimmed());
            } else {
                for movie in view {
                    println!("{}", format_movie(movie));
                }
            }
        }
        Commands::Add {
            title,
            year,
            rating,
            watched,
        } => {
            let form = MovieForm {
                title,
                year,
                rating,
                watched,
            };
            list.save(SaveRequest::NewDraft(form))?;
            if let Some(movie) = list.records().first() {
                println!("{} {}", "Added".green(), format_movie(movie));
            }
        }
        Commands::Edit {
            id,
            title,
            year,
            rating,
            watched,
        } => {
            let existing = find_movie(list, id)?;
            let form = MovieForm::from_movie(existing).with_overrides(title, year, rating, watched);

            list.save(SaveRequest::ExistingRecord { id, form })?;
            let movie = find_movie(list, id)?;
            println!("{} {}", "Updated".green(), format_movie(movie));
        }
        Commands::Toggle { id } => {
            let current = find_movie(list, id)?.watched;
            list.toggle(id, current)?;
            let movie = find_movie(list, id)?;
            println!("{} {}", "Toggled".green(), format_movie(movie));
        }
        Commands::Delete { id, yes } => {
            let title = find_movie(list, id)?.title.clone();
            if !yes && !confirm(&format!("Delete \"{}\"?", title))? {
                println!("Cancelled");
                return Ok(());
            }
            list.remove(id)?;
            println!("{} {}", "Deleted".red(), title);
        }
        Commands::Exists { title, year } => {
            if list.store().exists(&title, year)? {
                println!("{} \"{}\" ({}) is already listed", "yes".green(), title, year);
            } else {
                println!("{} \"{}\" ({}) is not listed", "no".yellow(), title, year);
            }
        }
    }

    Ok(())
}

fn find_movie(list: &Watchlist, id: i64) -> Result<&Movie> {
    list.find(id).ok_or_else(|| eyre!("No movie with id {}", id))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn format_movie(movie: &Movie) -> String {
    let mark = if movie.is_watched() {
        "[x]".green()
    } else {
        "[ ]".normal()
    };
    let year = movie.year.map(|y| format!(" ({})", y)).unwrap_or_default();
    let rating = movie
        .rating
        .map(|r| format!("  {}", rating_stars(r)).yellow().to_string())
        .unwrap_or_default();

    format!("{:>4} {} {}{}{}", movie.id, mark, movie.title.bold(), year, rating)
}

fn rating_stars(rating: i32) -> String {
    "*".repeat(rating.clamp(0, MAX_RATING) as usize)
}
