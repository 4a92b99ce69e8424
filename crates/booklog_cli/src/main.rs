//! Command line front end for the book store.
//!
//! Every subcommand opens the database, runs one repository operation and
//! prints the result as JSON (`null` when nothing matched).

use booklog_core::db::open_db;
use booklog_core::{
    default_log_level, init_logging, AddOutcome, BookId, BookRepository, BookService,
    Condition, FieldSelection, NewBook, SearchHits, SearchMode, SqliteBookRepository,
};
use clap::{Args, Parser, Subcommand};
use log::error;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "booklog", version, about = "Keep track of your books", long_about = None)]
struct Cli {
    /// SQLite database file, created on first use
    #[arg(long, value_name = "FILE", default_value = "booklog.sqlite3")]
    db: PathBuf,

    /// Write rolling log files to this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error; only valid together with --log-dir
    #[arg(long, value_name = "LEVEL", requires = "log_dir")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct BookKey {
    #[arg(long)]
    title: String,
    #[arg(long)]
    author_name: String,
    #[arg(long)]
    author_surname: String,
}

#[derive(Args)]
struct Projection {
    /// `All`, or column names separated by commas/spaces
    #[arg(long, default_value = "All", value_parser = FieldSelection::parse)]
    fields: FieldSelection,
}

#[derive(Subcommand)]
enum Command {
    /// Insert a book
    Add {
        #[command(flatten)]
        key: BookKey,
        #[arg(long)]
        pages: i64,
        #[arg(long)]
        genre: String,
        #[arg(long)]
        owned: Option<bool>,
        #[arg(long)]
        tags: Option<String>,
        /// Skip the insert when the title and author already exist
        #[arg(long)]
        unique: bool,
    },
    /// Delete the book with this key
    RemoveId { book_id: BookId },
    /// Delete every book with this title and author
    Remove {
        #[command(flatten)]
        key: BookKey,
    },
    /// Show the most recently added book
    Last {
        #[command(flatten)]
        projection: Projection,
    },
    /// Show the book with this key
    Get {
        book_id: BookId,
        #[command(flatten)]
        projection: Projection,
    },
    /// Show a book by title and author
    Find {
        #[command(flatten)]
        key: BookKey,
        #[command(flatten)]
        projection: Projection,
    },
    /// Print whether a book with this title and author exists
    Exists {
        #[command(flatten)]
        key: BookKey,
    },
    /// Show every book
    List {
        #[command(flatten)]
        projection: Projection,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("booklog: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        init_logging(&level, std::path::absolute(log_dir)?)?;
    }

    let conn = open_db(&cli.db)?;
    let repo = SqliteBookRepository::try_new(&conn)?;
    let service = BookService::new(repo);

    match cli.command {
        Command::Add {
            key,
            pages,
            genre,
            owned,
            tags,
            unique,
        } => {
            let book = NewBook {
                title: key.title,
                author_name: key.author_name,
                author_surname: key.author_surname,
                pages,
                genre,
                owned,
                tags,
            };
            let outcome = if unique {
                service.add_book_if_absent(&book)?
            } else {
                AddOutcome::Added(service.add_book(&book)?)
            };
            match outcome {
                AddOutcome::Added(book_id) => print_json(&serde_json::json!({ "added": book_id })),
                AddOutcome::AlreadyPresent(book_id) => {
                    print_json(&serde_json::json!({ "existing": book_id }))
                }
            }
        }
        Command::RemoveId { book_id } => {
            let removed = service.repo().remove_by_id(book_id)?;
            print_json(&serde_json::json!({ "removed": removed }))
        }
        Command::Remove { key } => {
            let removed =
                service.remove_book(&key.title, &key.author_name, &key.author_surname)?;
            print_json(&serde_json::json!({ "removed": removed }))
        }
        Command::Last { projection } => print_json(&service.repo().get_last(&projection.fields)?),
        Command::Get {
            book_id,
            projection,
        } => print_json(&service.repo().search_by_id(book_id, &projection.fields)?),
        Command::Find { key, projection } => print_json(&service.repo().search_by_title_author(
            &key.title,
            &key.author_name,
            &key.author_surname,
            &projection.fields,
        )?),
        Command::Exists { key } => print_json(&service.repo().is_in_database(
            &key.title,
            &key.author_name,
            &key.author_surname,
        )?),
        Command::List { projection } => {
            let rows = service
                .repo()
                .search_general(&Condition::none(), &projection.fields, SearchMode::All)?
                .map(SearchHits::into_rows);
            print_json(&rows)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
