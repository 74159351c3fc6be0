//! Notebook CLI - manage notes in the document database.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use notebook_core::{parse_human_date, CreateNote, Note, NoteImage, NoteQuery, NoteService};
use notebook_surreal::{
    DatabaseSettings, SurrealNoteRepository, DEFAULT_DATABASE, DEFAULT_NAMESPACE,
};
use std::io::{self, Read};

/// Embedded on-disk database in the working directory.
const DEFAULT_CLI_ENDPOINT: &str = "surrealkv://.notebook";

#[derive(Parser)]
#[command(name = "notebook", about = "Manage notes in the document database", version)]
struct Cli {
    #[command(flatten)]
    db: DbArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DbArgs {
    /// Database endpoint (mem://, surrealkv://PATH, ws://HOST:PORT)
    #[arg(long, global = true, env = "NOTEBOOK_DB_ENDPOINT", default_value = DEFAULT_CLI_ENDPOINT)]
    endpoint: String,
    /// Database namespace
    #[arg(long, global = true, env = "NOTEBOOK_DB_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    namespace: String,
    /// Database name
    #[arg(long, global = true, env = "NOTEBOOK_DB_DATABASE", default_value = DEFAULT_DATABASE)]
    database: String,
    /// Root username for remote databases
    #[arg(long, global = true, env = "NOTEBOOK_DB_USERNAME")]
    username: Option<String>,
    /// Root password for remote databases
    #[arg(long, global = true, env = "NOTEBOOK_DB_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl From<DbArgs> for DatabaseSettings {
    fn from(args: DbArgs) -> Self {
        DatabaseSettings {
            endpoint: args.endpoint,
            namespace: args.namespace,
            database: args.database,
            username: args.username,
            password: args.password,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the note indexes
    Init {
        /// Delete all notes and insert the sample set
        #[arg(long)]
        seed: bool,
        /// Owner of the sample notes
        #[arg(long, default_value = "1")]
        user_id: i64,
    },
    /// Add a new note
    Add {
        /// Owning user
        #[arg(long)]
        user_id: i64,
        /// Note body (reads from stdin if not provided)
        #[arg(long)]
        body: Option<String>,
        /// Header image URL
        #[arg(long, requires = "image_size")]
        image_url: Option<String>,
        /// Header image size in bytes
        #[arg(long, requires = "image_url")]
        image_size: Option<i64>,
        /// Header image thumbnail URL
        #[arg(long, requires = "image_url")]
        thumbnail_url: Option<String>,
    },
    /// List notes
    Ls {
        /// Only notes owned by this user
        #[arg(long)]
        user_id: Option<i64>,
        /// Only notes whose body contains this text (case-insensitive)
        #[arg(long)]
        contains: Option<String>,
        /// Filter notes updated after this time (e.g., "2 days ago", "2024-01-01")
        #[arg(long)]
        from: Option<String>,
        /// Only notes with a header image of at most this many bytes
        #[arg(long)]
        max_header_size: Option<i64>,
        /// Number of notes to show (0 for all)
        #[arg(short = 'n', long, default_value = "100")]
        head: i64,
    },
    /// Show one or more notes
    Show {
        /// Comma-separated note IDs
        ids: String,
        /// Only show the first n lines of each note body
        #[arg(short = 'n', long)]
        head: Option<usize>,
    },
    /// Edit the body of a note
    Edit {
        /// Note ID
        id: String,
        /// New body (reads from stdin if not provided and stdin is not a tty)
        #[arg(long)]
        body: Option<String>,
        /// Rewrite the whole document instead of updating the body field
        #[arg(long)]
        replace: bool,
    },
    /// Delete one or more notes
    Rm {
        /// Comma-separated note IDs
        ids: String,
    },
    /// Delete every note
    Clear,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_ids(ids: &str) -> Vec<String> {
    ids.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read from stdin")?;
    Ok(buf)
}

fn is_stdin_tty() -> bool {
    atty::is(atty::Stream::Stdin)
}

fn print_summary_line(note: &Note) {
    let summary = note.to_summary(80);
    println!(
        "{}: user {} ({}) -- {}",
        summary.id,
        summary.user_id,
        summary.updated_on.format("%Y-%m-%d %H:%M:%S"),
        summary.body_preview
    );
}

fn print_note(note: &Note, head: Option<usize>) {
    println!("# {}\n", note.id);

    if let Some(n) = head {
        let lines: Vec<&str> = note.body.lines().take(n).collect();
        println!("{}", lines.join("\n"));
        if note.body.lines().count() > n {
            println!("...");
        }
    } else {
        println!("{}", note.body);
    }

    println!("\n---\n");
    println!("User: {}", note.user_id);
    println!("Created: {}", note.created_on.to_rfc3339());
    println!("Last modified: {}", note.updated_on.to_rfc3339());
    if let Some(ref image) = note.header_image {
        println!("Header image: {} ({} bytes)", image.url, image.image_size);
        if !image.thumbnail_url.is_empty() {
            println!("Thumbnail: {}", image.thumbnail_url);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let settings = DatabaseSettings::from(cli.db);
    tracing::debug!(endpoint = %settings.endpoint, "opening database");
    let repo = SurrealNoteRepository::connect(&settings)
        .await
        .with_context(|| format!("Failed to open database at {}", settings.endpoint))?;
    let service = NoteService::new(repo);

    match cli.command {
        Commands::Init { seed, user_id } => {
            let index = if seed {
                let (notes, index) = service.seed_sample_notes(user_id).await?;
                println!("Seeded {} sample notes for user {}", notes.len(), user_id);
                index
            } else {
                service.create_index().await?
            };
            println!("Indexes ready ({})", index);
        }

        Commands::Add {
            user_id,
            body,
            image_url,
            image_size,
            thumbnail_url,
        } => {
            let body = match body {
                Some(b) => b,
                None => read_stdin()?,
            };
            let header_image = match (image_url, image_size) {
                (Some(url), Some(image_size)) => Some(NoteImage {
                    image_size,
                    url,
                    thumbnail_url: thumbnail_url.unwrap_or_default(),
                }),
                _ => None,
            };
            let note = service
                .add_note(CreateNote {
                    body,
                    header_image,
                    user_id,
                })
                .await?;
            println!("Added note {}", note.id);
        }

        Commands::Ls {
            user_id,
            contains,
            from,
            max_header_size,
            head,
        } => {
            let updated_from = match from {
                Some(s) => match parse_human_date(&s) {
                    Some(dt) => Some(dt),
                    None => bail!("Could not parse date: {}", s),
                },
                None => None,
            };

            let query = NoteQuery {
                body_contains: contains,
                updated_from,
                max_header_size,
                user_id,
                limit: Some(head),
            };
            let notes = service.find_notes(query.clone()).await?;
            let num_notes = notes.len() as i64;

            for note in &notes {
                print_summary_line(note);
            }

            // Show truncation message if there are more notes
            if head > 0 && num_notes >= head {
                let total = service.count_notes(query).await?;
                if total > head {
                    println!("[Showing the latest {}/{} notes]", head, total);
                }
            }
        }

        Commands::Show { ids, head } => {
            let ids = parse_ids(&ids);
            if ids.is_empty() {
                eprintln!("No note IDs provided");
                std::process::exit(1);
            }

            let mut not_found = Vec::new();
            let mut first = true;

            for id in &ids {
                match service.get_note(id).await? {
                    Some(note) => {
                        if !first {
                            println!("\n{}\n", "=".repeat(40));
                        }
                        first = false;
                        print_note(&note, head);
                    }
                    None => not_found.push(id),
                }
            }

            if !not_found.is_empty() {
                if !first {
                    eprintln!();
                }
                for id in &not_found {
                    eprintln!("Note {} not found", id);
                }
                std::process::exit(1);
            }
        }

        Commands::Edit { id, body, replace } => {
            let body = match body {
                Some(b) => b,
                None if !is_stdin_tty() => read_stdin()?,
                None => {
                    eprintln!("Nothing to update");
                    std::process::exit(1);
                }
            };

            let updated = if replace {
                service.update_note_document(&id, body).await?
            } else {
                service.update_note_body(&id, body).await?
            };

            if updated {
                println!("Edited note {}", id);
            } else {
                eprintln!("Note {} not found", id);
                std::process::exit(1);
            }
        }

        Commands::Rm { ids } => {
            let ids = parse_ids(&ids);
            if ids.is_empty() {
                eprintln!("No note IDs provided");
                std::process::exit(1);
            }

            let mut deleted = Vec::new();
            let mut not_found = Vec::new();

            for id in &ids {
                if service.remove_note(id).await? {
                    deleted.push(id);
                } else {
                    not_found.push(id);
                }
            }

            for id in &deleted {
                println!("Deleted note {}", id);
            }

            if !not_found.is_empty() {
                for id in &not_found {
                    eprintln!("Note {} not found", id);
                }
                std::process::exit(1);
            }
        }

        Commands::Clear => {
            let count = service.remove_all_notes().await?;
            let noun = if count == 1 { "note" } else { "notes" };
            println!("Removed {} {}", count, noun);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ids_skips_blanks() {
        assert_eq!(parse_ids(" a, ,b,"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_image_flags_require_each_other() {
        let result = Cli::try_parse_from(["notebook", "add", "--user-id", "1", "--image-url", "x"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "notebook",
            "--endpoint",
            "mem://",
            "add",
            "--user-id",
            "1",
            "--body",
            "hi",
            "--image-url",
            "http://localhost/a.png",
            "--image-size",
            "12",
        ])
        .unwrap();
        assert_eq!(cli.db.endpoint, "mem://");
        assert!(matches!(cli.command, Commands::Add { image_size: Some(12), .. }));
    }
}
