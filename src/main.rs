mod catalog;
mod cursor;
mod filter;
mod models;
mod normalize;
mod source;
mod tui;

use anyhow::{Context, Result};
use catalog::CatalogStore;
use clap::{Parser, Subcommand};
use models::{Deadline, DetailView};
use source::Source;
use tracing_subscriber::EnvFilter;
use tui::truncate;

#[derive(Parser)]
#[command(name = "gongo")]
#[command(about = "Browse and search scraped job postings")]
struct Cli {
    /// Posting document: a JSON file path or an http(s) URL
    #[arg(short, long, global = true)]
    source: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List postings matching a query
    List {
        /// Case-insensitive text matched against title, company, and location
        #[arg(short, long, default_value = "")]
        query: String,

        /// Maximum number of postings to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print the matching records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the detail view of one posting
    Show {
        /// Posting ID
        id: String,

        /// Print the detail view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one posting at a time from the filtered results
    Card {
        #[arg(short, long, default_value = "")]
        query: String,

        /// Zero-based position within the results
        #[arg(short, long, default_value = "0")]
        index: usize,
    },

    /// Interactive browser
    Browse {
        #[arg(short, long, default_value = "")]
        query: String,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = match &cli.source {
        Some(input) => Source::parse(input),
        None => Source::File(Source::default_path()),
    };

    let mut store = CatalogStore::new();
    store.load_or_empty(source.load());

    match cli.command {
        Commands::List { query, limit, json } => {
            store.set_query(&query);
            let results = store.results();
            if json {
                let shown = &results[..results.len().min(limit.unwrap_or(usize::MAX))];
                let out = serde_json::to_string_pretty(shown)
                    .context("Failed to serialize postings")?;
                println!("{}", out);
            } else if results.is_empty() {
                println!("No results.");
            } else {
                println!("{:<20} {:<32} {:<20} {:<20}", "ID", "TITLE", "COMPANY", "LOCATION");
                println!("{}", "-".repeat(95));
                for posting in results.iter().take(limit.unwrap_or(usize::MAX)) {
                    println!(
                        "{:<20} {:<32} {:<20} {:<20}",
                        truncate(&posting.id, 18),
                        truncate(&posting.title, 30),
                        truncate(posting.company.as_deref().unwrap_or("-"), 18),
                        truncate(posting.location.as_deref().unwrap_or("-"), 18)
                    );
                }
                if results.len() < store.postings().len() {
                    println!("\n{} of {} postings match '{}'", results.len(), store.postings().len(), store.query());
                }
            }
        }

        Commands::Show { id, json } => match store.select_detail(&id) {
            Some(detail) if json => {
                let out = serde_json::to_string_pretty(&detail)
                    .with_context(|| format!("Failed to serialize posting '{}'", id))?;
                println!("{}", out);
            }
            Some(detail) => print_detail(&detail),
            None => println!("Posting '{}' not found.", id),
        },

        Commands::Card { query, index } => {
            store.set_query(&query);
            if store.current().is_none() {
                println!("No results.");
                return Ok(());
            }
            for _ in 0..index {
                if let Some(notice) = store.next().notice() {
                    println!("{}", notice);
                    break;
                }
            }
            if let (Some(posting), Some(position)) = (store.current(), store.cursor().position()) {
                println!("[{}/{}] {}", position + 1, store.results().len(), posting.title);
                println!("{}", posting.location.as_deref().unwrap_or("No location"));
                if let Some(company) = &posting.company {
                    println!("at {}", company);
                }
                if let Some(summary) = &posting.summary {
                    println!("\n{}", textwrap::fill(summary, 70));
                }
                if let Some(link) = &posting.link {
                    println!("\nURL: {}", link);
                }
                println!("ID: {}", posting.id);
            }
        }

        Commands::Browse { query } => {
            store.set_query(&query);
            tui::run_browse(store)?;
        }
    }

    Ok(())
}

fn print_detail(detail: &DetailView) {
    if !detail.registered_at.is_empty() {
        println!("Registered: {}", detail.registered_at);
    }
    if !detail.company.is_empty() {
        println!("{}", detail.company);
    }
    println!("{}", detail.title);

    let deadline = match detail.deadline_kind() {
        Deadline::UntilFilled => "open until filled".to_string(),
        kind @ Deadline::On(_) => match kind.days_left(chrono::Local::now().date_naive()) {
            Some(days) if days >= 0 => format!("D-{}", days),
            _ => "closed".to_string(),
        },
        Deadline::Unspecified => "check deadline".to_string(),
    };
    println!(
        "Deadline: {} | Education: {} | Experience: {}",
        deadline,
        if detail.education_irrelevant() { "any" } else { "required" },
        if detail.experience_irrelevant() { "any" } else { "required" },
    );

    print_section("Recruitment", &[
        ("Job type", &detail.job_type),
        ("Hours", &detail.work_hours),
        ("Experience", &detail.experience),
        ("Education", &detail.education),
        ("Employment", &detail.employment_type),
    ]);
    print_section("Conditions", &[
        ("Wage", &detail.wage),
        ("Location", &detail.work_location),
        ("Work form", &detail.work_form),
        ("Insurance", &detail.insurance),
        ("Severance", &detail.severance),
    ]);

    if !detail.job_description.is_empty() {
        println!("\n--- Duties ---");
        for line in &detail.job_description {
            println!("  {}", line);
        }
    }

    if detail.license_required() {
        print_section("Qualifications", &[
            ("Major", &detail.qualification.major),
            ("License", &detail.qualification.license),
        ]);
    }

    print_section("How to apply", &[
        ("Screening", &detail.screening),
        ("Method", &detail.application_method),
        ("Documents", &detail.documents),
        ("URL", &detail.application_url),
        ("Deadline", &detail.deadline),
    ]);
    print_section("Contact", &[
        ("Manager", &detail.contact.manager),
        ("Phone", &detail.contact.phone),
        ("Mobile", &detail.contact.mobile),
        ("Fax", &detail.contact.fax),
        ("Email", &detail.contact.email),
    ]);
}

fn print_section(heading: &str, rows: &[(&str, &String)]) {
    println!("\n--- {} ---", heading);
    for (label, value) in rows {
        if !value.is_empty() {
            println!("  {:<12} {}", label, value);
        }
    }
}
