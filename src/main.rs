mod board;
mod calendar;
mod config;
mod db;
mod error;
mod followup;
mod intake;
mod kv;
mod models;
mod store;
mod templates;
mod tui;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use board::{load_order, save_order, Board, DropOutcome, DropTarget, OrderPolicy, Partitions, StoreSync};
use calendar::{CalendarEvent, CalendarService};
use config::Config;
use db::Database;
use kv::MemoryKv;
use models::{Application, Interview, NewApplication, OfferDetails, Status};
use store::{Outcome, Persister, RecordStore};

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Job application tracker - log applications, interviews and offers on a kanban board")]
struct Cli {
    /// Database file (overrides config and JOBTRACK_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Run the command without saving any changes
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Add an application
    Add {
        /// Company name
        #[arg(short, long)]
        company: Option<String>,

        /// Role title
        #[arg(short, long)]
        role: Option<String>,

        /// Job posting URL; LinkedIn, Indeed and Glassdoor links fill in company and role
        #[arg(short, long)]
        url: Option<String>,

        /// Initial status
        #[arg(short, long, default_value = "applied")]
        status: Status,

        /// Date applied (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[arg(short, long)]
        notes: Option<String>,

        /// Role template that sets up the interview loop (see `jobtrack templates`)
        #[arg(short, long)]
        template: Option<String>,

        #[command(flatten)]
        offer: OfferArgs,
    },

    /// List applications
    List {
        /// Filter by status (applied, interviewing, offer, rejected, accepted)
        #[arg(short, long)]
        status: Option<Status>,

        /// Filter by company
        #[arg(short, long)]
        company: Option<String>,
    },

    /// Show application details
    Show {
        /// Application ID
        id: String,
    },

    /// Edit an application
    Edit {
        /// Application ID
        id: String,

        #[arg(short, long)]
        company: Option<String>,

        #[arg(short, long)]
        role: Option<String>,

        #[arg(short, long)]
        url: Option<String>,

        #[arg(short, long)]
        status: Option<Status>,

        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[arg(short, long)]
        notes: Option<String>,

        /// Replace the interview list with a role template
        #[arg(short, long)]
        template: Option<String>,

        /// Clear all offer details before applying offer flags
        #[arg(long)]
        clear_offer: bool,

        #[command(flatten)]
        offer: OfferArgs,
    },

    /// Delete an application
    Delete {
        /// Application ID
        id: String,
    },

    /// Move a card on the board, as if dragged
    Move {
        /// Application ID
        id: String,

        /// Column name, or the ID of the card to drop onto
        target: String,
    },

    /// Manage interviews
    Interview {
        #[command(subcommand)]
        command: InterviewCommands,
    },

    /// Show the follow-up queue, or follow up on one application
    Followup {
        /// Application ID to follow up on (prints an email draft and records today's date)
        id: Option<String>,

        /// Days without contact before an application is due
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Export an interview to a calendar
    Calendar {
        /// Application ID
        id: String,

        /// Interview ID or type
        interview: String,

        #[arg(short, long, value_enum, default_value = "google")]
        service: CalendarService,

        /// Write to a file instead of stdout (useful with --service ics)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Open the kanban board
    Board {
        /// Print the columns instead of opening the interactive board
        #[arg(long)]
        print: bool,
    },

    /// List known companies
    Companies {
        /// Suggest known companies similar to this name
        #[arg(long)]
        suggest: Option<String>,
    },

    /// List role templates
    Templates,

    /// Show the prep checklist for an interview type
    Prep {
        /// Interview type, e.g. "System Design"
        kind: String,
    },

    /// Show summary counts
    Stats,

    /// Read company and role from a LinkedIn, Indeed or Glassdoor job URL
    Intake {
        url: String,
    },

    /// Export all applications as JSON
    Export,
}

#[derive(Subcommand)]
enum InterviewCommands {
    /// Add an interview to an application
    Add {
        /// Application ID
        id: String,

        /// Interview type, e.g. Technical, Behavioral
        #[arg(short = 'k', long = "type")]
        kind: String,

        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Time (HH:MM)
        #[arg(short, long)]
        time: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Remove an interview
    Remove {
        /// Application ID
        id: String,

        /// Interview ID
        interview: String,
    },
}

#[derive(Args, Default)]
struct OfferArgs {
    #[arg(long)]
    salary: Option<String>,
    #[arg(long)]
    equity: Option<String>,
    #[arg(long)]
    bonus: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    start_date: Option<String>,
    #[arg(long)]
    deadline: Option<String>,
}

impl OfferArgs {
    fn apply(self, offer: &mut OfferDetails) {
        let fields = [
            (self.salary, &mut offer.salary),
            (self.equity, &mut offer.equity),
            (self.bonus, &mut offer.bonus),
            (self.location, &mut offer.location),
            (self.start_date, &mut offer.start_date),
            (self.deadline, &mut offer.deadline),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("JOBTRACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(db_path: &Path, dry_run: bool) -> Result<RecordStore> {
    let db = Database::open(db_path)?;
    db.ensure_initialized()?;
    let mut store = RecordStore::load(&db).context("Failed to load applications")?;
    if dry_run {
        store.subscribe(Persister::new(MemoryKv::new()));
    } else {
        store.subscribe(Persister::new(db));
    }
    Ok(store)
}

/// Creates the storage table. A dry run touches nothing and returns false.
fn init_database(path: &Path, dry_run: bool) -> Result<bool> {
    if dry_run {
        return Ok(false);
    }
    Database::open(path)?.init()?;
    Ok(true)
}

/// Persists the board's column order when the manual policy is on.
fn keep_layout(config: &Config, dry_run: bool, partitions: &Partitions) -> Result<()> {
    if config.board_order != OrderPolicy::PreserveManual || dry_run {
        return Ok(());
    }
    let mut db = Database::open(&config.database)?;
    save_order(&mut db, partitions)?;
    Ok(())
}

fn template_interviews(template: &str) -> Result<Vec<Interview>> {
    templates::interviews_for_role(template).ok_or_else(|| {
        anyhow!(
            "Unknown role template '{}'. Run 'jobtrack templates' to list them.",
            template
        )
    })
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(path) = cli.db {
        config.database = path;
    }
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Init => {
            if init_database(&config.database, cli.dry_run)? {
                println!("Database initialized at {}", config.database.display());
            } else {
                println!("Dry run: would initialize the database at {}", config.database.display());
            }
        }

        Commands::Add {
            company,
            role,
            url,
            status,
            date,
            notes,
            template,
            offer,
        } => {
            let mut store = open_store(&config.database, cli.dry_run)?;
            let lead = url.as_deref().and_then(intake::parse_job_url);

            let company = company
                .or_else(|| lead.as_ref().and_then(|l| l.company.clone()))
                .ok_or_else(|| anyhow!("--company is required (the URL did not name one)"))?;
            let role = role
                .or_else(|| lead.as_ref().and_then(|l| l.role.clone()))
                .ok_or_else(|| anyhow!("--role is required (the URL did not name one)"))?;

            if !store.companies().iter().any(|c| *c == company) {
                if let Some((close, _)) = store.suggest_companies(&company, 1).first() {
                    println!("Note: new company '{}' (did you mean '{}'?)", company, close);
                }
            }

            let mut application = NewApplication::new(&company, &role, date.unwrap_or(today));
            application.status = status;
            application.job_url = url.unwrap_or_default();
            application.notes = notes.unwrap_or_default();
            if let Some(template) = template {
                application.interviews = template_interviews(&template)?;
            }
            offer.apply(&mut application.offer_details);

            let id = store.create(application)?;
            println!("Added application #{} ({} at {})", id, role, company);
        }

        Commands::List { status, company } => {
            let store = open_store(&config.database, cli.dry_run)?;
            let mut apps: Vec<&Application> = store
                .applications()
                .iter()
                .filter(|a| status.is_none_or(|s| a.status == s))
                .filter(|a| {
                    company
                        .as_deref()
                        .is_none_or(|c| a.company.eq_ignore_ascii_case(c))
                })
                .collect();
            apps.sort_by(|a, b| b.date_applied.cmp(&a.date_applied));

            if apps.is_empty() {
                println!("No applications found.");
            } else {
                println!("{:<17} {:<13} {:<28} {:<20} {:<10}", "ID", "STATUS", "ROLE", "COMPANY", "APPLIED");
                println!("{}", "-".repeat(92));
                for app in apps {
                    let due = if followup::needs_follow_up(app, today, config.follow_up_days) { " !" } else { "" };
                    println!(
                        "{:<17} {:<13} {:<28} {:<20} {:<10}{}",
                        app.id,
                        app.status,
                        truncate(&app.role, 26),
                        truncate(&app.company, 18),
                        app.date_applied,
                        due
                    );
                }
            }
        }

        Commands::Show { id } => {
            let store = open_store(&config.database, cli.dry_run)?;
            match store.get(&id) {
                Some(app) => print_application(app, today, config.follow_up_days),
                None => println!("Application #{} not found.", id),
            }
        }

        Commands::Edit {
            id,
            company,
            role,
            url,
            status,
            date,
            notes,
            template,
            clear_offer,
            offer,
        } => {
            let mut store = open_store(&config.database, cli.dry_run)?;
            let mut application = store.require(&id)?.to_new();

            if let Some(company) = company {
                application.company = company;
            }
            if let Some(role) = role {
                application.role = role;
            }
            if let Some(url) = url {
                application.job_url = url;
            }
            if let Some(status) = status {
                application.status = status;
            }
            if let Some(date) = date {
                application.date_applied = date;
            }
            if let Some(notes) = notes {
                application.notes = notes;
            }
            if let Some(template) = template {
                application.interviews = template_interviews(&template)?;
            }
            if clear_offer {
                application.offer_details = OfferDetails::default();
            }
            offer.apply(&mut application.offer_details);

            store.update(&id, application)?;
            println!("Updated application #{}", id);
        }

        Commands::Delete { id } => {
            let mut store = open_store(&config.database, cli.dry_run)?;
            match store.delete(&id)? {
                Outcome::Deleted(_) => println!("Deleted application #{}", id),
                _ => println!("Application #{} not found.", id),
            }
        }

        Commands::Move { id, target } => {
            let mut store = open_store(&config.database, cli.dry_run)?;
            store.require(&id)?;

            let saved = load_order(&Database::open(&config.database)?)?;
            let mut board = Board::restore(store.applications(), config.board_order, saved);
            board.drag_start(&id);
            let mut sync = StoreSync::new(&mut store);
            let outcome = board.drag_end(Some(DropTarget::parse(&target)), &mut sync);
            sync.finish()?;
            board.sync(store.applications());
            keep_layout(&config, cli.dry_run, board.partitions())?;

            match outcome {
                DropOutcome::Moved { from, to, .. } => {
                    println!("Moved #{} from {} to {}", id, from.label(), to.label());
                }
                DropOutcome::Reordered { column, to, .. } => match config.board_order {
                    OrderPolicy::PreserveManual => {
                        println!("Moved #{} to position {} in {}", id, to + 1, column.label());
                    }
                    OrderPolicy::ByDate => {
                        println!(
                            "{} is sorted by date, so #{} keeps its place. Set board_order = \"manual\" to arrange cards by hand.",
                            column.label(),
                            id
                        );
                    }
                },
                DropOutcome::Rejected { .. } | DropOutcome::Ignored => {
                    println!("#{} stays where it is.", id);
                }
            }
        }

        Commands::Interview { command } => {
            let mut store = open_store(&config.database, cli.dry_run)?;
            match command {
                InterviewCommands::Add {
                    id,
                    kind,
                    date,
                    time,
                    notes,
                } => {
                    let mut application = store.require(&id)?.to_new();
                    let interview = Interview {
                        id: format!("interview-{}", Utc::now().timestamp_millis()),
                        kind,
                        date: date.map(|d| d.to_string()).unwrap_or_default(),
                        time: time.unwrap_or_default(),
                        notes: notes.unwrap_or_default(),
                    };
                    let interview_id = interview.id.clone();
                    application.interviews.push(interview);
                    store.update(&id, application)?;
                    println!("Added interview {} to #{}", interview_id, id);
                }

                InterviewCommands::Remove { id, interview } => {
                    let mut application = store.require(&id)?.to_new();
                    let before = application.interviews.len();
                    application.interviews.retain(|i| i.id != interview);
                    if application.interviews.len() == before {
                        bail!("Interview {} not found on #{}", interview, id);
                    }
                    store.update(&id, application)?;
                    println!("Removed interview {} from #{}", interview, id);
                }
            }
        }

        Commands::Followup { id, days } => {
            let mut store = open_store(&config.database, cli.dry_run)?;
            let days = days.unwrap_or(config.follow_up_days);
            match id {
                Some(id) => {
                    let draft = followup::mailto(store.require(&id)?);
                    store.mark_followed_up(&id, today)?;
                    println!("{}", draft);
                    println!("\nMarked #{} as followed up on {}", id, today);
                }
                None => {
                    let queue = followup::queue(store.applications(), today, days);
                    if queue.is_empty() {
                        println!("Nothing to follow up on.");
                    } else {
                        println!("Follow-up queue ({}):", queue.len());
                        for app in queue {
                            let since = if app.last_follow_up.is_some() { "last follow-up" } else { "application" };
                            println!(
                                "  #{} {} at {} - {} days since {}",
                                app.id,
                                app.role,
                                app.company,
                                followup::days_since(app, today),
                                since
                            );
                        }
                    }
                }
            }
        }

        Commands::Calendar {
            id,
            interview,
            service,
            output,
        } => {
            let store = open_store(&config.database, cli.dry_run)?;
            let app = store.require(&id)?;
            let found = app
                .interviews
                .iter()
                .find(|i| i.id == interview)
                .or_else(|| app.interviews.iter().find(|i| i.kind.eq_ignore_ascii_case(&interview)))
                .ok_or_else(|| anyhow!("Interview '{}' not found on #{}", interview, id))?;

            let event = CalendarEvent::from_interview(found, &app.company, &app.role, &Local)?;
            let rendered = event.render(service);
            match output {
                Some(path) => {
                    std::fs::write(&path, &rendered)
                        .with_context(|| format!("Failed to write to {}", path.display()))?;
                    println!("Calendar event saved to: {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Board { print } => {
            let mut store = open_store(&config.database, cli.dry_run)?;
            let saved = load_order(&Database::open(&config.database)?)?;
            if print {
                let board = Board::restore(store.applications(), config.board_order, saved);
                for (status, ids) in board.partitions().iter() {
                    println!("{} ({})", status.label(), ids.len());
                    for id in ids {
                        if let Some(app) = board.get(id) {
                            println!("  #{} {} - {}", app.id, truncate(&app.role, 30), truncate(&app.company, 20));
                        }
                    }
                }
            } else {
                let order = tui::run_board(&mut store, &config, saved)?;
                keep_layout(&config, cli.dry_run, &order)?;
            }
        }

        Commands::Companies { suggest } => {
            let store = open_store(&config.database, cli.dry_run)?;
            match suggest {
                Some(name) => {
                    let matches = store.suggest_companies(&name, 5);
                    if matches.is_empty() {
                        println!("No similar companies.");
                    }
                    for (company, score) in matches {
                        println!("{:<30} {:.2}", company, score);
                    }
                }
                None => {
                    if store.companies().is_empty() {
                        println!("No companies yet.");
                    }
                    for company in store.companies() {
                        println!("{}", company);
                    }
                }
            }
        }

        Commands::Templates => {
            for (role, kinds) in templates::ROLE_TEMPLATES {
                println!("{:<24} {}", role, kinds.join(" -> "));
            }
        }

        Commands::Prep { kind } => match templates::prep_for(&kind) {
            Some(prep) => {
                println!("{} prep checklist", prep.kind);
                for item in prep.checklist {
                    println!("  [ ] {}", item);
                }
                if !prep.links.is_empty() {
                    println!("\nResources:");
                    for link in prep.links {
                        println!("  {}", link);
                    }
                }
            }
            None => println!("No prep checklist for '{}'.", kind),
        },

        Commands::Stats => {
            let store = open_store(&config.database, cli.dry_run)?;
            let stats = store.stats(today, config.follow_up_days);
            println!("Total applications: {}", stats.total);
            for status in Status::ALL {
                println!("  {:<13} {}", status.label(), stats.count(status));
            }
            println!("Need follow-up:     {}", stats.needs_follow_up);
        }

        Commands::Intake { url } => match intake::parse_job_url(&url) {
            Some(lead) => {
                println!("URL: {}", lead.url);
                println!("Company: {}", lead.company.as_deref().unwrap_or("(unknown)"));
                println!("Role: {}", lead.role.as_deref().unwrap_or("(unknown)"));
                println!("\nAdd it with: jobtrack add --url '{}'", lead.url);
            }
            None => println!("Could not read a company or role from that URL."),
        },

        Commands::Export => {
            let store = open_store(&config.database, cli.dry_run)?;
            println!("{}", serde_json::to_string_pretty(store.applications())?);
        }
    }

    Ok(())
}

fn print_application(app: &Application, today: NaiveDate, follow_up_days: i64) {
    println!("Application #{}", app.id);
    println!("Role: {}", app.role);
    println!("Company: {}", app.company);
    println!("Status: {}", app.status.label());
    println!("Applied: {}", app.date_applied);
    if !app.job_url.is_empty() {
        println!("URL: {}", app.job_url);
    }
    if let Some(last) = app.last_follow_up {
        println!("Last follow-up: {}", last);
    }
    if followup::needs_follow_up(app, today, follow_up_days) {
        println!("Follow-up due: {} days without contact", followup::days_since(app, today));
    }

    if !app.interviews.is_empty() {
        let template = templates::matching_role(&app.interviews)
            .map(|role| format!(" (template: {})", role))
            .unwrap_or_default();
        println!("\nInterviews{}:", template);
        for interview in &app.interviews {
            let when = format!("{} {}", interview.date, interview.time);
            let when = when.trim();
            println!(
                "  {} {} {}",
                interview.id,
                interview.kind,
                if when.is_empty() { "(unscheduled)" } else { when }
            );
            if !interview.notes.is_empty() {
                println!("      {}", interview.notes);
            }
        }
    }

    if app.offer_details.has_any() {
        println!("\nOffer:");
        for (label, value) in app.offer_details.fields() {
            if !value.is_empty() {
                println!("  {}: {}", label, value);
            }
        }
    }

    if !app.notes.is_empty() {
        println!("\n--- Notes ---\n{}", textwrap::fill(&app.notes, 80));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
