//! paperbase CLI: the `pbase` command.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use paperbase::audit;
use paperbase::config::StoreConfig;
use paperbase::layout::StoreLayout;
use paperbase::record::RecordKind;
use paperbase::report;
use paperbase::schedule::{
    self, DryRunBackend, IdempotencyLedger, OsascriptBackend, ProcessSummary, ScheduleDefaults,
    SchedulingBackend, TagKind,
};
use paperbase::status::StatusBlock;

#[derive(Parser)]
#[command(name = "pbase", version, about = "Markdown record store: status, scheduling, audits")]
struct Cli {
    /// Store root directory.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store directory skeleton.
    Init,

    /// Report status and staleness of active leads and projects.
    Status,

    /// Dump every record of a category with START/END file markers.
    Dump {
        /// Category: people, leads, projects, or outreach.
        category: String,
    },

    /// Create reminders from @reminder tags in a document.
    Remind {
        /// Markdown file to scan.
        #[arg(long)]
        file: PathBuf,

        /// Parse and print actions without creating anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Create calendar events from @calendar tags in a document.
    Calendar {
        /// Markdown file to scan.
        #[arg(long)]
        file: PathBuf,

        /// Parse and print actions without creating anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Send iMessages from @imessage tags in a document. Dry-run unless --yes.
    Message {
        /// Markdown file to scan.
        #[arg(long)]
        file: PathBuf,

        /// Actually send; without this the command only prints what it would do.
        #[arg(long)]
        yes: bool,
    },

    /// Audit task movement across weekly plan files.
    Audit,

    /// Check a record's status block against the lifecycle invariants.
    Validate {
        /// Record file to check.
        file: PathBuf,

        /// Record kind (lead or project); inferred from the path when omitted.
        #[arg(long)]
        kind: Option<String>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let (layout, config) = paperbase::open_store(&cli.root).into_diagnostic()?;

    match cli.command {
        Commands::Init => {
            layout.ensure_dirs().into_diagnostic()?;
            if !layout.config_file().exists() {
                config.save(&layout.config_file()).into_diagnostic()?;
            }
            println!("Initialized paperbase store at {}", layout.root.display());
        }

        Commands::Status => {
            let today = chrono::Local::now().date_naive();
            let status = report::build_report(&layout, &config, today);
            for warning in &status.warnings {
                tracing::warn!("{warning}");
            }
            print!("{}", report::render_table(&status));
        }

        Commands::Dump { category } => {
            let Some(kind) = RecordKind::from_label(&category) else {
                miette::bail!("unknown category \"{category}\" (expected people, leads, projects, or outreach)");
            };
            let mut stdout = std::io::stdout().lock();
            report::dump::dump_category(&layout, kind, &mut stdout).into_diagnostic()?;
        }

        Commands::Remind { file, dry_run } => {
            run_schedule(&layout, &config, &file, TagKind::Reminder, dry_run)?;
        }

        Commands::Calendar { file, dry_run } => {
            run_schedule(&layout, &config, &file, TagKind::Calendar, dry_run)?;
        }

        Commands::Message { file, yes } => {
            // Sending texts is the least reversible action; stay dry unless
            // explicitly confirmed.
            run_schedule(&layout, &config, &file, TagKind::Imessage, !yes)?;
        }

        Commands::Audit => {
            let audit_report = audit::audit_store(&layout).into_diagnostic()?;
            for warning in &audit_report.warnings {
                tracing::warn!("{warning}");
            }
            print!("{}", audit::render(&audit_report));
        }

        Commands::Validate { file, kind } => {
            let kind = match kind {
                Some(label) => RecordKind::from_label(&label)
                    .filter(RecordKind::has_status_block)
                    .ok_or_else(|| miette::miette!("--kind must be lead or project"))?,
                None => infer_kind(&layout, &file)
                    .ok_or_else(|| miette::miette!(
                        "cannot infer record kind from path; pass --kind lead|project"
                    ))?,
            };
            let text = std::fs::read_to_string(&file).into_diagnostic()?;
            let block = StatusBlock::parse(&text, kind).into_diagnostic()?;
            block.validate().into_diagnostic()?;
            println!(
                "{}: {} status block is consistent",
                file.display(),
                block.status_label()
            );
        }
    }

    Ok(())
}

/// Scan one document for tags of `kind` and execute them through the ledger.
fn run_schedule(
    layout: &StoreLayout,
    config: &StoreConfig,
    file: &std::path::Path,
    kind: TagKind,
    dry_run: bool,
) -> Result<()> {
    let now = chrono::Local::now().naive_local();
    let defaults = ScheduleDefaults {
        reminder_list: config.default_reminder_list.clone(),
        calendar: config.default_calendar.clone(),
    };

    let summary = if dry_run {
        // Consult the real ledger so skips report truthfully, but persist any
        // records to a scratch file: a dry run leaves the real ledger alone.
        let scratch = std::env::temp_dir().join("paperbase-dry-run-ledger.json");
        let mut ledger = IdempotencyLedger::load_with_save_path(&layout.ledger_file(), &scratch);
        let mut backend = DryRunBackend::new();
        schedule::process_file(file, kind, now, &defaults, &mut ledger, &mut backend)
            .into_diagnostic()?
    } else {
        layout.ensure_dirs().into_diagnostic()?;
        let mut ledger = IdempotencyLedger::load(&layout.ledger_file());
        let mut backend: Box<dyn SchedulingBackend> = Box::new(OsascriptBackend::new());
        schedule::process_file(file, kind, now, &defaults, &mut ledger, backend.as_mut())
            .into_diagnostic()?
    };

    print_summary(kind, dry_run, &summary);
    Ok(())
}

fn print_summary(kind: TagKind, dry_run: bool, summary: &ProcessSummary) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let verb = match kind {
        TagKind::Reminder => "created reminder",
        TagKind::Calendar => "created event",
        TagKind::Imessage => "sent message",
    };
    if summary.scanned == 0 {
        println!("{prefix}No @{kind} tags found.");
    }
    for action in &summary.executed {
        println!("{prefix}{verb}: \"{}\" -> {}", action.message, action.external_ref);
    }
    for id in &summary.skipped {
        println!("{prefix}skipped {id} (already executed)");
    }
    for warning in &summary.warnings {
        println!("{prefix}warning: {warning}");
    }
    for failure in &summary.failures {
        println!("{prefix}failed (line {}): {}", failure.line, failure.message);
    }
}

/// Infer a record's kind from which category directory holds it.
fn infer_kind(layout: &StoreLayout, file: &std::path::Path) -> Option<RecordKind> {
    let abs = file.canonicalize().ok()?;
    for kind in [RecordKind::Lead, RecordKind::Project] {
        if let Ok(dir) = layout.category_dir(kind).canonicalize() {
            if abs.starts_with(&dir) {
                return Some(kind);
            }
        }
    }
    None
}
