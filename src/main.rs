//! CLI entry point for `mailsweep`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mailsweep::cleaner::{MailCleaner, SweepOptions, SweepReport};
use mailsweep::config::Config;
use mailsweep::mailbox::{JsonMailbox, Mailbox};
use mailsweep::model::Thread;

#[derive(Parser)]
#[command(name = "mailsweep", version)]
#[command(about = "Move stale notification threads in a mailbox to trash")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Mailbox file to sweep with the configured defaults
    #[arg(value_name = "MAILBOX")]
    mailbox: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Move stale threads matching the subject filter to trash
    Sweep {
        /// Mailbox file (JSON thread list)
        mailbox: PathBuf,
        /// Subject text a thread must contain (default from config)
        #[arg(short, long)]
        subject: Option<String>,
        /// Only threads older than this many days (default from config)
        #[arg(long, value_name = "DAYS")]
        older_than: Option<u32>,
        /// Show what would be trashed without modifying the mailbox
        #[arg(long)]
        dry_run: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a query against a mailbox and list matching threads
    Search {
        /// Mailbox file (JSON thread list)
        mailbox: PathBuf,
        /// Query, e.g. 'subject:"Task List" older_than:2d'
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = mailsweep::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Some(Commands::Sweep {
            mailbox,
            subject,
            older_than,
            dry_run,
            json,
        }) => cmd_sweep(
            &mailbox,
            &config,
            subject.as_deref(),
            older_than,
            dry_run,
            json,
        ),
        Some(Commands::Search {
            mailbox,
            query,
            json,
        }) => cmd_search(&mailbox, &query, json),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
        None => {
            let mailbox = cli
                .mailbox
                .or_else(|| config.mailbox.path.clone())
                .ok_or_else(|| {
                    anyhow::anyhow!("No mailbox file given and none configured. See --help.")
                })?;
            cmd_sweep(&mailbox, &config, None, None, false, false)
        }
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = mailsweep::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailsweep.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailsweep", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Sweep stale threads in a mailbox file to trash.
fn cmd_sweep(
    path: &Path,
    config: &Config,
    subject: Option<&str>,
    older_than: Option<u32>,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let opts = SweepOptions {
        subject_filter: subject
            .map(str::to_string)
            .unwrap_or_else(|| config.job.subject_filter.clone()),
        max_age_days: older_than.unwrap_or(config.job.max_age_days),
        dry_run,
    };

    let mailbox = JsonMailbox::open(path)?;
    let mut cleaner = MailCleaner::new(mailbox);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Trashing [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let report = cleaner.sweep(
        &opts,
        Some(&|current, total| {
            pb.set_length(total as u64);
            pb.set_position(current as u64);
        }),
    )?;

    pb.finish_and_clear();

    let mut mailbox = cleaner.into_inner();
    mailbox.flush()?;

    if json {
        print_report_json(&report)?;
    } else {
        print_report_table(&opts, &report);
    }

    // A run that trashed nothing it matched is a failed run
    if !report.dry_run && report.matched > 0 && report.trashed == 0 {
        anyhow::bail!("all {} trash operations failed", report.matched);
    }

    Ok(())
}

/// Run a query against a mailbox file and print matching threads.
fn cmd_search(path: &Path, query: &str, json: bool) -> anyhow::Result<()> {
    let mailbox = JsonMailbox::open(path)?;
    let results = mailbox.search(query)?;

    if json {
        print_search_results_json(&results)?;
    } else {
        print_search_results_table(&results);
    }

    Ok(())
}

/// Print the sweep report as a human-readable table.
fn print_report_table(opts: &SweepOptions, report: &SweepReport) {
    println!();
    println!(
        "  {:<20} subject contains \"{}\", older than {} day(s)",
        "Filter", opts.subject_filter, opts.max_age_days
    );
    println!("  {:<20} {}", "Matched", report.matched);
    println!("  {:<20} {}", "Trashed", report.trashed);
    if !report.failed.is_empty() {
        println!("  {:<20} {}", "Failed", report.failed.len());
        for id in &report.failed {
            println!("    {id}");
        }
    }
    if report.dry_run {
        println!();
        println!("  Dry run — the mailbox was not modified.");
    }
    println!();
}

/// Print the sweep report as JSON.
fn print_report_json(report: &SweepReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Print search results as a human-readable table.
fn print_search_results_table(results: &[Thread]) {
    println!();
    println!("  {} result(s)", results.len());
    println!();

    if results.is_empty() {
        return;
    }

    println!(
        "  {:<4} {:<17} {:<25} {:<40} {:>5}",
        "#", "Last activity", "From", "Subject", "Msgs"
    );
    println!("  {}", "-".repeat(95));

    for (i, thread) in results.iter().enumerate() {
        let date = thread.last_activity.format("%Y-%m-%d %H:%M").to_string();
        let from_trunc: String = thread.from.chars().take(24).collect();
        let subj_trunc: String = thread.subject.chars().take(39).collect();

        println!(
            "  {:<4} {:<17} {:<25} {:<40} {:>5}",
            i + 1,
            date,
            from_trunc,
            subj_trunc,
            thread.message_count
        );
    }
    println!();
}

/// Print search results as JSON.
fn print_search_results_json(results: &[Thread]) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "result_count": results.len(),
        "results": results,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
