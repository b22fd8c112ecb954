//! docdelta CLI - structural document comparison tool

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;

use docdelta::render::{self, HtmlOptions, JsonFormat, Theme};
use docdelta::{DocDelta, Error, Report};

#[derive(Parser)]
#[command(name = "docdelta")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Compare two documents into an interactive HTML and JSON change report", long_about = None)]
struct Cli {
    /// Old version of the document
    #[arg(value_name = "OLD")]
    old: PathBuf,

    /// New version of the document
    #[arg(value_name = "NEW")]
    new: PathBuf,

    /// HTML report path
    #[arg(short, long, value_name = "FILE", default_value = "report.html")]
    output: PathBuf,

    /// Also write the report as JSON
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    /// Open the HTML report in dark mode
    #[arg(long)]
    dark: bool,

    /// Rank on structural scores only, without semantic annotation
    #[arg(long)]
    no_annotate: bool,

    /// Maximum entries in the table of contents
    #[arg(long, value_name = "N", default_value_t = render::DEFAULT_TOC_LIMIT)]
    toc_limit: usize,

    /// Report title
    #[arg(long, env = "DOCDELTA_TITLE")]
    title: Option<String>,

    /// Start with unchanged blocks hidden
    #[arg(long)]
    hide_unchanged: bool,

    /// Record the generation time in the report
    #[arg(long)]
    timestamp: bool,
}

/// A fatal condition, one per exit code.
#[derive(Debug)]
enum Failure {
    OldMissing(PathBuf),
    NewMissing(PathBuf),
    Extract(Error),
    WriteHtml(Error),
    WriteJson(Error),
    Other(Error),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Failure::Other(_) => 1,
            Failure::OldMissing(_) => 2,
            Failure::NewMissing(_) => 3,
            Failure::Extract(_) => 4,
            Failure::WriteHtml(_) => 5,
            Failure::WriteJson(_) => 6,
        }
    }

    fn message(&self) -> String {
        match self {
            Failure::OldMissing(path) => format!("Old document not found: {}", path.display()),
            Failure::NewMissing(path) => format!("New document not found: {}", path.display()),
            Failure::Extract(e)
            | Failure::WriteHtml(e)
            | Failure::WriteJson(e)
            | Failure::Other(e) => e.to_string(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose))
        .parse_default_env()
        .init();

    if let Err(failure) = run(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), failure.message());
        process::exit(failure.exit_code());
    }
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn run(cli: &Cli) -> Result<(), Failure> {
    if !cli.old.exists() {
        return Err(Failure::OldMissing(cli.old.clone()));
    }
    if !cli.new.exists() {
        return Err(Failure::NewMissing(cli.new.clone()));
    }

    let steps = if cli.json.is_some() { 3 } else { 2 };
    let pb = ProgressBar::new(steps);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    pb.set_message("Comparing documents...");
    let report = compare(cli).map_err(|e| classify(e, cli))?;
    pb.inc(1);

    pb.set_message("Writing HTML report...");
    render::write_html(&report, &html_options(cli), &cli.output).map_err(Failure::WriteHtml)?;
    pb.inc(1);

    if let Some(json_path) = &cli.json {
        pb.set_message("Writing JSON report...");
        let format = if cli.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        render::write_json(&report, format, json_path).map_err(Failure::WriteJson)?;
        pb.inc(1);
    }

    pb.finish_with_message("Done!");
    print_summary(&report, &cli.output, cli.json.as_deref());
    Ok(())
}

fn compare(cli: &Cli) -> docdelta::Result<Report> {
    let mut builder = DocDelta::new().with_timestamp(cli.timestamp);
    if cli.no_annotate {
        builder = builder.without_annotator();
    }
    builder.compare_files(&cli.old, &cli.new)
}

fn classify(error: Error, cli: &Cli) -> Failure {
    match error {
        Error::NotFound(path) if path == cli.old => Failure::OldMissing(path),
        Error::NotFound(path) if path == cli.new => Failure::NewMissing(path),
        e if e.is_input_error() => Failure::Extract(e),
        e => Failure::Other(e),
    }
}

fn html_options(cli: &Cli) -> HtmlOptions {
    let mut options = HtmlOptions::new()
        .with_toc_limit(cli.toc_limit)
        .with_unchanged(!cli.hide_unchanged);
    if cli.dark {
        options = options.with_theme(Theme::Dark);
    }
    if let Some(title) = &cli.title {
        options = options.with_title(title.clone());
    }
    options
}

fn print_summary(report: &Report, html: &Path, json: Option<&Path>) {
    let totals = &report.stats.totals;
    println!();
    println!("{}", report.summary.text);
    println!(
        "  {} added  {} deleted  {} changed  {} unchanged",
        totals.added.to_string().green(),
        totals.deleted.to_string().red(),
        totals.changed.to_string().yellow(),
        totals.unchanged.to_string().dimmed()
    );

    println!("\n{}", "Output files:".green().bold());
    match json {
        Some(json) => {
            println!("  {} {}", "├─".dimmed(), html.display());
            println!("  {} {}", "└─".dimmed(), json.display());
        }
        None => println!("  {} {}", "└─".dimmed(), html.display()),
    }
}
