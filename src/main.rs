use anyhow::{bail, Context, Result};
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use roster_reconcile::{
    aggregate_files, logging, read_export, report, ReconcileConfig, Resolver, Roster,
};

#[derive(Parser)]
#[command(name = "roster-reconcile")]
#[command(about = "Match quiz-export student entries against a class roster")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one quiz export into a participation list
    #[command(after_help = "\
Examples:
  roster-reconcile resolve roster.csv quiz_week3.xlsx
  roster-reconcile resolve roster.csv quiz_week3.xlsx --out-dir reports/")]
    Resolve {
        /// Roster file with ID and Nome columns (.csv or .xlsx)
        roster: PathBuf,

        /// Quiz export (.xlsx or .csv)
        export: PathBuf,

        /// Directory for <export-name>.csv / .html
        #[arg(long, short = 'o', default_value = ".")]
        out_dir: PathBuf,

        /// Leading export rows to skip (overrides config)
        #[arg(long)]
        skip_rows: Option<usize>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Merge earlier participation lists into one deduplicated list
    #[command(after_help = "\
Examples:
  roster-reconcile merge roster.csv all_weeks.csv week1.csv week2.csv week3.csv")]
    Merge {
        /// Roster file with ID and Nome columns (.csv or .xlsx)
        roster: PathBuf,

        /// Merged CSV to write (HTML goes next to it)
        output: PathBuf,

        /// Participation lists produced by `resolve`
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// JSON config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Also try the first name token alone before giving up on a name
    #[arg(long)]
    first_token_fallback: bool,

    /// Skip the HTML report
    #[arg(long)]
    no_html: bool,
}

impl CommonArgs {
    fn load_config(&self) -> Result<ReconcileConfig> {
        let mut config = match &self.config {
            Some(path) => ReconcileConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ReconcileConfig::default(),
        };

        if self.first_token_fallback {
            config.first_token_fallback = true;
        }
        if self.no_html {
            config.write_html = false;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = parse_args();
    logging::init();

    match cli.command {
        Commands::Resolve {
            roster,
            export,
            out_dir,
            skip_rows,
            common,
        } => {
            let mut config = common.load_config()?;
            if let Some(rows) = skip_rows {
                config.skip_rows = rows;
            }
            config.validate()?;
            run_resolve(&roster, &export, &out_dir, &config)
        }
        Commands::Merge {
            roster,
            output,
            sources,
            common,
        } => {
            let config = common.load_config()?;
            config.validate()?;
            run_merge(&roster, &output, &sources, &config)
        }
    }
}

/// Usage errors exit with 1; --help / --version exit with 0
fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}

fn run_resolve(
    roster_path: &Path,
    export_path: &Path,
    out_dir: &Path,
    config: &ReconcileConfig,
) -> Result<()> {
    let roster = Roster::load(roster_path, config)
        .with_context(|| format!("Failed to load roster {}", roster_path.display()))?;
    let inputs = read_export(export_path, config)
        .with_context(|| format!("Failed to read export {}", export_path.display()))?;

    let report = Resolver::from_config(&roster, config).resolve_all(&inputs);

    let stem = export_path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Export path has no file name")?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let csv_path = out_dir.join(format!("{}.csv", stem));
    if same_file(&csv_path, export_path) {
        bail!(
            "Refusing to overwrite the export itself: {} (use --out-dir)",
            csv_path.display()
        );
    }

    report::write_resolution_csv(&csv_path, &report, &config.unknown_name)?;
    if config.write_html {
        let html_path = out_dir.join(format!("{}.html", stem));
        report::write_resolution_html(&html_path, &report, &config.unknown_name)?;
    }

    print!("{}", report::resolution_summary(&report));
    Ok(())
}

fn run_merge(
    roster_path: &Path,
    output: &Path,
    sources: &[PathBuf],
    config: &ReconcileConfig,
) -> Result<()> {
    let roster = Roster::load(roster_path, config)
        .with_context(|| format!("Failed to load roster {}", roster_path.display()))?;

    if sources.iter().any(|s| same_file(s, output)) {
        bail!("Output {} is also listed as a source", output.display());
    }

    let merged = aggregate_files(&roster, sources, config);

    report::write_merge_csv(output, &merged, &config.unknown_name)?;
    if config.write_html {
        let html_path = output.with_extension("html");
        report::write_merge_html(&html_path, &merged, &config.unknown_name)?;
    }

    println!("Merged {} files into {}", merged.sources_read, output.display());
    for skipped in &merged.skipped {
        println!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    println!("Total unique student IDs: {}", merged.students.len());
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
