//! QPLAN Command Line Interface
//!
//! Normalizes EXPLAIN dumps on disk into canonical plan trees.
//!
//! ```text
//! qplan parse tpch-mysql.log --dialect mysql --pretty
//! qplan parse before.log after.log --dialect mariadb --compare -o plans.json
//! qplan summary tpch-pg.log --dialect postgresql
//! ```

mod logging;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use qplan_explain::{Dialect, ExplainOutput, Plan, parse_plans};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::logging::LoggingConfig;
use crate::settings::QplanSettings;

/// Path argument standing for stdin
const STDIN_PATH: &str = "-";

/// EXPLAIN plan normalizer for PostgreSQL, MySQL and MariaDB
#[derive(Parser, Debug)]
#[command(name = "qplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (defaults to <config dir>/qplan/settings.json)
    #[arg(long, env = "QPLAN_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse dumps and print the canonical trees as JSON
    Parse {
        /// Dump files to read, `-` for stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Dialect of the dumps (postgresql, mysql, mariadb)
        #[arg(short, long)]
        dialect: Option<Dialect>,

        /// Tag every plan with its query number and file index
        #[arg(long)]
        compare: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Write the JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a table describing every plan in the dumps
    Summary {
        /// Dump files to read, `-` for stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Dialect of the dumps (postgresql, mysql, mariadb)
        #[arg(short, long)]
        dialect: Option<Dialect>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => QplanSettings::load_from(path)?,
        None => QplanSettings::load()?,
    };

    let logging_config = if cli.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::from_settings(&settings.logging)
    };
    let _log_guard = logging::init(logging_config)?;

    match cli.command {
        Commands::Parse {
            files,
            dialect,
            compare,
            pretty,
            output,
        } => {
            let dialect = resolve_dialect(dialect, &settings)?;
            let plans = load_plans(&files, dialect)?;
            let json = render_json(&into_output(plans, compare), pretty || settings.pretty)?;

            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Commands::Summary { files, dialect } => {
            let dialect = resolve_dialect(dialect, &settings)?;
            let plans = load_plans(&files, dialect)?;
            println!("{}", summary_table(&files, &plans));
        }
    }

    Ok(())
}

/// `--dialect` wins over the configured default
fn resolve_dialect(flag: Option<Dialect>, settings: &QplanSettings) -> Result<Dialect> {
    flag.or(settings.default_dialect)
        .context("No dialect given: pass --dialect or set default_dialect in the settings file")
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == STDIN_PATH {
        let mut dump = String::new();
        std::io::stdin()
            .read_to_string(&mut dump)
            .context("Failed to read dump from stdin")?;
        return Ok(dump);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parses every file in order, tagging each plan with its file's position
fn load_plans(files: &[PathBuf], dialect: Dialect) -> Result<Vec<Plan>> {
    let mut plans = Vec::new();

    for (file_index, path) in files.iter().enumerate() {
        let dump = read_input(path)?;
        let parsed = parse_plans(&dump, dialect)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!(file = %path.display(), plans = parsed.len(), %dialect, "parsed dump");
        plans.extend(
            parsed
                .into_iter()
                .map(|plan| plan.with_file_index(Some(file_index))),
        );
    }

    Ok(plans)
}

fn into_output(plans: Vec<Plan>, compare: bool) -> ExplainOutput {
    if compare {
        ExplainOutput::Comparison(plans)
    } else {
        ExplainOutput::Trees(plans.into_iter().map(|plan| plan.root).collect())
    }
}

fn render_json(output: &ExplainOutput, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    Ok(json)
}

fn summary_table(files: &[PathBuf], plans: &[Plan]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["File", "Query", "Root", "Nodes", "Depth", "Leaves"]);

    for plan in plans {
        let file = plan
            .file_index
            .and_then(|index| files.get(index))
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        let leaves = plan
            .leaf_labels()
            .iter()
            .map(|label| label.replace('\n', " "))
            .collect::<Vec<_>>()
            .join(", ");

        table.add_row(vec![
            file,
            plan.query_number.to_string(),
            plan.root.node_type.replace('\n', " "),
            plan.root.node_count().to_string(),
            plan.root.depth().to_string(),
            leaves,
        ]);
    }

    table
}
