/*!
 * seqsplit CLI - Command Line Interface
 */

use clap::{Parser, ValueEnum};
use seqsplit::{
    config::{LogLevel, SplitConfig},
    error::{Result, SplitError, EXIT_SUCCESS},
    logging, Splitter,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "seqsplit")]
#[command(version, about = "Split a sequence-database XML dump into well-formed chunk files", long_about = None)]
struct Cli {
    /// Source XML file (e.g. uniref50.xml)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: PathBuf,

    /// Number of files to split into (default: 100)
    #[arg(short = 'n', long = "num_block", alias = "num-block", value_name = "N")]
    num_block: Option<usize>,

    /// Element names to drop from every entry (default: sequence)
    /// Pass -e with no names to keep everything.
    /// Example: -e sequence "UniParc ID" length
    #[arg(short = 'e', long = "exclude", num_args = 0.., value_name = "NAME")]
    exclude: Option<Vec<String>>,

    /// Load more exclusions from a file (one per line, '#' comments)
    #[arg(long = "exclude-from", value_name = "FILE")]
    exclude_from: Option<PathBuf>,

    /// Output directory, created if missing (default: current directory)
    #[arg(short = 'o', long = "outdir", value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Substring marking the first line of an entry (default: "<entry")
    #[arg(long = "entry-marker", value_name = "TEXT")]
    entry_marker: Option<String>,

    /// Number of parallel workers (0 = one per CPU)
    #[arg(short = 'w', long = "workers", value_name = "N")]
    workers: Option<usize>,

    /// Print the chunk plan without writing any files
    #[arg(long)]
    dry_run: bool,

    /// Show a progress bar
    #[arg(long = "progress")]
    progress: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, value_enum)]
    log_level: Option<LogLevelArg>,

    /// Path to log file (default: stderr)
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Enable verbose logging (equivalent to --log-level=debug)
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Path to a TOML config file; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    if !config.dry_run {
        std::fs::create_dir_all(&config.outdir).map_err(|e| {
            SplitError::Config(format!(
                "Failed to create output directory {}: {}",
                config.outdir.display(),
                e
            ))
        })?;
    }

    let summary = Splitter::new(&cli.input, config)?.run()?;

    if cli.json {
        println!("{}", summary.to_json()?);
    } else {
        summary.print();
    }
    Ok(())
}

/// Defaults, then the config file, then command-line flags
fn build_config(cli: &Cli) -> Result<SplitConfig> {
    let mut config = match cli.config {
        Some(ref path) => SplitConfig::from_file(path)?,
        None => SplitConfig::default(),
    };

    if let Some(n) = cli.num_block {
        config.num_chunks = n;
    }
    if let Some(ref exclude) = cli.exclude {
        config.exclude = exclude.clone();
    }
    if let Some(ref path) = cli.exclude_from {
        config.exclude_from = Some(path.clone());
    }
    if let Some(ref outdir) = cli.outdir {
        config.outdir = outdir.clone();
    }
    if let Some(ref marker) = cli.entry_marker {
        config.entry_marker = marker.clone();
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if cli.log.is_some() {
        config.log_file = cli.log.clone();
    }
    config.dry_run |= cli.dry_run;
    config.show_progress |= cli.progress;
    config.verbose |= cli.verbose;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["seqsplit", "-i", "uniref50.xml"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(cli.input, PathBuf::from("uniref50.xml"));
        assert_eq!(config.num_chunks, 100);
        assert_eq!(config.exclude, vec!["sequence".to_string()]);
        assert_eq!(config.outdir, PathBuf::from("./"));
    }

    #[test]
    fn test_short_flags() {
        let cli = parse(&[
            "seqsplit",
            "--input",
            "db.xml",
            "--num_block",
            "8",
            "--exclude",
            "sequence",
            "UniParc ID",
            "--outdir",
            "out",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.num_chunks, 8);
        assert_eq!(config.exclude, vec!["sequence".to_string(), "UniParc ID".to_string()]);
        assert_eq!(config.outdir, PathBuf::from("out"));
    }

    #[test]
    fn test_bare_exclude_keeps_everything() {
        let cli = parse(&["seqsplit", "-i", "db.xml", "-e"]);
        let config = build_config(&cli).unwrap();
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_from(["seqsplit", "-n", "4"]).is_err());
    }

    #[test]
    fn test_zero_blocks_rejected() {
        let cli = parse(&["seqsplit", "-i", "db.xml", "-n", "0"]);
        assert!(matches!(build_config(&cli), Err(SplitError::Config(_))));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seqsplit.toml");
        std::fs::write(&path, "num_chunks = 12\nworkers = 3\nexclude = [\"length\"]\n").unwrap();

        let cli = parse(&[
            "seqsplit",
            "-i",
            "db.xml",
            "--config",
            path.to_str().unwrap(),
            "-n",
            "5",
            "--log-level",
            "warn",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.num_chunks, 5);
        assert_eq!(config.workers, 3);
        assert_eq!(config.exclude, vec!["length".to_string()]);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
