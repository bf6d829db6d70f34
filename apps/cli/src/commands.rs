//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::path::{Path, PathBuf};

use aozorakit_converter::Pipeline;
use aozorakit_core::assembler::{AssembleResult, ProgressReporter};
use aozorakit_shared::{AppConfig, ContentRole, init_config, load_config, load_config_from};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// AozoraKit: turn web-novel archives into Aozora Bunko text.
#[derive(Parser)]
#[command(
    name = "aozorakit",
    version,
    about = "Convert downloaded web-novel archives into Aozora Bunko formatted text.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.aozorakit/aozorakit.toml.
    #[arg(long, global = true, env = "AOZORAKIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert a novel archive directory into one Aozora text file.
    Convert {
        /// Directory holding toc.json and the 本文/ episode files.
        novel_dir: PathBuf,

        /// Output directory (defaults to the novel directory).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Convert a single fragment read from stdin and print the result.
    Fragment {
        /// Content role: story, subtitle, chapter, body, introduction or postscript.
        #[arg(short, long, default_value = "body")]
        role: String,

        /// Print the text after every pass instead of only the result.
        #[arg(long)]
        trace: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "aozorakit=info",
        1 => "aozorakit=debug",
        _ => "aozorakit=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `fragment` output stays clean on stdout.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Convert { novel_dir, out } => cmd_convert(&novel_dir, out.as_deref(), config_path),
        Command::Fragment { role, trace } => cmd_fragment(&role, trace, config_path),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_convert(novel_dir: &Path, out: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let output_dir = out.unwrap_or(novel_dir);

    info!(
        novel_dir = %novel_dir.display(),
        output_dir = %output_dir.display(),
        "converting archive"
    );

    let progress = CliProgress::new()?;
    let result = aozorakit_core::convert_archive(novel_dir, output_dir, &config, &progress)
        .wrap_err_with(|| format!("failed to convert {}", novel_dir.display()))?;

    println!(
        "Wrote {} ({} episodes, {} bytes)",
        result.path.display(),
        result.leaf_count,
        result.bytes
    );
    Ok(())
}

fn cmd_fragment(tag: &str, trace: bool, config_path: Option<&Path>) -> Result<()> {
    let role: ContentRole = tag.parse()?;
    let config = resolve_config(config_path)?;
    let pipeline = Pipeline::new(config.converter);

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .wrap_err("failed to read fragment from stdin")?;

    if trace {
        for (id, text) in pipeline.trace(&input, role) {
            println!("--- {:>2} {} ---", id.index() + 1, id.name());
            println!("{text}");
        }
        println!("--- result ---");
    }

    println!("{}", pipeline.convert(&input, role));
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {wide_msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { bar })
    }
}

impl ProgressReporter for CliProgress {
    fn leaf_started(&self, title: &str, current: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64);
        self.bar.set_message(title.to_string());
    }

    fn done(&self, _result: &AssembleResult) {
        self.bar.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn convert_parses_output_dir() {
        let cli = Cli::try_parse_from(["aozorakit", "convert", "novel", "-o", "out", "-vv"])
            .expect("parse");
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Convert { novel_dir, out } => {
                assert_eq!(novel_dir, PathBuf::from("novel"));
                assert_eq!(out, Some(PathBuf::from("out")));
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn fragment_defaults_to_body() {
        let cli = Cli::try_parse_from(["aozorakit", "fragment"]).expect("parse");
        match cli.command {
            Command::Fragment { role, trace } => {
                assert_eq!(role, "body");
                assert!(!trace);
            }
            _ => panic!("expected fragment"),
        }
    }
}
