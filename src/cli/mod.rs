//! Command-line interface for chatlog-viewer.
//!
//! Provides scriptable access to an export root with these commands:
//! - `list`: List chats by recency
//! - `show`: Print the materialized window of a chat
//! - `search`: Search one chat
//! - `media`: Page through a chat's attachments
//! - `tui`: Launch the interactive viewer
//! - `config`: Inspect or create the configuration file

mod commands;

pub use commands::*;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use crate::error::Result;
use crate::model::MediaTab;

/// Windowed viewer for exported chat transcripts.
#[derive(Debug, Parser)]
#[command(name = "chatlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Export root containing one folder per chat (default: current directory).
    #[arg(short = 'd', long, global = true, env = "CHATLOG_ROOT")]
    pub root: Option<PathBuf>,

    /// JSON directory listing to use instead of scanning the root.
    #[arg(long, global = true, env = "CHATLOG_LISTING")]
    pub listing: Option<PathBuf>,

    /// Output format for structured data.
    #[arg(short = 'o', long, global = true, default_value = "text", env = "CHATLOG_OUTPUT")]
    pub output: OutputFormat,

    /// Output as JSON (shorthand for -o json).
    #[arg(long, global = true, env = "CHATLOG_JSON")]
    pub json: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "CHATLOG_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "CHATLOG_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Number of threads for parsing chats (default: number of CPUs).
    #[arg(short = 'j', long, global = true, env = "CHATLOG_THREADS")]
    pub threads: Option<usize>,

    /// Path to custom configuration file.
    #[arg(long, global = true, env = "CHATLOG_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub const fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Cli {
    /// Get effective output format.
    #[must_use]
    pub const fn effective_output(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List chats, most recent first.
    #[command(alias = "ls")]
    List(ListArgs),

    /// Print the messages materialized for a chat.
    #[command(alias = "cat")]
    Show(ShowArgs),

    /// Search one chat.
    #[command(alias = "s", alias = "find")]
    Search(SearchArgs),

    /// Page through a chat's attachments.
    Media(MediaArgs),

    /// Launch interactive TUI.
    #[command(alias = "ui")]
    Tui(TuiArgs),

    /// View and create configuration.
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the completions command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// PowerShell.
    Powershell,
    /// Elvish shell.
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Self::Bash,
            CompletionShell::Zsh => Self::Zsh,
            CompletionShell::Fish => Self::Fish,
            CompletionShell::Powershell => Self::PowerShell,
            CompletionShell::Elvish => Self::Elvish,
        }
    }
}

/// Generate shell completions and print to stdout.
pub fn generate_completions(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let shell: Shell = shell.into();
    generate(shell, &mut cmd, "chatlog", &mut io::stdout());
}

/// Output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// Tab-separated values.
    Tsv,
    /// Compact single-line output.
    Compact,
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Only chats whose name contains this text (case-insensitive).
    #[arg(short = 'f', long)]
    pub filter: Option<String>,

    /// Maximum number of chats to show.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Chat identifier (folder name).
    pub chat: String,

    /// Recenter the window on this message index.
    #[arg(short = 'a', long, conflicts_with = "page_up")]
    pub around: Option<usize>,

    /// Load this many older chunks, as if scrolling to the top repeatedly.
    #[arg(short = 'u', long, default_value = "0")]
    pub page_up: usize,
}

/// Arguments for the search command.
#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Chat identifier (folder name).
    pub chat: String,

    /// Text to find in senders and message bodies (case-insensitive).
    pub query: String,

    /// Jump to the Nth hit (1-based) and print the window around it.
    #[arg(long)]
    pub select: Option<usize>,
}

/// Media drawer tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MediaTabArg {
    /// Images.
    #[default]
    Images,
    /// Videos.
    Videos,
    /// Documents.
    Docs,
}

impl From<MediaTabArg> for MediaTab {
    fn from(arg: MediaTabArg) -> Self {
        match arg {
            MediaTabArg::Images => Self::Images,
            MediaTabArg::Videos => Self::Videos,
            MediaTabArg::Docs => Self::Docs,
        }
    }
}

/// Arguments for the media command.
#[derive(Debug, Parser)]
pub struct MediaArgs {
    /// Chat identifier (folder name).
    pub chat: String,

    /// Tab to page through.
    #[arg(short = 't', long, value_enum, default_value = "images")]
    pub tab: MediaTabArg,

    /// Number of pages to load.
    #[arg(short = 'p', long, default_value = "1")]
    pub pages: usize,
}

/// Arguments for the TUI command.
#[derive(Debug, Parser)]
pub struct TuiArgs {
    /// Open this chat on start.
    #[arg(short = 'c', long)]
    pub chat: Option<String>,

    /// Theme to use (dark, light, high-contrast).
    #[arg(long, env = "CHATLOG_TUI_THEME")]
    pub theme: Option<String>,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Config action to perform.
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommand actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Show configuration file path.
    Path,

    /// Initialize configuration file with defaults.
    Init,
}

/// Initialize tracing/logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Initialize rayon thread pool with custom thread count if specified.
fn init_thread_pool(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        if num_threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .ok(); // Ignore error if already initialized
        }
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Thread pool first, before any parallel parsing
    init_thread_pool(cli.threads);
    init_logging(&cli);

    match &cli.command {
        Commands::List(args) => commands::list::run(&cli, args),
        Commands::Show(args) => commands::show::run(&cli, args),
        Commands::Search(args) => commands::search::run(&cli, args),
        Commands::Media(args) => commands::media::run(&cli, args),
        Commands::Tui(args) => commands::tui::run(&cli, args),
        Commands::Config(args) => commands::config::run(&cli, args),
        Commands::Completions(args) => {
            generate_completions(args.shell);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_media_tab_conversion() {
        assert_eq!(MediaTab::from(MediaTabArg::Images), MediaTab::Images);
        assert_eq!(MediaTab::from(MediaTabArg::Docs), MediaTab::Docs);
    }

    #[test]
    fn test_json_flag_overrides_output() {
        let cli = Cli::parse_from(["chatlog", "-o", "tsv", "--json", "list"]);
        assert_eq!(cli.effective_output(), OutputFormat::Json);

        let cli = Cli::parse_from(["chatlog", "-o", "tsv", "list"]);
        assert_eq!(cli.effective_output(), OutputFormat::Tsv);
    }

    #[test]
    fn test_show_args() {
        let cli = Cli::parse_from(["chatlog", "-d", "/exports", "show", "Alice", "--around", "12"]);
        match cli.command {
            Commands::Show(args) => {
                assert_eq!(args.chat, "Alice");
                assert_eq!(args.around, Some(12));
                assert_eq!(args.page_up, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.root, Some(PathBuf::from("/exports")));
    }

    #[test]
    fn test_log_level_to_filter() {
        assert_eq!(LogLevel::Error.to_filter_string(), "error");
        assert_eq!(LogLevel::Warn.to_filter_string(), "warn");
        assert_eq!(LogLevel::Info.to_filter_string(), "info");
        assert_eq!(LogLevel::Debug.to_filter_string(), "debug");
        assert_eq!(LogLevel::Trace.to_filter_string(), "trace");
    }
}
