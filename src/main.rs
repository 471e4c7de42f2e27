// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info, warn};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use code_translator::app_config::{Config, ConfigOverrides, LogLevel};
use code_translator::app_controller::Controller;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for code-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Code Translator - translate foreign-script comments in source code
///
/// Finds comments and docstrings written in CJK (or other configured)
/// scripts and rewrites them in place using a local Ollama model.
#[derive(Parser, Debug)]
#[command(name = "code-translator")]
#[command(version)]
#[command(about = "Translate foreign-language comments in source code with a local LLM")]
#[command(long_about = "code-translator finds comments, docstrings and (optionally) string literals written in
CJK or other configured scripts and translates them in place with an Ollama model.

EXAMPLES:
    code-translator                              # Translate the current directory
    code-translator -n src/                      # Dry run, report what would change
    code-translator -s ja -t en -m llama3 lib/   # Japanese to English with another model
    code-translator --translate-all -y app.py    # Also translate string literals
    code-translator --list-models                # Show models on the Ollama server
    code-translator completions bash > ct.bash   # Generate bash completions

CONFIGURATION:
    Settings are read from --config, else from .code-translator.json in the target
    directory or any parent, else from the user config directory. Command-line
    flags override file settings.

EXIT STATUS:
    0 on success, 1 when errors were recorded, 130 when interrupted.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// File or directory to process
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,

    /// Ollama model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'zh', 'ja', 'ko')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Also translate string literals
    #[arg(long)]
    translate_all: bool,

    /// Report what would change without writing files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Number of files processed concurrently
    #[arg(short = 'w', long = "workers")]
    workers: Option<usize>,

    /// Only process the top-level directory
    #[arg(long)]
    no_recursive: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List models available on the Ollama server and exit
    #[arg(long)]
    list_models: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<LogLevel>,

    /// Do not ask for confirmation
    #[arg(short = 'y', long = "yes")]
    yes: bool,

    /// Print the final statistics as JSON
    #[arg(long)]
    json: bool,
}

impl CommandLineOptions {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
            translate_all: self.translate_all.then_some(true),
            dry_run: self.dry_run.then_some(true),
            max_workers: self.workers,
            recursive: self.no_recursive.then_some(false),
            log_level: self.log_level,
        }
    }
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration is known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "code-translator", &mut std::io::stdout());
        return Ok(());
    }

    let code = run(cli).await?;
    std::process::exit(code);
}

async fn run(cli: CommandLineOptions) -> Result<i32> {
    if let Some(level) = cli.log_level {
        log::set_max_level(level.to_level_filter());
    }

    let start_dir = if cli.path.is_dir() {
        cli.path.as_path()
    } else {
        cli.path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."))
    };
    let (mut config, source) = Config::discover(cli.config.as_deref(), start_dir)?;
    match &source {
        Some(path) => debug!("Loaded configuration from {}", path.display()),
        None => debug!("No configuration file found, using defaults"),
    }

    config.merge_overrides(&cli.overrides());
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if cli.list_models {
        let models = controller.list_models().await?;
        if models.is_empty() {
            warn!("No models installed on {}", controller.config().translation.endpoint);
        }
        for model in models {
            println!("{}", model.name);
        }
        return Ok(0);
    }

    let processing = &controller.config().processing;
    if processing.translate_all
        && !processing.dry_run
        && !cli.yes
        && !confirm("--translate-all also rewrites string literals, which can change program behaviour. Continue?")?
    {
        info!("Aborted");
        return Ok(0);
    }

    let snapshot = controller.run(&cli.path, !cli.json).await?;

    if cli.json {
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize statistics")?;
        println!("{}", json);
    } else {
        Controller::print_summary(&snapshot);
    }

    Ok(Controller::exit_code(&snapshot))
}

/// Ask a yes/no question on the terminal
fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N] ", question);
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
