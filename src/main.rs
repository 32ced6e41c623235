use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ai_review::cli::RunOptions;
use ai_review::cli::commands;
use ai_review::constants::exit_codes;

#[derive(Parser)]
#[command(name = "ai-review")]
#[command(
    version,
    about = "Review content with several AI CLI agents in parallel, then merge their findings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long,
        short,
        global = true,
        env = "AI_REVIEW_CONFIG",
        help = "Extra config file merged over global and project config"
    )]
    config: Option<PathBuf>,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run parallel reviews and optimize the content
    Run {
        #[arg(long, help = "Topic name used in the prompts")]
        topic: String,
        #[arg(long, help = "Path of the content to review")]
        content_path: PathBuf,
        #[arg(long, help = "Directory receiving the review files")]
        output_path: PathBuf,
        #[arg(long, help = "Only produce reviews, skip the optimization step")]
        skip_optimize: bool,
        #[arg(long, help = "Per-review timeout in seconds (default 600)")]
        timeout: Option<u64>,
        #[arg(
            long = "agent",
            value_name = "NAME",
            help = "Review with this agent only (repeatable)"
        )]
        agents: Vec<String>,
        #[arg(
            long = "dry-run",
            help = "Print prompts and commands without invoking any agent"
        )]
        dry_run: bool,
    },

    /// Check that every configured agent CLI is installed
    Check,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mai-review encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::from(exit_codes::FAILURE)
        }
    }
}

fn run_cli() -> anyhow::Result<u8> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let code = match cli.command {
        Commands::Run {
            topic,
            content_path,
            output_path,
            skip_optimize,
            timeout,
            agents,
            dry_run,
        } => commands::run::run(RunOptions {
            topic,
            content_path,
            output_path,
            skip_optimize,
            timeout,
            agents,
            dry_run,
            config: cli.config,
        })?,
        Commands::Check => commands::check::run(cli.config)?,
        Commands::Config { action } => {
            match action {
                ConfigAction::Show { format } => commands::config::show(cli.config, &format)?,
                ConfigAction::Path => commands::config::path(cli.config)?,
                ConfigAction::Init { global, force } => commands::config::init(global, force)?,
            }
            exit_codes::SUCCESS
        }
    };

    Ok(code)
}
