use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use waksense_cli::{CliContext, commands, logging, readline};
use waksense_core::context::{AppConfig, AppConfigExt, default_log_file};
use waksense_core::types::ClassKind;

/// Process arguments.
#[derive(Parser)]
#[command(version, about = "Wakfu class resource tracker")]
struct Args {
    /// Config file to use instead of the per-user default
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Chat log to tail, overriding the configured one
    #[arg(short, long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path).map_err(|e| e.to_string())?,
        None => AppConfig::load(),
    };
    if let Some(log) = args.log {
        config.log_file = log;
    }
    if config.log_file.is_empty() {
        config.log_file = default_log_file();
    }

    let ctx = CliContext::new(config, args.config);
    ctx.start_all().await;

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

/// REPL commands.
#[derive(Parser)]
#[command(version, about = "cli")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Status,
    Stats {
        #[arg(short, long)]
        reset: bool,
    },
    Config,
    Lock {
        name: String,
    },
    Unlock {
        name: String,
    },
    Add {
        name: String,
        class: ClassKind,
    },
    Remove {
        name: String,
    },
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "waksense".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Status) => commands::show_status(ctx).await,
        Some(Commands::Stats { reset }) => commands::show_stats(ctx, *reset).await,
        Some(Commands::Config) => commands::show_config(ctx).await,
        Some(Commands::Lock { name }) => commands::set_locked(ctx, name, true).await,
        Some(Commands::Unlock { name }) => commands::set_locked(ctx, name, false).await,
        Some(Commands::Add { name, class }) => commands::add_character(ctx, name, *class).await,
        Some(Commands::Remove { name }) => commands::remove_character(ctx, name).await,
        Some(Commands::Exit) => {
            commands::exit(ctx).await;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
