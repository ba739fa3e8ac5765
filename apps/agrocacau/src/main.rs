use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use farm_dashboard::domain::ports::ConfirmPort;
use farm_dashboard::module::module_config;
use farm_dashboard::FarmDashboard;
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

mod shell;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Agrocacau - farm dashboard shell
#[derive(Parser)]
#[command(name = "agrocacau")]
#[command(about = "Agrocacau - farm management dashboard over a managed backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive shell
    Run,
    /// Check configuration
    Check,
}

/// Answers confirmation prompts with a y/N question on the terminal.
struct StdinConfirm;

impl ConfirmPort for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, &config.home_path());
    tracing::info!(home_dir = %config.home_dir, "Agrocacau starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_shell(config).await,
        Commands::Check => check_config(config),
    }
}

fn init_module(config: &AppConfig) -> Result<FarmDashboard> {
    let cfg = module_config(&config.modules)?;
    let module = FarmDashboard::default();
    module.init(&cfg, Arc::new(StdinConfirm))?;
    Ok(module)
}

async fn run_shell(config: AppConfig) -> Result<()> {
    let module = init_module(&config)?;
    let api = module.client()?;

    if let Some(session) = api.start().await? {
        println!(
            "resumed session for {}",
            session.user.email.as_deref().unwrap_or("(no email)")
        );
    }

    let mut sh = shell::Shell::new(api, std::io::stdout());
    println!("type 'help' for commands");
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        // Shares the stdin buffer with confirmation prompts.
        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 || !sh.handle_line(&line).await? {
            break;
        }
    }

    tracing::info!("Agrocacau shell closed");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    init_module(&config)?;
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
