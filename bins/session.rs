use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "session")]
#[command(about = "Record, clear and show the signed-in console user")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session store file, overrides the configured path
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark a user as signed in
    SignIn {
        /// User identifier, stored verbatim
        user: String,
    },
    /// Clear the signed-in user
    SignOut,
    /// Print the signed-in user
    Whoami,
}

fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Json => common::utils::logging::init_logging_json(),
        LogFormat::Compact => common::utils::logging::init_logging_default(),
    }
}

/// What a command left behind; `SignedOut` only comes from `whoami`.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Done,
    SignedOut,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::SignedOut => ExitCode::FAILURE,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    AppConfig::load_and_validate(cli.config.as_deref(), cli.store.clone())
}

fn run(command: Commands, cfg: &AppConfig, out: &mut dyn Write) -> anyhow::Result<Outcome> {
    let marker = service::runtime::open_marker(&cfg.storage.path)?;

    match command {
        Commands::SignIn { user } => {
            marker.sign_in(&user)?;
            info!(event = "sign_in", store = %cfg.storage.path.display(), "user signed in");
        }
        Commands::SignOut => {
            marker.sign_out()?;
            info!(event = "sign_out", store = %cfg.storage.path.display(), "user signed out");
        }
        Commands::Whoami => match marker.authenticated_user()? {
            Some(user) => writeln!(out, "{user}")?,
            None => {
                writeln!(out, "(signed out)")?;
                return Ok(Outcome::SignedOut);
            }
        },
    }
    Ok(Outcome::Done)
}

fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    let cfg = load_config(&cli);
    let format = match (&cfg, cli.json_logs) {
        (_, true) => LogFormat::Json,
        (Ok(cfg), false) => cfg.logging.format,
        (Err(_), false) => LogFormat::default(),
    };
    init_logging(format);

    let result = cfg.and_then(|cfg| run(cli.command, &cfg, &mut io::stdout().lock()));
    match result {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            error!(event = "command_failed", error = %e, "session command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
