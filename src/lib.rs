pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod session;

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::session::ReportSession;

/// Summarize pasted microbiology culture reports, one line per culture
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Report text file (reads stdin when omitted)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Config file (defaults to ~/.culturas/config.json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show only these antibiotics (comma-separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "exclude")]
    only: Vec<String>,

    /// Hide these antibiotics (comma-separated)
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Print structured culture records as JSON
    #[arg(long, conflicts_with = "list")]
    json: bool,

    /// List the antibiotics named in the report and whether they are shown
    #[arg(long)]
    list: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

pub fn run() {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let log_filter = if args.verbose {
        "culturas=debug,culturas_lib=debug"
    } else {
        config.log_filter()
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter)),
        )
        .init();

    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);

    match execute(&args, &config) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to process report");
            std::process::exit(1);
        }
    }
}

fn load_config(explicit: Option<&std::path::Path>) -> Result<AppConfig, AppError> {
    match explicit {
        Some(path) => AppConfig::load(path),
        None => match config::default_config_path() {
            Ok(path) => AppConfig::load(&path),
            Err(_) => Ok(AppConfig::default()),
        },
    }
}

fn read_input(path: Option<&std::path::Path>) -> Result<String, AppError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(AppError::Stdin)?;
            Ok(text)
        }
    }
}

fn execute(args: &Args, config: &AppConfig) -> Result<String, AppError> {
    let raw = read_input(args.input.as_deref())?;

    let mut session = ReportSession::from_config(config);
    if !args.only.is_empty() {
        commands::deselect_all(&mut session);
        for name in &args.only {
            session.set_active(name, true);
        }
    }
    for name in &args.exclude {
        session.set_active(name, false);
    }

    let shown = commands::process_report(&mut session, &raw);

    if args.json {
        return commands::report_json(&session);
    }
    if args.list {
        let selection = session.selection();
        let lines: Vec<String> = commands::report_antibiotics(&session)
            .into_iter()
            .map(|name| {
                let mark = if selection.keeps(&name) { "x" } else { " " };
                format!("[{mark}] {name}")
            })
            .collect();
        return Ok(lines.join("\n"));
    }
    Ok(shown)
}
