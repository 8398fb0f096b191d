use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use robo_workspace::{usage, Config, Invocation, Maintainer, Tools};

const PROGRAM: &str = "robo-workspace";

#[derive(Parser, Debug)]
#[command(name = PROGRAM, version)]
struct Cli {
    /// Maintenance command to run.
    command: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ROBO_WS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Config::from_env();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // The usage summary includes the live configuration, so it replaces clap's help.
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            print!("{}", usage(PROGRAM, &config));
            return ExitCode::SUCCESS;
        }
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    match run(cli, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "✗ Error:".red().bold(), e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli, config: Config) -> anyhow::Result<ExitCode> {
    let task = match Invocation::parse(cli.command.as_deref()) {
        Ok(Invocation::Help) => {
            print!("{}", usage(PROGRAM, &config));
            return Ok(ExitCode::SUCCESS);
        }
        Ok(Invocation::Run(task)) => task,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Run '{PROGRAM} help' for the list of commands.");
            return Ok(ExitCode::from(1));
        }
    };

    let root = std::env::current_dir().context("Failed to resolve the current directory")?;
    println!(
        "{} {}",
        format!("[{}]", task.as_str()).cyan().bold(),
        root.display().to_string().dimmed()
    );

    let maintainer = Maintainer::new(&root, config, Tools::system()).echo(true);
    match maintainer.run(task) {
        Ok(report) => {
            if report.has_warnings() {
                println!(
                    "\n{} finished with {} warning(s)",
                    task.as_str(),
                    report.warnings().len()
                );
            } else {
                println!("\n{} {} done", "✓".green().bold(), task.as_str());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "✗ Error:".red().bold(), e);
            Ok(ExitCode::from(1))
        }
    }
}
