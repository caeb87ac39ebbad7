use std::{env, io};

use reschat::storage::config::Config;

use crate::terminal::session::build_projector;

#[derive(Debug, Clone, PartialEq)]
pub enum CliMode {
    Chat,
    Agenda,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub mode: CliMode,
    pub backend: Option<String>,
}

pub const USAGE: &str = "Usage: reschat [--backend URL] [--agenda]";

pub fn parse_cli_options() -> Result<CliOptions, String> {
    parse_args(env::args().skip(1))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        mode: CliMode::Chat,
        backend: None,
    };
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--agenda" => {
                options.mode = CliMode::Agenda;
            }
            "--backend" => {
                let url = args
                    .next()
                    .filter(|value| !value.starts_with("--"))
                    .ok_or_else(|| "--backend requires a URL".to_string())?;
                options.backend = Some(url);
            }
            "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    Ok(options)
}

/// Prints the current reservations once and exits.
pub async fn run_agenda_mode(config: &Config) -> Result<(), io::Error> {
    let projector = build_projector(config);

    match projector.refresh(false).await {
        Ok(report) if report.skipped > 0 => {
            eprintln!("{} reservation(s) could not be displayed", report.skipped);
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("Failed to fetch reservations: {}", e);
            return Ok(());
        }
    }

    let mut widget = projector.widget();
    if let Some(agenda) = widget.take_output() {
        println!("{}", agenda);
    }
    tracing::info!("Printed agenda with {} reservations", widget.len());

    Ok(())
}
