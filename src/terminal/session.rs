use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use reschat::{
    calendar::CalendarProjector,
    chat::{ChatMessage, Sender},
    conversation::{ConversationController, SubmitError},
    storage::config::Config,
    sync::{HttpReservationClient, ReservationApi},
};

use crate::terminal::agenda::AgendaCalendar;

type TerminalController = ConversationController<dyn ReservationApi, AgendaCalendar>;
pub type AgendaProjector = CalendarProjector<dyn ReservationApi, AgendaCalendar>;

#[derive(Debug, PartialEq)]
enum Command {
    Say(String),
    Show(usize),
    Hover(usize),
    Refresh,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(':') else {
        return Command::Say(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("q" | "quit"), None) => Command::Quit,
        (Some("r" | "refresh"), None) => Command::Refresh,
        (Some("h" | "help"), None) => Command::Help,
        (Some("show"), Some(number)) => number
            .parse()
            .map(Command::Show)
            .unwrap_or_else(|_| Command::Unknown(trimmed.to_string())),
        (Some("hover"), Some(number)) => number
            .parse()
            .map(Command::Hover)
            .unwrap_or_else(|_| Command::Unknown(trimmed.to_string())),
        _ => Command::Unknown(trimmed.to_string()),
    }
}

fn connect(config: &Config) -> Arc<dyn ReservationApi> {
    Arc::new(
        HttpReservationClient::new(config.backend.base_url.clone())
            .with_timeout(config.backend.request_timeout()),
    )
}

fn agenda_projector(api: Arc<dyn ReservationApi>, config: &Config) -> AgendaProjector {
    CalendarProjector::from_config(api, AgendaCalendar::new(config.ui.time_format), config)
}

pub fn build_projector(config: &Config) -> AgendaProjector {
    agenda_projector(connect(config), config)
}

fn build_controller(config: &Config) -> TerminalController {
    let api = connect(config);
    let projector = agenda_projector(api.clone(), config);
    ConversationController::from_config(api, projector, config)
}

pub async fn run_chat(config: &Config) -> Result<(), io::Error> {
    let controller = build_controller(config);
    let mut shown = 0;

    println!("Connected to {}. Type a request, or :help for commands.", config.backend.base_url);

    if let Err(e) = controller.refresh_calendar().await {
        eprintln!("Could not load reservations: {}", e);
    }
    print_calendar(&controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::Help => print_help(),
            Command::Refresh => {
                if let Err(e) = controller.refresh_calendar().await {
                    eprintln!("Could not load reservations: {}", e);
                }
            }
            Command::Show(number) => {
                let event = controller.projector().widget().event(number).cloned();
                match event {
                    Some(event) => controller.on_event_click(&event),
                    None => println!("No reservation numbered {}.", number),
                }
            }
            Command::Hover(number) => {
                match controller.projector().widget().tooltip(number) {
                    Some(tooltip) => println!("{}", tooltip),
                    None => println!("No reservation numbered {}.", number),
                }
            }
            Command::Unknown(input) => println!("Unknown command: {}", input),
            Command::Say(text) => match controller.submit_utterance(&text).await {
                Ok(outcome) => {
                    if outcome.is_completed() {
                        tracing::info!("Booking dialogue finished");
                    }
                }
                Err(SubmitError::EmptyUtterance) => {}
                Err(e) => println!("{}", e),
            },
        }

        shown = print_new_messages(&controller, shown);
        print_calendar(&controller);
    }

    tracing::info!("Chat session ended");
    Ok(())
}

fn print_new_messages(controller: &TerminalController, shown: usize) -> usize {
    let chat = controller.chat();
    for message in chat.since(shown) {
        if message.sender == Sender::Bot {
            println!("{}", format_bot_message(message));
        }
    }
    chat.len()
}

fn format_bot_message(message: &ChatMessage) -> String {
    let indent = "\n        ";
    format!("[{}] bot: {}", message.time_label(), message.text.replace('\n', indent))
}

fn print_calendar(controller: &TerminalController) {
    if let Some(agenda) = controller.projector().widget().take_output() {
        println!("{}", agenda);
    }
}

fn print_help() {
    println!(":show N    describe reservation N");
    println!(":hover N   title and time of reservation N");
    println!(":refresh   reload the calendar");
    println!(":quit      leave");
}
