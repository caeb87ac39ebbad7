use reschat::storage::config::Config;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{parse_cli_options, run_agenda_mode, CliMode, USAGE};
mod terminal;
use terminal::run_chat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let options = match parse_cli_options() {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", USAGE);
            return Ok(());
        }
    };

    let mut config = Config::load_or_create()?;
    if let Some(url) = options.backend {
        config.backend.base_url = url;
    }

    match options.mode {
        CliMode::Agenda => run_agenda_mode(&config).await?,
        CliMode::Chat => run_chat(&config).await?,
    }

    Ok(())
}

fn setup_logging() {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "reschat.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("reschat started");
}
