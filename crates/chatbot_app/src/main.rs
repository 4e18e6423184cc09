mod app;
mod effects;
mod tui;
mod ui;

use anyhow::Result;
use chatbot_engine::{BackendSettings, BASE_URL_ENV};
use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "chatbot-nicsp")]
#[command(about = "Terminal chat client for the NICSP question-answering backend")]
struct Cli {
    /// Backend base URL; defaults to the local backend.
    #[arg(long, env = BASE_URL_ENV)]
    backend_url: Option<String>,

    /// Where to write logs.
    #[arg(long, value_enum, default_value = "file")]
    log: LogArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogArg {
    File,
    Terminal,
    Both,
    Off,
}

impl From<LogArg> for chat_logging::LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::File => chat_logging::LogDestination::File,
            LogArg::Terminal => chat_logging::LogDestination::Terminal,
            LogArg::Both => chat_logging::LogDestination::Both,
            LogArg::Off => chat_logging::LogDestination::Off,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    chat_logging::initialize(cli.log.into());

    let settings = match cli.backend_url {
        Some(url) => BackendSettings::with_base_url(url),
        None => BackendSettings::from_env(),
    };
    app::run(settings)
}
