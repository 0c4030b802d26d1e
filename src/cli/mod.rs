//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, resolves configuration, and
//! dispatches into the chat loop.

use std::error::Error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::core::app::Endpoint;
use crate::core::config::{
    Config, Credentials, DEFAULT_BASE_URL, DEFAULT_GREETING, DEFAULT_MODEL,
};
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "causerie")]
#[command(about = "A terminal chat interface for legacy completion APIs")]
#[command(
    long_about = "Causerie is a full-screen terminal chat interface that forwards each message \
to a remote completion API and renders the exchange as message bubbles. A typewriter \
greeting plays until you start typing.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY        Your API key (requests are attempted, and fail remotely, without it)\n\
  OPENAI_ORGANIZATION   Organization id sent with each request (optional)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+C            Quit the application\n\
  Backspace         Delete characters in the input field"
)]
pub struct Args {
    /// Completion model to use
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// API base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the greeting banner text
    #[arg(short = 'g', long, value_name = "TEXT")]
    pub greeting: Option<String>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    // Diagnostics are env-driven and land on stderr; with RUST_LOG unset
    // nothing is emitted, which keeps the alternate screen clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load()?;

    let model = args
        .model
        .or(config.default_model)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let base_url = args
        .base_url
        .or(config.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let greeting = args
        .greeting
        .or(config.greeting)
        .unwrap_or_else(|| DEFAULT_GREETING.to_string());

    let endpoint = Endpoint {
        base_url,
        model,
        credentials: Credentials::from_env(),
    };

    run_chat(endpoint, greeting).await
}
