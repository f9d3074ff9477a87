//! Course assistant chat, terminal front end.
//!
//! Each line typed is placed in the widget's input and sent with Enter.
//! Lines starting with `/` are widget actions.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use mimalloc::MiMalloc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use coursechat_widget::client::HttpChatClient;
use coursechat_widget::config::{AppConfig, Cli};
use coursechat_widget::widget::{Body, ChatWidget, ConversationLog, LogEntry, LogView, Role};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const HELP: &str = "\
Type a question and press Enter.
  /send           send the current input (same as the button)
  /mode           toggle Bangla explanation mode
  /export <path>  write the conversation as HTML
  /help           show this help
  /quit           exit";

/// One line of terminal input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Type(&'a str),
    Click,
    ToggleMode,
    Export(&'a str),
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let Some(rest) = line.trim().strip_prefix('/') else {
            return Self::Type(line);
        };
        let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
        match (name, arg.trim()) {
            ("send", _) => Self::Click,
            ("mode", _) => Self::ToggleMode,
            ("export", path) if !path.is_empty() => Self::Export(path),
            ("help", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            _ => Self::Unknown(line.trim()),
        }
    }
}

/// Prints log mutations as they happen.
#[derive(Debug, Default)]
struct TerminalView;

impl LogView for TerminalView {
    fn appended(&mut self, entry: &LogEntry) {
        if let Err(e) = print_entry(&mut std::io::stdout().lock(), entry) {
            debug!(name: "chat.terminal.write_failed", error = %e, "Could not print log entry");
        }
    }

    fn removed(&mut self, entry: &LogEntry) {
        if entry.pending {
            println!();
        }
    }
}

/// Write one entry; a placeholder stays on its line until it is removed.
fn print_entry(out: &mut impl Write, entry: &LogEntry) -> std::io::Result<()> {
    let text = match &entry.body {
        Body::Text(text) | Body::Markup(text) => text,
    };
    match (entry.role, entry.pending) {
        (_, true) => write!(out, "  … {text}")?,
        (Role::User, false) => writeln!(out, "you> {text}")?,
        (Role::Assistant, false) => writeln!(out, "bot> {text}")?,
    }
    out.flush()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (if present)
    let _ = dotenvy::dotenv();

    // Initialize tracing (M-LOG-STRUCTURED); stdout belongs to the conversation
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli).context("Failed to load configuration")?;

    info!(
        name: "chat.config.loaded",
        base_url = %config.client.base_url,
        chat_path = %config.client.chat_path,
        "Chat configuration loaded"
    );

    let client = HttpChatClient::from_config(&config.client, &config.csrf)
        .context("Failed to build chat client")?;

    if config.client.bootstrap {
        match client.bootstrap().await {
            Ok(true) => {}
            Ok(false) => warn!(
                name: "chat.bootstrap.no_token",
                cookie = %config.csrf.cookie_name,
                "Chat page did not set a CSRF cookie; requests will be sent without a token"
            ),
            Err(e) => warn!(name: "chat.bootstrap.failed", error = %e, "Could not load chat page"),
        }
    }

    let log = ConversationLog::with_view(Box::new(TerminalView));
    let mut widget = ChatWidget::new(client, log, &config.widget);

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match Command::parse(&line) {
            Command::Type(text) => {
                widget.input_mut().set_value(text);
                widget.on_key("Enter").await;
            }
            Command::Click => {
                widget.on_click().await;
            }
            Command::ToggleMode => match widget.mode_mut() {
                Some(toggle) => {
                    let on = toggle.toggle();
                    println!("Bangla mode {}", if on { "on" } else { "off" });
                }
                None => println!("Mode toggle is disabled in this configuration"),
            },
            Command::Export(path) => {
                match tokio::fs::write(path, widget.log().to_html()).await {
                    Ok(()) => println!("Conversation written to {path}"),
                    Err(e) => println!("Could not write {path}: {e}"),
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Unknown(cmd) => println!("Unknown command {cmd}; try /help"),
        }
    }

    info!(name: "chat.session.ended", messages = widget.log().len(), "Chat session ended");
    Ok(())
}
