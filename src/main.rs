use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use docchat::config::{ClientConfig, ConfigError, normalize_base_url};
use docchat::net::types::{TransportError, UploadError};
use docchat::notify::TracingNotifier;
use docchat::storage::{JsonFileStore, StoreError};
use docchat::{ChatError, ChatWidget, HttpChatApi, User};

const DEFAULT_STORE_PATH: &str = ".docchat/store.json";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "docchat", about = "Chat with the document assistant from the terminal")]
struct Cli {
    /// Overrides `DOCCHAT_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `DOCCHAT_SESSION_TOKEN`.
    #[arg(long)]
    session_token: Option<String>,

    /// Overrides `DOCCHAT_STORE_PATH`.
    #[arg(long)]
    store_path: Option<PathBuf>,

    #[arg(long, env = "DOCCHAT_USER_ID")]
    user_id: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the chat session id for the user, creating it if needed.
    Session {
        /// Forget the stored id and start a new conversation.
        #[arg(long)]
        reset: bool,
    },
    /// Print the conversation history.
    History,
    /// Send a message and print the refreshed history.
    Send {
        #[arg(required = true)]
        content: Vec<String>,
    },
    /// Upload a PDF, PowerPoint, or Word document.
    Upload { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let store_path = config
        .store_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));

    let store = Arc::new(JsonFileStore::open(&store_path)?);
    let api = Arc::new(HttpChatApi::new(&config)?);
    let widget = ChatWidget::new(store, api, Arc::new(TracingNotifier));
    widget.set_user(Some(User { id: cli.user_id.clone(), name: cli.user_id.clone() }));
    tracing::debug!(base_url = %config.base_url, store = %store_path.display(), "docchat ready");

    match cli.command {
        Command::Session { reset } => {
            if reset {
                widget.reset_session()?;
            }
            println!("{}", widget.session_id());
        }
        Command::History => print_history(&widget).await?,
        Command::Send { content } => {
            widget.set_draft(content.join(" "));
            widget.submit().await?;
            print_history(&widget).await?;
        }
        Command::Upload { path } => {
            let file = docchat::widget::load_upload_file(&path).await?;
            let ack = widget.select_file(file).await?;
            println!("{}", serde_json::to_string_pretty(&ack)?);
        }
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config.base_url = normalize_base_url(base_url)?;
    }
    if let Some(token) = cli.session_token.clone() {
        config.session_token = Some(token);
    }
    if let Some(path) = cli.store_path.clone() {
        config.store_path = Some(path);
    }
    Ok(config)
}

async fn print_history(widget: &ChatWidget) -> Result<(), CliError> {
    for message in widget.messages().await? {
        let who = if message.is_bot { "assistant" } else { "you" };
        println!("[{who}] {}", message.content);
    }
    Ok(())
}
