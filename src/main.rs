use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use localmind::agents::{FileUploadAgent, QueryRouter};
use localmind::llm::{CloudClient, OpenAIAdapter};
use localmind::models::ConversationMessage;
use localmind::settings::resolve_cloud_config;
use localmind::{build_state, config::Config, create_router, utils::init_logger};

#[derive(Parser)]
#[command(name = "localmind", version, about = "Local-first chat and data analysis")]
struct Cli {
    /// Data directory (overrides LOCALMIND_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Answer a single message and exit
    Ask { message: String },
    /// Import a CSV or JSON file as a dataset
    Import { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    info!(data_dir = ?config.storage.data_dir, cloud = ?config.cloud, "Configuration loaded");

    let state = build_state(config, Arc::new(OpenAIAdapter::new())).await?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            let port = port.unwrap_or(state.config.server.port);
            let addr: SocketAddr = format!("{}:{}", state.config.server.host, port)
                .parse()
                .context("invalid HOST/PORT")?;

            let app = create_router(state);
            info!("Server listening on {}", addr);

            let listener = TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .await
                .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
        }
        Command::Ask { message } => {
            let history = state.transcript.read().await.history();
            let cloud = resolve_cloud_config(&state.config.cloud, &state.store).await;
            let router = QueryRouter::new(
                state.store.clone(),
                CloudClient::new(cloud, state.adapter.clone()),
            );
            let reply = router.respond(&message, &history).await;

            state
                .store
                .append_message(&ConversationMessage::user(message))
                .await?;
            state
                .store
                .append_message(&ConversationMessage::assistant(reply.content.clone(), reply.origin))
                .await?;

            println!("{}", reply.content);
        }
        Command::Import { path } => {
            let content = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .context("file name is not valid UTF-8")?;

            let dataset = FileUploadAgent::process_file(filename, &content)?;
            state.store.save_dataset(&dataset).await?;

            println!("Imported {} as {} ({} records)", filename, dataset.id, dataset.record_count());
        }
    }

    Ok(())
}
