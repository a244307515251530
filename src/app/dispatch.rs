use crate::cli::commands::{Cli, Commands};
use crate::core::chat::{ChatContext, ChatRequest};
use crate::core::{ChatBridge, ExecutionStatusView};
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tracing::info;

use crate::Config;

/// Client id used for requests issued from the command line.
const CLI_CLIENT_ID: &str = "cli";

async fn run_send(config: &Config, request: ChatRequest) -> Result<()> {
    let bridge = ChatBridge::from_config(config)?;
    if bridge.is_mock() {
        info!("no workflow webhook configured, replying in mock mode");
    }

    let body = serde_json::to_vec(&request).context("encode chat request")?;
    let exchange = bridge.handle(CLI_CLIENT_ID, &body).await;
    match &exchange.result {
        Ok(reply) => {
            println!("{reply}");
            info!(
                request_id = %exchange.request_id,
                duration_ms = exchange.duration_ms(),
                "reply received"
            );
            Ok(())
        }
        Err(err) => bail!("{} ({})", err, err.code()),
    }
}

async fn run_status(config: &Config, execution_id: &str) -> Result<()> {
    let bridge = ChatBridge::from_config(config)?;
    let view = bridge
        .execution_status(execution_id)
        .await
        .map_err(|err| anyhow::anyhow!("{err} ({})", err.code()))?;

    match view {
        ExecutionStatusView::Success { output } => {
            println!("status: success");
            println!("{output}");
        }
        ExecutionStatusView::Error { error } => {
            println!("status: error");
            println!("{error}");
        }
        ExecutionStatusView::Running => println!("status: running"),
    }
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    match cli.command {
        Commands::Gateway { port, host } => {
            let port = port.unwrap_or(config.gateway.port);
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            if port == 0 {
                info!("Starting Flowbridge gateway on {host} (random port)");
            } else {
                info!("Starting Flowbridge gateway on {host}:{port}");
            }
            crate::transport::gateway::run_gateway(&host, port, Arc::clone(&config)).await
        }

        Commands::Send {
            session,
            message,
            mode,
            domain,
            market,
            goals,
            notes,
        } => {
            let request = ChatRequest {
                session_id: session,
                message,
                mode,
                context: ChatContext {
                    domain,
                    market,
                    goals,
                    notes,
                },
            };
            run_send(&config, request).await
        }

        Commands::Status { execution_id } => run_status(&config, &execution_id).await,
    }
}
