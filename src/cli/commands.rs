use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::chat::AnalysisMode;

/// `Flowbridge` - chat front door for long-running workflow executions.
#[derive(Parser, Debug)]
#[command(name = "flowbridge")]
#[command(version)]
#[command(
    about = "Bridge chat requests to a remote workflow engine.",
    long_about = None
)]
pub struct Cli {
    /// Config file (default: ~/.flowbridge/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway
    Gateway {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Send one chat request through the bridge and print the reply
    Send {
        /// Conversation session id
        #[arg(short, long)]
        session: String,

        /// Message to send
        #[arg(short, long)]
        message: String,

        /// Analysis depth
        #[arg(long, value_enum, default_value_t = AnalysisMode::Quick)]
        mode: AnalysisMode,

        #[arg(long, default_value = "")]
        domain: String,

        #[arg(long, default_value = "")]
        market: String,

        /// Goal, repeatable
        #[arg(long = "goal")]
        goals: Vec<String>,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Query a workflow execution once
    Status {
        /// Execution id returned by the engine
        execution_id: String,
    },
}
