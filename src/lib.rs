#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod security;
pub mod transport;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use self::core::{ChatBridge, ChatExchange, ExecutionStatusView};
pub use error::{BridgeError, DispatchError, PollError};
