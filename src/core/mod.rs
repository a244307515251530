pub mod bridge;
pub mod chat;
pub mod engine;

pub use bridge::{ChatBridge, ChatExchange, ExecutionStatusView};
