pub mod chat;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod llm_interaction;
pub mod web_server;

pub use config::{CompletionConfig, ServerConfig};
pub use conversation::{build_envelope, ChatMessage, FormSelection, Role, SessionLog, Turn, TurnStatus};
pub use llm_interaction::{CompletionClient, CompletionError};
