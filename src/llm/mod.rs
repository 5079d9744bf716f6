// Cloud Client: optional chat-completion fallback

pub mod openai;
pub mod provider;

pub use openai::OpenAIAdapter;
pub use provider::*;
