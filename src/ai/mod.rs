pub mod client;
pub mod gateway;

pub use client::{ModelConfig, OpenRouterClient, DEFAULT_MODEL};
pub use gateway::{default_sentence_pair, fallback_sentence_pair, ContentGateway, OpenRouterGateway};
