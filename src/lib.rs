//! Interactive learning-session engine for an English-grammar tutor aimed
//! at Polish learners.
//!
//! The embedding UI owns an event loop: it drives the component state
//! machines ([`quiz::QuizEngine`], [`translation::TranslationPipeline`],
//! [`chat::ConversationManager`]) directly, forwards their emitted
//! [`models::GatewayRequest`]s to the worker spawned by
//! [`worker::spawn_gateway_worker`], and routes each drained
//! [`models::GatewayResponse`] back into the component that issued it.

pub mod ai;
pub mod chat;
pub mod curriculum;
pub mod error;
pub mod logger;
pub mod models;
pub mod progress;
pub mod quiz;
pub mod translation;
pub mod worker;

// Re-exports for convenience
pub use ai::{ContentGateway, ModelConfig, OpenRouterGateway, DEFAULT_MODEL};
pub use chat::ConversationManager;
pub use curriculum::{builtin_sections, FlashcardDeck, GrammarSection};
pub use error::{GatewayError, ProgressError};
pub use models::{
    ConversationTurn, GatewayRequest, GatewayResponse, SentencePair, Speaker, Task, TaskKind,
    UserProgress, Verdict,
};
pub use progress::{MemoryProgressStore, ProgressStore, SqliteProgressStore};
pub use quiz::{QuizEngine, QuizPhase};
pub use translation::{TranslationPipeline, TranslationStage};
pub use worker::spawn_gateway_worker;
