//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Store access (SQLite in production, in-memory for tests)
//! - LLM calls (could swap Ollama -> any OpenAI-compatible server)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{ChatRepo, ContentRepo, InvestigationRepo, PlaythroughRepo};

pub use types::{ChargeOutcome, StartOutcome};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    FinishReason, LlmPort, LlmRequest, LlmResponse, MessageRole, PromptMessage, TokenUsage,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockChatRepo, MockContentRepo, MockInvestigationRepo, MockPlaythroughRepo};

#[cfg(test)]
pub use external::MockLlmPort;

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{LlmError, RepoError};
