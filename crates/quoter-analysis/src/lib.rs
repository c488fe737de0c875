//! Analysis acquisition for the perp quoter.
//!
//! Obtains Avellaneda-Stoikov model parameters from agent.market via
//! create-instance / poll-message semantics: submit a background prompt,
//! poll the instance transcript with a bounded attempt budget, parse the
//! provider's JSON answer.

pub mod client;
pub mod error;
pub mod provider;
pub mod settings;

pub use client::{AgentMarketClient, ChatMessage};
pub use error::AnalysisError;
pub use provider::{AgentMarketProvider, AnalysisSource};
pub use settings::AgentMarketConfig;
