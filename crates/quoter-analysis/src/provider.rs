//! Analysis provider seam and the agent.market implementation.

use quoter_core::{AnalysisResult, BoxFuture, SymbolSnapshot};
use tracing::debug;

use crate::client::AgentMarketClient;
use crate::error::{AnalysisError, Result};

/// Source of model parameters for one cycle.
///
/// Exactly the one method the orchestrator needs. Callers chain any number
/// of implementations as an ordered fallback list.
pub trait AnalysisSource: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Produce an analysis for the given snapshots.
    fn fetch_analysis<'a>(
        &'a self,
        snapshots: &'a [SymbolSnapshot],
    ) -> BoxFuture<'a, Result<AnalysisResult>>;
}

/// Fetches Avellaneda parameters by delegating to agent.market providers.
pub struct AgentMarketProvider {
    client: AgentMarketClient,
}

impl AgentMarketProvider {
    pub fn new(client: AgentMarketClient) -> Self {
        Self { client }
    }
}

impl AnalysisSource for AgentMarketProvider {
    fn name(&self) -> &str {
        "agent.market"
    }

    fn fetch_analysis<'a>(
        &'a self,
        snapshots: &'a [SymbolSnapshot],
    ) -> BoxFuture<'a, Result<AnalysisResult>> {
        Box::pin(async move {
            if snapshots.is_empty() {
                return Err(AnalysisError::NoSnapshots);
            }

            let background = build_background_prompt(snapshots)?;
            debug!(chars = background.len(), "Built background prompt");

            let instance_id = self.client.create_instance(&background).await?;
            let message = self
                .client
                .poll_provider_message(&instance_id)
                .await?
                .ok_or(AnalysisError::NoResponse(instance_id))?;

            parse_analysis(&message)
        })
    }
}

/// Deterministic background prompt: market list, the snapshot array as
/// JSON, and the required output schema.
fn build_background_prompt(snapshots: &[SymbolSnapshot]) -> Result<String> {
    let snapshot_json = serde_json::to_string_pretty(snapshots)?;
    let markets = snapshots
        .iter()
        .map(|s| s.symbol.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "# Hyperliquid Avellaneda Parameters\n\n\
         You run a market-neutral strategy that refreshes Avellaneda-Stoikov parameters \
         before each cycle. Generate realistic parameters for the current session based on \
         the portfolio inputs below.\n\n\
         ## Inputs\n\
         Markets: {markets}\n\
         Snapshot (JSON):\n{snapshot_json}\n\n\
         ## Output Requirements\n\
         Respond with **only** valid JSON using this structure:\n\
         {{\n\
         \x20 \"marketAnalysis\": {{\"volatility\": str, \"liquidity\": str, \"fundingRate\": str, \"trend\": str, \"summary\": str}},\n\
         \x20 \"parameters\": {{\"gamma\": float, \"kappa\": float, \"sigma\": float, \"timeHorizon\": int, \"targetInventory\": float, \"inventoryRiskWeight\": float}},\n\
         \x20 \"riskAssessment\": {{\"level\": \"LOW|MEDIUM|HIGH\", \"factors\": [str, ...]}},\n\
         \x20 \"strategyRecommendations\": {{\"minSpread\": float, \"maxSpread\": float, \"maxPosition\": int, \"notes\": str}},\n\
         \x20 \"reasoning\": str\n\
         }}\n\n\
         Constraints: gamma 0.05-1.0, sigma 0.01-1.0, timeHorizon in minutes (15-180), \
         spreads between 0.001 and 0.05, maxPosition 1-10 contracts. Tune these values \
         using the snapshot data and risk intuition."
    ))
}

/// Parse the provider's raw chat message into an `AnalysisResult`.
///
/// Tolerates fenced code blocks and surrounding prose: fence delimiter
/// lines are dropped, then the substring from the first `{` to the last
/// `}` is parsed. Typed deserialization enforces the five required
/// top-level keys.
fn parse_analysis(raw_message: &str) -> Result<AnalysisResult> {
    let cleaned: String = if raw_message.contains("```") {
        raw_message
            .lines()
            .filter(|line| !line.contains("```"))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        raw_message.to_string()
    };

    let start = cleaned.find('{').ok_or(AnalysisError::NoJsonPayload)?;
    let end = cleaned.rfind('}').ok_or(AnalysisError::NoJsonPayload)?;
    if end < start {
        return Err(AnalysisError::NoJsonPayload);
    }

    Ok(serde_json::from_str(&cleaned[start..=end])?)
}
