//! Parsed analysis-provider response.
//!
//! The provider answers with a single JSON document; all five top-level
//! keys must be present or acquisition fails. Field names mirror the JSON
//! schema the prompt demands, hence the camelCase renames.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Full provider response for one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Narrative market commentary. Not consumed downstream, so the shape
    /// is left open.
    pub market_analysis: serde_json::Value,
    /// Avellaneda-Stoikov model parameters.
    pub parameters: ModelParameters,
    pub risk_assessment: RiskAssessment,
    pub strategy_recommendations: StrategyRecommendations,
    /// Free-text reasoning from the provider.
    pub reasoning: String,
}

/// Avellaneda-Stoikov model parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParameters {
    /// Risk aversion.
    pub gamma: Decimal,
    /// Order-arrival sensitivity. Parsed and logged, unused by the calculator.
    pub kappa: Decimal,
    /// Volatility.
    pub sigma: Decimal,
    /// Time horizon in minutes.
    pub time_horizon: Decimal,
    pub target_inventory: Decimal,
    /// Weight of the inventory skew term.
    #[serde(default = "default_inventory_risk_weight")]
    pub inventory_risk_weight: Decimal,
}

fn default_inventory_risk_weight() -> Decimal {
    Decimal::new(2, 1) // 0.2
}

/// Provider's risk read. `level` is kept as free text: the prompt constrains
/// it to LOW|MEDIUM|HIGH but nothing downstream branches on it, and a typed
/// enum would turn a cosmetic deviation into a cycle failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub level: String,
    #[serde(default)]
    pub factors: Vec<String>,
}

/// Bounds and limits the calculator quotes within.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRecommendations {
    /// Minimum spread as a fraction of mid.
    pub min_spread: Decimal,
    /// Maximum spread as a fraction of mid.
    pub max_spread: Decimal,
    /// Maximum absolute position in contracts.
    pub max_position: Decimal,
    #[serde(default)]
    pub notes: String,
}
