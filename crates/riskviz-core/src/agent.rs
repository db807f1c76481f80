//! The agent backend contract: the three stateless inference endpoints the
//! query pipeline orchestrates.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The result of executing generated code against a sheet.
///
/// Both fields are opaque to this layer: `data` is whatever table/figure
/// payload the backend computed, `meta` is its accompanying metadata. The
/// pipeline only threads them into the Explain stage and keeps `data` around
/// for downstream reuse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteOutcome {
    pub data: Value,
    #[serde(default)]
    pub meta: Value,
}

/// The natural-language explanation of an execution result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
}

/// An abstract client for the translate/execute/explain endpoints.
///
/// Each method maps to one stateless RPC; the pipeline calls them in strict
/// sequence, feeding each stage's output into the next.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Translates a natural-language question into generated code.
    ///
    /// The returned code is an opaque string; it is not interpreted or
    /// validated locally.
    async fn translate(&self, question: &str, sheet: Option<&str>) -> Result<String>;

    /// Executes generated code against the given sheet.
    async fn execute(
        &self,
        code: &str,
        sheet: Option<&str>,
        question: Option<&str>,
    ) -> Result<ExecuteOutcome>;

    /// Explains an execution result in natural language.
    async fn explain(
        &self,
        question: &str,
        data: &Value,
        meta: Option<&Value>,
    ) -> Result<Explanation>;
}
