use super::checkout::Outcome;
use async_trait::async_trait;
use std::sync::Arc;

/// Decides how a simulated processing attempt ends.
#[async_trait]
pub trait OutcomePolicy: Send + Sync {
    /// `attempt` is the flow's attempt number, starting at 1.
    async fn decide(&self, attempt: u64) -> Outcome;
}

pub type OutcomePolicyBox = Arc<dyn OutcomePolicy>;
