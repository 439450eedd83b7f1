use crate::config::CheckoutConfig;
use crate::domain::checkout::{CheckoutState, Currency, Outcome, Step};
use crate::domain::ports::OutcomePolicyBox;
use crate::error::Result;
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Notifications emitted by a [`CheckoutFlow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// A processing attempt finished. Sent exactly once per completed attempt.
    Settled { attempt: u64, outcome: Outcome },
    /// The flow was reset by `done`, `cancel` or `close`.
    Closed,
}

pub type FlowEvents = mpsc::UnboundedReceiver<FlowEvent>;

struct Shared {
    checkout: CheckoutState,
    /// Number of the latest processing attempt. Never reset, so stale timers can be told apart.
    attempt: u64,
}

/// Drives one checkout from amount entry to a settled payment.
///
/// Actions that do not apply to the current step are ignored and simply return
/// the step the flow is in. The processing step is simulated by a timer task whose
/// result is decided by the injected [`OutcomePolicy`](crate::domain::ports::OutcomePolicy).
/// Resetting the flow, or dropping it, cancels that task.
pub struct CheckoutFlow {
    shared: Arc<Mutex<Shared>>,
    policy: OutcomePolicyBox,
    config: CheckoutConfig,
    events: mpsc::UnboundedSender<FlowEvent>,
    /// Timer of the current attempt. Kept outside `shared` so `Drop` never has to wait for it.
    pending: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl CheckoutFlow {
    /// Opens a fresh flow along with the receiving end of its event stream.
    pub fn new(config: CheckoutConfig, policy: OutcomePolicyBox) -> (Self, FlowEvents) {
        let (events, receiver) = mpsc::unbounded_channel();
        let flow = Self {
            shared: Arc::new(Mutex::new(Shared {
                checkout: CheckoutState::new(),
                attempt: 0,
            })),
            policy,
            config,
            events,
            pending: std::sync::Mutex::new(None),
        };
        (flow, receiver)
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    pub async fn current_state(&self) -> CheckoutState {
        self.shared.lock().await.checkout.clone()
    }

    /// Entered amount plus the configured fee, e.g. `"25.10 USDC"`.
    pub async fn total_display(&self) -> String {
        self.shared
            .lock()
            .await
            .checkout
            .total_display(self.config.fee)
    }

    pub async fn edit_amount(&self, value: impl Into<String>) -> Step {
        self.apply(|checkout| checkout.edit_amount(value)).await
    }

    pub async fn set_currency(&self, currency: Currency) -> Step {
        self.apply(|checkout| checkout.set_currency(currency)).await
    }

    pub async fn submit_amount(&self, value: &str, currency: Currency) -> Step {
        self.apply(|checkout| checkout.submit_amount(value, currency))
            .await
    }

    pub async fn go_back(&self) -> Step {
        self.apply(CheckoutState::go_back).await
    }

    pub async fn retry(&self) -> Step {
        self.apply(CheckoutState::retry).await
    }

    /// Moves to processing and schedules the simulated completion.
    pub async fn select_wallet(&self, wallet: impl Into<String>) -> Step {
        let mut shared = self.shared.lock().await;
        if let Err(e) = shared.checkout.select_wallet(wallet) {
            debug!(error = %e, "ignoring wallet selection");
            return shared.checkout.step;
        }

        shared.attempt += 1;
        let attempt = shared.attempt;
        self.replace_pending(Some(tokio::spawn(complete_attempt(
            Arc::clone(&self.shared),
            Arc::clone(&self.policy),
            self.events.clone(),
            self.config.processing_delay(),
            attempt,
        ))));
        debug!(attempt, wallet = ?shared.checkout.selected_wallet, "processing started");
        Step::Processing
    }

    /// Success -> closed.
    pub async fn done(&self) -> Step {
        self.close_if(Some(Step::Success)).await
    }

    /// Error -> closed.
    pub async fn cancel(&self) -> Step {
        self.close_if(Some(Step::Error)).await
    }

    /// Closes the flow from any step, abandoning a pending attempt.
    pub async fn close(&self) -> Step {
        self.close_if(None).await
    }

    async fn close_if(&self, required: Option<Step>) -> Step {
        let mut shared = self.shared.lock().await;
        let step = shared.checkout.step;
        if let Some(required) = required
            && step != required
        {
            debug!(%step, "ignoring close request");
            return step;
        }

        self.replace_pending(None);
        shared.checkout.reset();
        info!(from = %step, "checkout closed");
        let _ = self.events.send(FlowEvent::Closed);
        shared.checkout.step
    }

    fn replace_pending(&self, next: Option<JoinHandle<()>>) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = std::mem::replace(&mut *pending, next) {
            handle.abort();
        }
    }

    async fn apply<F>(&self, transition: F) -> Step
    where
        F: FnOnce(&mut CheckoutState) -> Result<()>,
    {
        let mut shared = self.shared.lock().await;
        if let Err(e) = transition(&mut shared.checkout) {
            debug!(error = %e, "ignoring checkout action");
        }
        shared.checkout.step
    }
}

impl Drop for CheckoutFlow {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

async fn complete_attempt(
    shared: Arc<Mutex<Shared>>,
    policy: OutcomePolicyBox,
    events: mpsc::UnboundedSender<FlowEvent>,
    delay: Duration,
    attempt: u64,
) {
    tokio::time::sleep(delay).await;
    let outcome = policy.decide(attempt).await;

    let mut shared = shared.lock().await;
    if shared.attempt != attempt || shared.checkout.step != Step::Processing {
        debug!(attempt, "discarding stale completion");
        return;
    }
    if shared.checkout.settle(outcome).is_ok() {
        info!(attempt, ?outcome, "payment attempt settled");
        let _ = events.send(FlowEvent::Settled { attempt, outcome });
    }
}
