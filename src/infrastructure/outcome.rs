use crate::domain::checkout::Outcome;
use crate::domain::ports::OutcomePolicy;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Succeeds with a fixed probability.
///
/// This is the production policy. Seed it with [`RandomOutcomePolicy::seeded`]
/// to get a reproducible sequence of outcomes.
pub struct RandomOutcomePolicy {
    success_rate: f64,
    rng: Mutex<StdRng>,
}

impl RandomOutcomePolicy {
    /// Success probability used by the demo checkout.
    pub const DEFAULT_SUCCESS_RATE: f64 = 0.7;

    pub fn new(success_rate: f64) -> Result<Self> {
        Self::with_rng(success_rate, StdRng::from_entropy())
    }

    pub fn seeded(success_rate: f64, seed: u64) -> Result<Self> {
        Self::with_rng(success_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(success_rate: f64, rng: StdRng) -> Result<Self> {
        if !(0.0..=1.0).contains(&success_rate) {
            return Err(PaymentError::InvalidConfig(format!(
                "success rate {success_rate} is outside [0, 1]"
            )));
        }
        Ok(Self {
            success_rate,
            rng: Mutex::new(rng),
        })
    }
}

#[async_trait]
impl OutcomePolicy for RandomOutcomePolicy {
    async fn decide(&self, _attempt: u64) -> Outcome {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if rng.gen_bool(self.success_rate) {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

/// Always returns the same outcome.
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcomePolicy(pub Outcome);

#[async_trait]
impl OutcomePolicy for FixedOutcomePolicy {
    async fn decide(&self, _attempt: u64) -> Outcome {
        self.0
    }
}

/// Plays back a list of outcomes in order, then repeats the last one.
pub struct ScriptedOutcomePolicy {
    script: Mutex<VecDeque<Outcome>>,
    last: Outcome,
}

impl ScriptedOutcomePolicy {
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let script: VecDeque<Outcome> = outcomes.into_iter().collect();
        let last = script.back().copied().unwrap_or(Outcome::Success);
        Self {
            script: Mutex::new(script),
            last,
        }
    }
}

#[async_trait]
impl OutcomePolicy for ScriptedOutcomePolicy {
    async fn decide(&self, _attempt: u64) -> Outcome {
        let mut script = self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        script.pop_front().unwrap_or(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_random_policy_extremes() {
        let always = RandomOutcomePolicy::seeded(1.0, 7).unwrap();
        let never = RandomOutcomePolicy::seeded(0.0, 7).unwrap();
        for attempt in 1..=20 {
            assert_eq!(always.decide(attempt).await, Outcome::Success);
            assert_eq!(never.decide(attempt).await, Outcome::Failure);
        }
    }

    #[tokio::test]
    async fn test_random_policy_is_reproducible_with_seed() {
        let a = RandomOutcomePolicy::seeded(0.7, 42).unwrap();
        let b = RandomOutcomePolicy::seeded(0.7, 42).unwrap();
        for attempt in 1..=50 {
            assert_eq!(a.decide(attempt).await, b.decide(attempt).await);
        }
    }

    #[tokio::test]
    async fn test_random_policy_roughly_matches_rate() {
        let policy = RandomOutcomePolicy::seeded(RandomOutcomePolicy::DEFAULT_SUCCESS_RATE, 1).unwrap();
        let mut successes = 0;
        for attempt in 1..=2000 {
            if policy.decide(attempt).await == Outcome::Success {
                successes += 1;
            }
        }
        assert!((1200..=1600).contains(&successes), "got {successes} successes");
    }

    #[test]
    fn test_random_policy_rejects_bad_rate() {
        assert!(matches!(
            RandomOutcomePolicy::new(1.5),
            Err(PaymentError::InvalidConfig(_))
        ));
        assert!(RandomOutcomePolicy::new(f64::NAN).is_err());
    }

    #[tokio::test]
    async fn test_scripted_policy_repeats_last() {
        let policy = ScriptedOutcomePolicy::new([Outcome::Failure, Outcome::Success]);
        assert_eq!(policy.decide(1).await, Outcome::Failure);
        assert_eq!(policy.decide(2).await, Outcome::Success);
        assert_eq!(policy.decide(3).await, Outcome::Success);
    }
}
