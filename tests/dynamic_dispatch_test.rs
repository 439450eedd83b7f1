use stablepay::domain::checkout::Outcome;
use stablepay::domain::ports::OutcomePolicyBox;
use stablepay::infrastructure::outcome::{FixedOutcomePolicy, RandomOutcomePolicy, ScriptedOutcomePolicy};
use std::sync::Arc;

#[tokio::test]
async fn test_policies_as_trait_objects() {
    let policies: Vec<OutcomePolicyBox> = vec![
        Arc::new(FixedOutcomePolicy(Outcome::Failure)),
        Arc::new(RandomOutcomePolicy::seeded(1.0, 3).unwrap()),
        Arc::new(ScriptedOutcomePolicy::new([Outcome::Success])),
    ];

    // Verify Send + Sync by deciding from spawned tasks
    let handles: Vec<_> = policies
        .into_iter()
        .map(|policy| tokio::spawn(async move { policy.decide(1).await }))
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }
    assert_eq!(
        outcomes,
        [Outcome::Failure, Outcome::Success, Outcome::Success]
    );
}
