//! Application layer: the stateful checkout flow and the rate comparison engine.
//!
//! Both sit on top of the pure rules in [`crate::domain`]. `CheckoutFlow` owns the
//! flow state and the simulated processing timer, `RateComparisonEngine` owns the
//! validated provider table.

pub mod checkout;
pub mod rates;
