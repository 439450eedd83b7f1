//! Domain types and the pure rules that operate on them.

pub mod checkout;
pub mod comparison;
pub mod ports;
pub mod provider;
