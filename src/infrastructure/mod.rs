//! Adapters behind the domain ports: outcome policies and the provider catalog.

pub mod catalog;
pub mod outcome;
