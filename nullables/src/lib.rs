//! Scripted stand-ins for the validator network.
//!
//! [`NullVerificationClient`] implements the same client trait as the HTTP
//! client, answers from a queue of canned results, and records what it was
//! asked, so poller and service behavior can be tested without a network.

pub mod verification;

pub use verification::{snapshot, NullVerificationClient};
