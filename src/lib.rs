//! Request lifecycle engine for a multi-domain marketplace.
//!
//! Customers post requests (rides, home-service jobs, delivery orders),
//! providers compete by quoting a price, the customer accepts one quote,
//! and the physical handoff is confirmed with a one-time code before the
//! job completes. One table-driven state machine carries all three
//! domains; sled holds the documents and fans writes out to standing
//! filtered subscriptions.

pub mod assistant;
pub mod domain;
pub mod error;
pub mod handoff;
pub mod ids;
pub mod machine;
pub mod quote;
pub mod request;
pub mod service;
pub mod status;
pub mod store;
pub mod visibility;
