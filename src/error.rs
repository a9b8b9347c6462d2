//! Error taxonomy for request lifecycle operations

use crate::ids::IdError;

/// Typed rejection of a lifecycle action. All of these are recoverable at
/// the call boundary; none are promoted to a fatal failure. An
/// `InvalidTransition` in particular is a no-op so a stale UI action is
/// always safe to retry.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("action is not legal for the current status")]
    InvalidTransition,
    #[error("handoff code does not match")]
    CodeMismatch,
    #[error("caller is not the assigned provider")]
    NotAssignedProvider,
    #[error("caller is not the owning customer")]
    NotOwningCustomer,
    #[error("no outstanding quote to accept")]
    MissingQuote,
    #[error("quoted price must be greater than zero")]
    InvalidPrice,
}

/// A request draft that cannot be finalised into a document.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field missing: {0}")]
    Missing(&'static str),
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// Store-level failures. These are transient from the caller's point of
/// view; all lifecycle actions are retry-safe.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,
    #[error("store backend failure: {0}")]
    Backend(#[from] sled::Error),
    #[error("document decode failed: {0}")]
    Decode(#[from] minicbor::decode::Error),
    #[error("document encode failed: {0}")]
    Encode(String),
    #[error("failed to mint document id: {0}")]
    Id(#[from] IdError),
}

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// The typed rejection behind this error, if that is what it is.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Rejected(r) => Some(*r),
            _ => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AssistantError {
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
