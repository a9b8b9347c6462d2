//! Status vocabulary shared by the three request domains.
//!
//! One enum covers all domains; which statuses are reachable for a given
//! domain is decided by the transition tables in [`crate::machine`]. The
//! `Display` strings are consumed verbatim by the UI layer.

use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, minicbor::Encode, minicbor::Decode,
)]
pub enum Status {
    /// Awaiting quotes from providers (ride, home-service).
    #[n(0)]
    Open,
    /// At least one quote has been submitted; the latest one is outstanding.
    #[n(1)]
    Quoted,
    /// The customer accepted a quote; a provider is now on the hook.
    #[n(2)]
    Assigned,
    /// A handoff code has been generated and awaits verification.
    #[n(3)]
    HandoffPending,
    /// Ride underway (ride domain only).
    #[n(4)]
    InProgress,
    /// Terminal: fulfilled.
    #[n(5)]
    Completed,
    /// Terminal: withdrawn by the customer before assignment.
    #[n(6)]
    Cancelled,
    /// Delivery order waiting in the open pool for a partner (delivery).
    #[n(7)]
    Ready,
    /// A delivery partner self-assigned from the pool (delivery).
    #[n(8)]
    ProviderAssigned,
}

impl Status {
    /// Terminal states accept no further mutation.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// True once a provider assignment has happened (or could only have
    /// happened). Phone numbers and names are revealed from here on.
    pub fn provider_assigned(self) -> bool {
        matches!(
            self,
            Self::Assigned
                | Self::ProviderAssigned
                | Self::HandoffPending
                | Self::InProgress
                | Self::Completed
        )
    }

    /// The provider-selection window: quotes may be submitted and the
    /// customer may still cancel.
    pub fn awaiting_quotes(self) -> bool {
        matches!(self, Self::Open | Self::Quoted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Quoted => "quoted",
            Self::Assigned => "assigned",
            Self::HandoffPending => "handoff-pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Ready => "ready",
            Self::ProviderAssigned => "provider-assigned",
        };
        f.write_str(s)
    }
}
