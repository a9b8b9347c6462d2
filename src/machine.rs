//! Table-driven status state machine.
//!
//! `apply` is a pure function of (request, actor, action): it either
//! produces a [`FieldDiff`] for the caller to persist or a typed
//! [`Rejection`] that must leave the document untouched. The per-domain
//! transition tables live in [`next_status`]; everything the three domain
//! pages of the original product did with copy-pasted status strings goes
//! through this one table.

use crate::error::Rejection;
use crate::request::{DomainKind, Request, Role};
use crate::status::Status;

/// An actor identified well enough to role-gate an action.
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub role: Role,
    pub id: &'a str,
}

impl<'a> Actor<'a> {
    pub fn customer(id: &'a str) -> Self {
        Self { role: Role::Customer, id }
    }
    pub fn provider(id: &'a str) -> Self {
        Self { role: Role::Provider, id }
    }
}

/// A lifecycle action with its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Propose (or overwrite) a price while the request is open/quoted.
    Quote { price: u64 },
    /// Customer accepts the outstanding quote, assigning its provider.
    Accept,
    /// Delivery partner claims an order from the ready pool.
    SelfAssign,
    /// Assigned provider generates a handoff code on arrival/pickup.
    StartHandoff { code: String },
    /// Assigned provider submits the code read out by the customer.
    ConfirmHandoff { supplied: String },
    Complete,
    Cancel,
}

/// Action discriminant used by the transition tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Quote,
    Accept,
    SelfAssign,
    StartHandoff,
    ConfirmHandoff,
    Complete,
    Cancel,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Quote { .. } => ActionKind::Quote,
            Self::Accept => ActionKind::Accept,
            Self::SelfAssign => ActionKind::SelfAssign,
            Self::StartHandoff { .. } => ActionKind::StartHandoff,
            Self::ConfirmHandoff { .. } => ActionKind::ConfirmHandoff,
            Self::Complete => ActionKind::Complete,
            Self::Cancel => ActionKind::Cancel,
        }
    }
}

/// Handoff-code effect of a diff. `Keep` for actions that do not touch it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CodeChange {
    #[default]
    Keep,
    Set(String),
    Clear,
}

/// The field mutations a successful action produces. Applied atomically
/// to the single request document; there is no cross-document write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldDiff {
    pub status: Option<Status>,
    pub provider_id: Option<String>,
    pub quote: Option<(u64, String)>,
    pub code: CodeChange,
}

impl FieldDiff {
    fn with_status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// The per-domain transition tables. Returns `None` for any combination
/// not in the table.
pub fn next_status(
    domain: DomainKind,
    current: Status,
    role: Role,
    action: ActionKind,
) -> Option<Status> {
    use ActionKind::*;
    use DomainKind::*;
    use Role::*;
    use Status::*;

    match (domain, current, role, action) {
        // ride: open → quoted → assigned → handoff-pending → in-progress → completed
        (Ride, Open | Quoted, Provider, Quote) => Some(Quoted),
        (Ride, Quoted, Customer, Accept) => Some(Assigned),
        (Ride, Assigned, Provider, StartHandoff) => Some(HandoffPending),
        (Ride, HandoffPending, Provider, ConfirmHandoff) => Some(InProgress),
        (Ride, InProgress, Provider, Complete) => Some(Completed),
        (Ride, Open | Quoted, Customer, Cancel) => Some(Cancelled),

        // home-service: open → quoted → assigned → completed, no handoff gate
        (HomeService, Open | Quoted, Provider, Quote) => Some(Quoted),
        (HomeService, Quoted, Customer, Accept) => Some(Assigned),
        (HomeService, Assigned, Provider, Complete) => Some(Completed),
        (HomeService, Open | Quoted, Customer, Cancel) => Some(Cancelled),

        // delivery: ready → provider-assigned → handoff-pending → completed,
        // no quoting, no customer cancel in this window
        (Delivery, Ready, Provider, SelfAssign) => Some(ProviderAssigned),
        (Delivery, ProviderAssigned, Provider, StartHandoff) => Some(HandoffPending),
        (Delivery, HandoffPending, Provider, ConfirmHandoff) => Some(Completed),

        _ => None,
    }
}

/// Validate an action against the current document and produce the field
/// diff to persist. Rejections carry no diff and must not mutate anything.
pub fn apply(request: &Request, actor: Actor<'_>, action: &Action) -> Result<FieldDiff, Rejection> {
    if request.status.is_terminal() {
        return Err(Rejection::InvalidTransition);
    }

    // Preconditions the caller can tell apart from a plain illegal
    // transition: bad price, wrong caller, accept with nothing to accept.
    match action {
        Action::Quote { price } if *price == 0 => return Err(Rejection::InvalidPrice),
        Action::Accept => {
            if actor.role != Role::Customer || actor.id != request.customer_id {
                return Err(Rejection::NotOwningCustomer);
            }
            if request.proposed_by.is_none() {
                return Err(Rejection::MissingQuote);
            }
        }
        _ => {}
    }

    let next = next_status(request.domain(), request.status, actor.role, action.kind())
        .ok_or(Rejection::InvalidTransition)?;

    let mut diff = FieldDiff::with_status(next);
    match action {
        Action::Quote { price } => {
            // Last writer wins: any provider may overwrite the outstanding
            // quote until the customer accepts one.
            diff.quote = Some((*price, actor.id.to_owned()));
        }
        Action::Accept => {
            // Assignment reflects whichever quote is present at write time.
            diff.provider_id = request.proposed_by.clone();
        }
        Action::SelfAssign => {
            if request.provider_id.is_some() {
                return Err(Rejection::InvalidTransition);
            }
            diff.provider_id = Some(actor.id.to_owned());
        }
        Action::StartHandoff { code } => {
            require_assigned(request, actor.id)?;
            diff.code = CodeChange::Set(code.clone());
        }
        Action::ConfirmHandoff { supplied } => {
            require_assigned(request, actor.id)?;
            // Opaque string comparison: no normalization, no expiry, no
            // attempt limit. The code is a shared confirmation between two
            // co-located parties, not a security boundary.
            if request.handoff_code.as_deref() != Some(supplied.as_str()) {
                return Err(Rejection::CodeMismatch);
            }
            diff.code = CodeChange::Clear;
        }
        Action::Complete => require_assigned(request, actor.id)?,
        Action::Cancel => {
            if actor.id != request.customer_id {
                return Err(Rejection::NotOwningCustomer);
            }
        }
    }

    Ok(diff)
}

fn require_assigned(request: &Request, actor_id: &str) -> Result<(), Rejection> {
    if request.provider_id.as_deref() == Some(actor_id) {
        Ok(())
    } else {
        Err(Rejection::NotAssignedProvider)
    }
}
