//! Role- and status-gated redaction of request fields.
//!
//! Phone numbers and counterparty names stay hidden until a provider is
//! assigned, and are then shown only to the two parties on the request.
//! A provider still competing for an open request never sees them.

use crate::request::{DomainKind, DomainPayload, Request, Role, UserProfile};
use crate::status::Status;

/// Who is looking at the request.
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub role: Role,
    pub id: &'a str,
}

/// What a given viewer is allowed to see of a request. `None` fields were
/// withheld, not absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestView {
    pub id: String,
    pub status: Status,
    pub payload: DomainPayload,
    pub proposed_price: Option<u64>,
    pub address: Option<String>,
    /// Shown to the customer only; the provider generated it and must ask
    /// the customer to read it back.
    pub handoff_code: Option<String>,
    pub counterparty_name: Option<String>,
    pub counterparty_phone: Option<String>,
}

/// Redact `request` for `viewer`. `counterparty` is the profile of the
/// party opposite the viewer, when the caller has one loaded.
pub fn visible_fields(
    request: &Request,
    viewer: Viewer<'_>,
    counterparty: Option<&UserProfile>,
) -> RequestView {
    let is_customer = viewer.role == Role::Customer && viewer.id == request.customer_id;
    let is_assigned_provider =
        viewer.role == Role::Provider && request.provider_id.as_deref() == Some(viewer.id);
    let is_party = is_customer || is_assigned_provider;

    let contact_visible = is_party && request.status.provider_assigned();

    let address = if address_visible(request, viewer, is_customer, is_assigned_provider) {
        request.address.clone()
    } else {
        None
    };

    RequestView {
        id: request.id.clone(),
        status: request.status,
        payload: request.payload.clone(),
        proposed_price: request.proposed_price,
        address,
        handoff_code: if is_customer {
            request.handoff_code.clone()
        } else {
            None
        },
        counterparty_name: counterparty
            .filter(|_| contact_visible)
            .map(|p| p.name.clone()),
        counterparty_phone: counterparty
            .filter(|_| contact_visible)
            .map(|p| p.phone.clone()),
    }
}

// Address snapshot rules per domain: the customer always sees their own
// address; a provider sees it only once eligible to fulfil. Ride carries
// its locations in the payload (they are the quote basis), so the generic
// address field stays provider-hidden there.
fn address_visible(
    request: &Request,
    viewer: Viewer<'_>,
    is_customer: bool,
    is_assigned_provider: bool,
) -> bool {
    if is_customer {
        return true;
    }
    if viewer.role != Role::Provider {
        return false;
    }
    match request.domain() {
        DomainKind::Ride => false,
        DomainKind::HomeService => is_assigned_provider,
        // partners browse the ready pool address-first
        DomainKind::Delivery => request.status == Status::Ready || is_assigned_provider,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{DomainPayload, TimeStamp};

    fn profile() -> UserProfile {
        UserProfile {
            name: "Asha".into(),
            phone: "98765".into(),
            address: "12 Lake Road".into(),
        }
    }

    fn quoted_job() -> Request {
        Request {
            id: "req1job".into(),
            customer_id: "cust1".into(),
            provider_id: None,
            status: Status::Quoted,
            proposed_price: Some(500),
            proposed_by: Some("wrk1".into()),
            handoff_code: None,
            address: Some("12 Lake Road".into()),
            payload: DomainPayload::HomeService {
                category: "Plumber".into(),
                description: "tap is leaking".into(),
                scheduled_time: None,
            },
            created_at: TimeStamp::new(),
        }
    }

    #[test]
    fn competing_provider_sees_no_contact_or_address() {
        let request = quoted_job();
        let view = visible_fields(
            &request,
            Viewer { role: Role::Provider, id: "wrk2" },
            Some(&profile()),
        );
        assert_eq!(view.counterparty_phone, None);
        assert_eq!(view.counterparty_name, None);
        assert_eq!(view.address, None);
        // the work description is the quote basis and stays visible
        assert_eq!(view.proposed_price, Some(500));
    }

    #[test]
    fn assigned_worker_sees_contact_and_address() {
        let mut request = quoted_job();
        request.status = Status::Assigned;
        request.provider_id = Some("wrk1".into());

        let view = visible_fields(
            &request,
            Viewer { role: Role::Provider, id: "wrk1" },
            Some(&profile()),
        );
        assert_eq!(view.counterparty_phone.as_deref(), Some("98765"));
        assert_eq!(view.counterparty_name.as_deref(), Some("Asha"));
        assert_eq!(view.address.as_deref(), Some("12 Lake Road"));
    }

    #[test]
    fn quoter_without_acceptance_is_still_withheld() {
        // wrk1 quoted but was never accepted: still not a party
        let request = quoted_job();
        let view = visible_fields(
            &request,
            Viewer { role: Role::Provider, id: "wrk1" },
            Some(&profile()),
        );
        assert_eq!(view.counterparty_phone, None);
    }

    #[test]
    fn handoff_code_goes_to_the_customer_only() {
        let request = Request {
            id: "req1ride".into(),
            customer_id: "cust1".into(),
            provider_id: Some("drv1".into()),
            status: Status::HandoffPending,
            proposed_price: Some(120),
            proposed_by: Some("drv1".into()),
            handoff_code: Some("4321".into()),
            address: None,
            payload: DomainPayload::Ride {
                pickup_location: "A".into(),
                drop_location: "B".into(),
                scheduled_time: None,
                notes: String::new(),
            },
            created_at: TimeStamp::new(),
        };

        let customer_view = visible_fields(
            &request,
            Viewer { role: Role::Customer, id: "cust1" },
            None,
        );
        assert_eq!(customer_view.handoff_code.as_deref(), Some("4321"));

        let provider_view = visible_fields(
            &request,
            Viewer { role: Role::Provider, id: "drv1" },
            Some(&profile()),
        );
        assert_eq!(provider_view.handoff_code, None);
    }

    #[test]
    fn delivery_pool_shows_the_drop_address() {
        let request = Request {
            id: "req1order".into(),
            customer_id: "cust1".into(),
            provider_id: None,
            status: Status::Ready,
            proposed_price: None,
            proposed_by: None,
            handoff_code: None,
            address: Some("4 Hill Street".into()),
            payload: DomainPayload::Delivery {
                shop_id: "shop1".into(),
                product_id: "prod1".into(),
                quantity: 1,
            },
            created_at: TimeStamp::new(),
        };

        let view = visible_fields(
            &request,
            Viewer { role: Role::Provider, id: "dp1" },
            Some(&profile()),
        );
        assert_eq!(view.address.as_deref(), Some("4 Hill Street"));
        // but not the phone, this partner has not claimed the order
        assert_eq!(view.counterparty_phone, None);
    }
}
