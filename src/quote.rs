//! Quote negotiation over an open request.
//!
//! There is exactly one outstanding `(proposed_price, proposed_by)` pair
//! per request; a new quote from any provider overwrites it. The customer
//! accepts whichever pair is present at write time, which may differ from
//! the pair they last saw.

use crate::error::Rejection;
use crate::machine::{self, Action, Actor, FieldDiff};
use crate::request::Request;

/// Submit or update a price proposal. Valid while the request is in the
/// provider-selection window; `price` must be positive.
pub fn submit(request: &Request, provider_id: &str, price: u64) -> Result<FieldDiff, Rejection> {
    machine::apply(
        request,
        Actor::provider(provider_id),
        &Action::Quote { price },
    )
}

/// Resolve the outstanding quote into a provider assignment. Only the
/// owning customer; only while a quote is outstanding.
pub fn accept(request: &Request, customer_id: &str) -> Result<FieldDiff, Rejection> {
    machine::apply(request, Actor::customer(customer_id), &Action::Accept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{DomainPayload, TimeStamp};
    use crate::status::Status;

    fn open_job() -> Request {
        Request {
            id: "req1job".into(),
            customer_id: "cust1".into(),
            provider_id: None,
            status: Status::Open,
            proposed_price: None,
            proposed_by: None,
            handoff_code: None,
            address: Some("12 Lake Road".into()),
            payload: DomainPayload::HomeService {
                category: "Electrician".into(),
                description: "fan not working".into(),
                scheduled_time: None,
            },
            created_at: TimeStamp::new(),
        }
    }

    #[test]
    fn later_quote_overwrites_earlier_one() {
        let mut request = open_job();

        let diff = submit(&request, "wrk1", 500).unwrap();
        request.apply_diff(diff);
        assert_eq!(request.proposed_by.as_deref(), Some("wrk1"));

        let diff = submit(&request, "wrk2", 450).unwrap();
        request.apply_diff(diff);

        // one pair, last writer wins
        assert_eq!(request.proposed_price, Some(450));
        assert_eq!(request.proposed_by.as_deref(), Some("wrk2"));
        assert_eq!(request.status, Status::Quoted);
    }

    #[test]
    fn accept_takes_the_pair_present_at_write_time() {
        let mut request = open_job();
        request.apply_diff(submit(&request, "wrk1", 500).unwrap());
        request.apply_diff(submit(&request, "wrk2", 450).unwrap());

        let diff = accept(&request, "cust1").unwrap();
        request.apply_diff(diff);

        assert_eq!(request.provider_id.as_deref(), Some("wrk2"));
        assert_eq!(request.status, Status::Assigned);
        assert!(request.invariants_hold());
    }

    #[test]
    fn rejected_accept_is_a_no_op() {
        let mut request = open_job();
        let before = request.clone();

        let err = accept(&request, "cust1").unwrap_err();
        assert_eq!(err, Rejection::MissingQuote);

        // no diff was produced, the document is bit-for-bit unchanged
        request.apply_diff(FieldDiff::default());
        assert_eq!(request, before);
    }

    #[test]
    fn quoting_stops_once_assigned() {
        let mut request = open_job();
        request.apply_diff(submit(&request, "wrk1", 500).unwrap());
        request.apply_diff(accept(&request, "cust1").unwrap());

        let err = submit(&request, "wrk2", 100).unwrap_err();
        assert_eq!(err, Rejection::InvalidTransition);
    }
}
