//! Property-based tests for the request lifecycle state machine.
//!
//! These drive random action sequences through the pure machine and check
//! the document-level invariants after every step: rejected actions are
//! exact no-ops, an assigned provider implies an assigned-or-later
//! status, and terminal states accept nothing further.

use proptest::prelude::*;
use secondsons_requests::machine::{self, Action, Actor};
use secondsons_requests::request::{DomainKind, DomainPayload, Request, Role, TimeStamp};
use secondsons_requests::status::Status;

const CUSTOMER: &str = "cust1";
const PROVIDERS: [&str; 3] = ["prov1", "prov2", "prov3"];

fn fresh_request(domain: DomainKind) -> Request {
    let payload = match domain {
        DomainKind::Ride => DomainPayload::Ride {
            pickup_location: "A".into(),
            drop_location: "B".into(),
            scheduled_time: None,
            notes: String::new(),
        },
        DomainKind::HomeService => DomainPayload::HomeService {
            category: "Electrician".into(),
            description: "fan not working".into(),
            scheduled_time: None,
        },
        DomainKind::Delivery => DomainPayload::Delivery {
            shop_id: "shop1".into(),
            product_id: "prod1".into(),
            quantity: 1,
        },
    };
    Request {
        id: "req1prop".into(),
        customer_id: CUSTOMER.into(),
        provider_id: None,
        status: domain.initial_status(),
        proposed_price: None,
        proposed_by: None,
        handoff_code: None,
        address: Some("12 Lake Road".into()),
        payload,
        created_at: TimeStamp::new(),
    }
}

/// One randomly chosen step: who acts and what they try.
#[derive(Debug, Clone)]
struct Step {
    role: Role,
    actor_index: usize,
    action: StepAction,
}

#[derive(Debug, Clone)]
enum StepAction {
    Quote(u64),
    Accept,
    SelfAssign,
    StartHandoff(String),
    /// `true` means supply the currently stored code, whatever it is.
    ConfirmHandoff(bool, String),
    Complete,
    Cancel,
}

fn domain_strategy() -> impl Strategy<Value = DomainKind> {
    prop_oneof![
        Just(DomainKind::Ride),
        Just(DomainKind::HomeService),
        Just(DomainKind::Delivery),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    let action = prop_oneof![
        (0u64..2000).prop_map(StepAction::Quote),
        Just(StepAction::Accept),
        Just(StepAction::SelfAssign),
        "[0-9]{4}".prop_map(StepAction::StartHandoff),
        (prop::bool::ANY, "[0-9]{4}")
            .prop_map(|(correct, guess)| StepAction::ConfirmHandoff(correct, guess)),
        Just(StepAction::Complete),
        Just(StepAction::Cancel),
    ];
    (prop::bool::ANY, 0usize..PROVIDERS.len(), action).prop_map(|(customer, idx, action)| Step {
        role: if customer { Role::Customer } else { Role::Provider },
        actor_index: idx,
        action,
    })
}

fn run_step(request: &mut Request, step: &Step) -> bool {
    let actor_id = match step.role {
        Role::Customer => CUSTOMER,
        Role::Provider => PROVIDERS[step.actor_index],
    };
    let actor = Actor {
        role: step.role,
        id: actor_id,
    };
    let action = match &step.action {
        StepAction::Quote(price) => Action::Quote { price: *price },
        StepAction::Accept => Action::Accept,
        StepAction::SelfAssign => Action::SelfAssign,
        StepAction::StartHandoff(code) => Action::StartHandoff { code: code.clone() },
        StepAction::ConfirmHandoff(correct, guess) => {
            let supplied = if *correct {
                request.handoff_code.clone().unwrap_or_else(|| guess.clone())
            } else {
                guess.clone()
            };
            Action::ConfirmHandoff { supplied }
        }
        StepAction::Complete => Action::Complete,
        StepAction::Cancel => Action::Cancel,
    };

    match machine::apply(request, actor, &action) {
        Ok(diff) => {
            request.apply_diff(diff);
            true
        }
        Err(_) => false,
    }
}

proptest! {
    /// Invariants hold after every applied step, and every rejected step
    /// leaves the document bit-for-bit unchanged.
    #[test]
    fn random_sequences_preserve_invariants(
        domain in domain_strategy(),
        steps in prop::collection::vec(step_strategy(), 0..25),
    ) {
        let mut request = fresh_request(domain);

        for step in &steps {
            let before = request.clone();
            let applied = run_step(&mut request, step);

            if !applied {
                prop_assert_eq!(&request, &before, "rejection must be a no-op");
            }
            prop_assert!(
                request.invariants_hold(),
                "invariants violated after {:?}: {:?}",
                step,
                request
            );
        }
    }

    /// Once terminal, nothing ever applies again.
    #[test]
    fn terminal_states_are_absorbing(
        domain in domain_strategy(),
        steps in prop::collection::vec(step_strategy(), 0..40),
    ) {
        let mut request = fresh_request(domain);
        let mut terminal_since = None;

        for (i, step) in steps.iter().enumerate() {
            let applied = run_step(&mut request, step);
            if terminal_since.is_some() {
                prop_assert!(!applied, "action applied after terminal at step {}", i);
            }
            if request.status.is_terminal() && terminal_since.is_none() {
                terminal_since = Some(i);
            }
        }
    }

    /// A provider id, once set, never changes: assignment happens exactly
    /// once per request.
    #[test]
    fn provider_assignment_is_write_once(
        domain in domain_strategy(),
        steps in prop::collection::vec(step_strategy(), 0..40),
    ) {
        let mut request = fresh_request(domain);
        let mut assigned: Option<String> = None;

        for step in &steps {
            run_step(&mut request, step);
            match (&assigned, &request.provider_id) {
                (None, Some(p)) => assigned = Some(p.clone()),
                (Some(expected), current) => {
                    prop_assert_eq!(Some(expected), current.as_ref());
                }
                (None, None) => {}
            }
        }
    }
}
