//! One-time code verification for the physical handoff step.
//!
//! The code is a 4-digit shared secret between two co-located parties
//! (rider and driver, customer and delivery partner). It deliberately has
//! no expiry and no attempt limit; it confirms a meeting, it does not
//! resist an adversary.

use crate::error::Rejection;
use crate::machine::{self, Action, Actor, FieldDiff};
use crate::request::Request;
use rand::Rng;

/// Width of the generated code, in decimal digits.
pub const CODE_DIGITS: usize = 4;

/// A fresh 4-digit code, 1000..=9999.
pub fn generate_code() -> String {
    rand::rng().random_range(1000..10000).to_string()
}

/// Assigned provider declares arrival/pickup: generates a code, stores it
/// on the request and moves it to the handoff-pending state. The customer
/// reads the code off their own view of the request.
pub fn start(request: &Request, provider_id: &str) -> Result<(FieldDiff, String), Rejection> {
    let code = generate_code();
    let diff = machine::apply(
        request,
        Actor::provider(provider_id),
        &Action::StartHandoff { code: code.clone() },
    )?;
    Ok((diff, code))
}

/// Compare the supplied code against the stored one and advance on match.
/// On mismatch the request is unchanged and the caller may retry.
pub fn verify(request: &Request, provider_id: &str, supplied: &str) -> Result<FieldDiff, Rejection> {
    machine::apply(
        request,
        Actor::provider(provider_id),
        &Action::ConfirmHandoff {
            supplied: supplied.to_owned(),
        },
    )
}
