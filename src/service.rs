//! Service layer API for request lifecycle operations.
//!
//! Every mutation follows the same shape: load the current document,
//! run the pure state-machine op, persist the resulting field diff.
//! Rejections surface as typed errors and leave the store untouched.

use crate::domain::{DeliveryDetails, RideDetails, ServiceJobDetails};
use crate::error::ServiceError;
use crate::machine::{self, Action, Actor, FieldDiff};
use crate::request::{DomainKind, Request, Role, UserProfile};
use crate::store::RequestStore;
use crate::visibility::{self, RequestView, Viewer};
use crate::{handoff, quote};
use tracing::{debug, info, warn};

pub struct RequestService {
    store: RequestStore,
}

impl RequestService {
    pub fn new(store: RequestStore) -> Self {
        Self { store }
    }

    /// Direct store access, for subscriptions and list views.
    pub fn store(&self) -> &RequestStore {
        &self.store
    }

    pub fn save_profile(&self, user_id: &str, profile: &UserProfile) -> Result<(), ServiceError> {
        self.store.put_profile(user_id, profile)?;
        Ok(())
    }

    /// Create a ride request in the open pool.
    pub fn book_ride(
        &self,
        customer_id: &str,
        details: RideDetails,
    ) -> Result<Request, ServiceError> {
        let mut request = details.finalise(customer_id)?;
        let id = self.store.create(&mut request)?;
        info!(request = %id, customer = %customer_id, "ride request created");
        Ok(request)
    }

    /// Create a home-service job in the open pool.
    pub fn request_home_service(
        &self,
        customer_id: &str,
        details: ServiceJobDetails,
    ) -> Result<Request, ServiceError> {
        let mut request = details.finalise(customer_id)?;
        let id = self.store.create(&mut request)?;
        info!(request = %id, customer = %customer_id, "home-service request created");
        Ok(request)
    }

    /// Create a delivery order in the ready pool.
    pub fn place_delivery_order(
        &self,
        customer_id: &str,
        details: DeliveryDetails,
    ) -> Result<Request, ServiceError> {
        let mut request = details.finalise(customer_id)?;
        let id = self.store.create(&mut request)?;
        info!(request = %id, customer = %customer_id, "delivery order created");
        Ok(request)
    }

    /// Submit or update a provider's price proposal. Last writer wins.
    pub fn submit_quote(
        &self,
        domain: DomainKind,
        id: &str,
        provider_id: &str,
        price: u64,
    ) -> Result<Request, ServiceError> {
        self.mutate(domain, id, |request| {
            let diff = quote::submit(request, provider_id, price)?;
            info!(request = %id, provider = %provider_id, price, "quote submitted");
            Ok(diff)
        })
    }

    /// Accept the outstanding quote, assigning its provider.
    pub fn accept_quote(
        &self,
        domain: DomainKind,
        id: &str,
        customer_id: &str,
    ) -> Result<Request, ServiceError> {
        self.mutate(domain, id, |request| {
            let diff = quote::accept(request, customer_id)?;
            info!(
                request = %id,
                provider = diff.provider_id.as_deref().unwrap_or(""),
                "quote accepted"
            );
            Ok(diff)
        })
    }

    /// Customer cancels while still in the provider-selection window.
    pub fn cancel(
        &self,
        domain: DomainKind,
        id: &str,
        customer_id: &str,
    ) -> Result<Request, ServiceError> {
        self.mutate(domain, id, |request| {
            let diff = machine::apply(request, Actor::customer(customer_id), &Action::Cancel)?;
            info!(request = %id, "request cancelled");
            Ok(diff)
        })
    }

    /// Delivery partner claims an order from the ready pool.
    pub fn claim_delivery(&self, id: &str, provider_id: &str) -> Result<Request, ServiceError> {
        self.mutate(DomainKind::Delivery, id, |request| {
            let diff = machine::apply(request, Actor::provider(provider_id), &Action::SelfAssign)?;
            info!(request = %id, partner = %provider_id, "delivery claimed");
            Ok(diff)
        })
    }

    /// Assigned provider declares arrival/pickup and generates the
    /// handoff code. The customer reads the code off their own view.
    pub fn start_handoff(
        &self,
        domain: DomainKind,
        id: &str,
        provider_id: &str,
    ) -> Result<Request, ServiceError> {
        self.mutate(domain, id, |request| {
            let (diff, _code) = handoff::start(request, provider_id)?;
            info!(request = %id, "handoff code generated");
            Ok(diff)
        })
    }

    /// Verify the code the customer read out and advance the request.
    pub fn confirm_handoff(
        &self,
        domain: DomainKind,
        id: &str,
        provider_id: &str,
        supplied_code: &str,
    ) -> Result<Request, ServiceError> {
        // The comparison must run against the current document, never a
        // cached snapshot, or a just-regenerated code would never match.
        self.mutate(domain, id, |request| {
            let diff = handoff::verify(request, provider_id, supplied_code)?;
            info!(request = %id, "handoff confirmed");
            Ok(diff)
        })
    }

    /// Assigned provider marks the job done (ride end, service completion).
    pub fn complete(
        &self,
        domain: DomainKind,
        id: &str,
        provider_id: &str,
    ) -> Result<Request, ServiceError> {
        self.mutate(domain, id, |request| {
            let diff = machine::apply(request, Actor::provider(provider_id), &Action::Complete)?;
            info!(request = %id, "request completed");
            Ok(diff)
        })
    }

    /// Read a request through the visibility filter. The counterparty
    /// profile, when one is on the request, is loaded so the filter can
    /// decide whether to reveal name and phone.
    pub fn view(
        &self,
        domain: DomainKind,
        id: &str,
        viewer: Viewer<'_>,
    ) -> Result<RequestView, ServiceError> {
        let request = self.store.get(domain, id)?;
        let counterparty_id = match viewer.role {
            Role::Customer => request.provider_id.as_deref(),
            Role::Provider => Some(request.customer_id.as_str()),
        };
        let counterparty = match counterparty_id {
            Some(user_id) => self.store.get_profile(user_id)?,
            None => None,
        };
        debug!(request = %id, viewer = %viewer.id, "request viewed");
        Ok(visibility::visible_fields(
            &request,
            viewer,
            counterparty.as_ref(),
        ))
    }

    // Load, apply, save. The closure returns the field diff or a typed
    // rejection; nothing is written on rejection.
    fn mutate(
        &self,
        domain: DomainKind,
        id: &str,
        op: impl FnOnce(&Request) -> Result<FieldDiff, ServiceError>,
    ) -> Result<Request, ServiceError> {
        let mut request = self.store.get(domain, id)?;
        let diff = op(&request).inspect_err(|e| {
            warn!(request = %id, status = %request.status, error = %e, "action rejected");
        })?;
        request.apply_diff(diff);
        self.store.put(&request)?;
        Ok(request)
    }
}
