//! Domain adapters: per-domain detail builders that finalise into the
//! generic [`Request`] shape. Each domain's transition rows live in
//! [`crate::machine::next_status`]; these builders are the creation half
//! of the adapter.

use crate::error::ValidationError;
use crate::request::{DomainPayload, Request, TimeStamp};
use chrono::Utc;

fn new_request(
    customer_id: &str,
    address: Option<String>,
    payload: DomainPayload,
) -> Request {
    Request {
        // the store mints the id on create
        id: String::new(),
        customer_id: customer_id.to_owned(),
        provider_id: None,
        status: payload.domain().initial_status(),
        proposed_price: None,
        proposed_by: None,
        handoff_code: None,
        address,
        payload,
        created_at: TimeStamp::new(),
    }
}

/// Draft of a ride booking. Pickup and drop are required.
#[derive(Debug, Default)]
pub struct RideDetails {
    pickup_location: Option<String>,
    drop_location: Option<String>,
    scheduled_time: Option<TimeStamp<Utc>>,
    notes: String,
}

impl RideDetails {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn pickup(mut self, location: &str) -> Self {
        self.pickup_location = Some(location.to_owned());
        self
    }
    pub fn drop_off(mut self, location: &str) -> Self {
        self.drop_location = Some(location.to_owned());
        self
    }
    pub fn scheduled_at(mut self, time: TimeStamp<Utc>) -> Self {
        self.scheduled_time = Some(time);
        self
    }
    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_owned();
        self
    }

    pub fn finalise(self, customer_id: &str) -> Result<Request, ValidationError> {
        let pickup_location = self
            .pickup_location
            .ok_or(ValidationError::Missing("pickup_location"))?;
        let drop_location = self
            .drop_location
            .ok_or(ValidationError::Missing("drop_location"))?;

        Ok(new_request(
            customer_id,
            None,
            DomainPayload::Ride {
                pickup_location,
                drop_location,
                scheduled_time: self.scheduled_time,
                notes: self.notes,
            },
        ))
    }
}

/// Draft of a home-service job. The address is snapshotted from the
/// customer's profile or request-time input; it never tracks later
/// profile edits.
#[derive(Debug, Default)]
pub struct ServiceJobDetails {
    category: Option<String>,
    description: Option<String>,
    address: Option<String>,
    scheduled_time: Option<TimeStamp<Utc>>,
}

impl ServiceJobDetails {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
    pub fn address(mut self, address: &str) -> Self {
        self.address = Some(address.to_owned());
        self
    }
    pub fn scheduled_at(mut self, time: TimeStamp<Utc>) -> Self {
        self.scheduled_time = Some(time);
        self
    }

    pub fn finalise(self, customer_id: &str) -> Result<Request, ValidationError> {
        let category = self.category.ok_or(ValidationError::Missing("category"))?;
        let description = self
            .description
            .ok_or(ValidationError::Missing("description"))?;
        let address = self.address.ok_or(ValidationError::Missing("address"))?;

        Ok(new_request(
            customer_id,
            Some(address),
            DomainPayload::HomeService {
                category,
                description,
                scheduled_time: self.scheduled_time,
            },
        ))
    }
}

/// Draft of a delivery order entering the fulfillment protocol at `ready`.
/// The pre-ready window (shop acceptance, preparation) belongs to the
/// upstream fulfiller.
#[derive(Debug, Default)]
pub struct DeliveryDetails {
    shop_id: Option<String>,
    product_id: Option<String>,
    quantity: u32,
    address: Option<String>,
}

impl DeliveryDetails {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn shop(mut self, shop_id: &str) -> Self {
        self.shop_id = Some(shop_id.to_owned());
        self
    }
    pub fn product(mut self, product_id: &str) -> Self {
        self.product_id = Some(product_id.to_owned());
        self
    }
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
    pub fn address(mut self, address: &str) -> Self {
        self.address = Some(address.to_owned());
        self
    }

    pub fn finalise(self, customer_id: &str) -> Result<Request, ValidationError> {
        let shop_id = self.shop_id.ok_or(ValidationError::Missing("shop_id"))?;
        let product_id = self
            .product_id
            .ok_or(ValidationError::Missing("product_id"))?;
        let address = self.address.ok_or(ValidationError::Missing("address"))?;
        if self.quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }

        Ok(new_request(
            customer_id,
            Some(address),
            DomainPayload::Delivery {
                shop_id,
                product_id,
                quantity: self.quantity,
            },
        ))
    }
}
