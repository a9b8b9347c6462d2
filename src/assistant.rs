//! Client for the conversational intent classifier.
//!
//! The classifier is an external HTTP service: it turns free text into an
//! intent plus slots, asking follow-up questions until the required slots
//! are filled. This module only consumes it; once a classification is
//! complete, [`dispatch`] invokes the matching domain adapter as the
//! terminal action.

use crate::domain::{RideDetails, ServiceJobDetails};
use crate::error::{AssistantError, ServiceError};
use crate::request::{Request, TimeStamp};
use crate::service::RequestService;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ClassifyBody<'a> {
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct ContinueBody<'a> {
    message: &'a str,
    intent: &'a str,
    previous_slots: &'a Map<String, Value>,
}

/// One classifier turn: the detected intent, the slots gathered so far,
/// and what is still missing.
#[derive(Debug, Clone, Deserialize)]
pub struct Classification {
    pub intent: String,
    #[serde(default)]
    pub slots: Map<String, Value>,
    #[serde(default)]
    pub missing_slots: Vec<String>,
    #[serde(default)]
    pub followup_question: Option<String>,
}

impl Classification {
    /// All required slots filled; ready for the terminal action.
    pub fn is_complete(&self) -> bool {
        self.missing_slots.is_empty()
    }

    fn slot_str(&self, key: &str) -> Option<&str> {
        self.slots.get(key).and_then(Value::as_str)
    }
}

pub struct NluClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl NluClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// First turn of a conversation.
    pub fn classify(&self, message: &str) -> Result<Classification, AssistantError> {
        let body = ClassifyBody { message };
        let response = self
            .http
            .post(format!("{}/nlu", self.base_url))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response)
    }

    /// Follow-up turn: the intent is already known, new slots are merged
    /// with the previous ones server-side.
    pub fn continue_with(
        &self,
        message: &str,
        intent: &str,
        previous_slots: &Map<String, Value>,
    ) -> Result<Classification, AssistantError> {
        let body = ContinueBody {
            message,
            intent,
            previous_slots,
        };
        let response = self
            .http
            .post(format!("{}/nlu/continue", self.base_url))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response)
    }
}

/// Terminal action for a complete classification: create the request the
/// intent describes. Returns `Ok(None)` for incomplete classifications
/// and for intents with no lifecycle counterpart (smalltalk, catalog
/// orders that need product resolution, medical/housing flows).
pub fn dispatch(
    service: &RequestService,
    customer_id: &str,
    message: &str,
    classification: &Classification,
) -> Result<Option<Request>, ServiceError> {
    if !classification.is_complete() {
        return Ok(None);
    }

    match classification.intent.as_str() {
        "book_cab" => {
            let Some(origin) = classification.slot_str("origin") else {
                return Ok(None);
            };
            let Some(destination) = classification.slot_str("destination") else {
                return Ok(None);
            };
            let mut details = RideDetails::new().pickup(origin).drop_off(destination);
            if let Some(time) = parse_datetime_slot(classification) {
                details = details.scheduled_at(time);
            }
            service.book_ride(customer_id, details).map(Some)
        }
        "home_service" => {
            let category = classification.slot_str("service_category").unwrap_or("Other");
            // the customer's own words are the job description
            let mut details = ServiceJobDetails::new()
                .category(category)
                .description(message);
            match service.store().get_profile(customer_id)? {
                Some(profile) => details = details.address(&profile.address),
                None => return Ok(None),
            }
            if let Some(time) = parse_datetime_slot(classification) {
                details = details.scheduled_at(time);
            }
            service.request_home_service(customer_id, details).map(Some)
        }
        other => {
            debug!(intent = %other, "no lifecycle action for intent");
            Ok(None)
        }
    }
}

fn parse_datetime_slot(classification: &Classification) -> Option<TimeStamp<Utc>> {
    let iso = classification.slot_str("datetime_iso")?;
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).into())
}
