//! The generic request entity shared by rides, home-service jobs and
//! delivery orders, plus the per-domain payload union.

use crate::machine::{CodeChange, FieldDiff};
use crate::status::Status;
use chrono::{DateTime, TimeZone, Utc};

/// Who is acting on a request. "Provider" is the role-neutral term for
/// driver, worker or delivery partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Provider,
}

/// The three instantiations of the lifecycle protocol. Each maps to one
/// physical collection in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    Ride,
    HomeService,
    Delivery,
}

impl DomainKind {
    /// Key prefix of the physical collection holding this domain.
    pub fn collection_prefix(self) -> &'static str {
        match self {
            Self::Ride => "ride/",
            Self::HomeService => "job/",
            Self::Delivery => "order/",
        }
    }

    /// Status a freshly created request starts in. Delivery orders enter
    /// the protocol at `ready`; the pre-ready window belongs to the
    /// upstream fulfiller and is not modeled here.
    pub fn initial_status(self) -> Status {
        match self {
            Self::Ride | Self::HomeService => Status::Open,
            Self::Delivery => Status::Ready,
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .into()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

/// Domain-specific fields. Field names follow the persisted records the
/// UI layer consumes.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum DomainPayload {
    #[n(0)]
    Ride {
        #[n(0)]
        pickup_location: String,
        #[n(1)]
        drop_location: String,
        #[n(2)]
        scheduled_time: Option<TimeStamp<Utc>>,
        #[n(3)]
        notes: String,
    },
    #[n(1)]
    HomeService {
        #[n(0)]
        category: String,
        #[n(1)]
        description: String,
        #[n(2)]
        scheduled_time: Option<TimeStamp<Utc>>,
    },
    #[n(2)]
    Delivery {
        #[n(0)]
        shop_id: String,
        #[n(1)]
        product_id: String,
        #[n(2)]
        quantity: u32,
    },
}

impl DomainPayload {
    pub fn domain(&self) -> DomainKind {
        match self {
            Self::Ride { .. } => DomainKind::Ride,
            Self::HomeService { .. } => DomainKind::HomeService,
            Self::Delivery { .. } => DomainKind::Delivery,
        }
    }
}

/// A request in any domain. `id` is assigned by the store on creation;
/// `customer_id` is fixed for the lifetime of the document; everything
/// else mutates only through [`crate::machine`] field diffs.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Request {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub customer_id: String,
    /// Set exactly once: on quote acceptance (ride, home-service) or on
    /// self-assignment from the pool (delivery).
    #[n(2)]
    pub provider_id: Option<String>,
    #[n(3)]
    pub status: Status,
    /// The single outstanding quote. Overwritten, never accumulated.
    #[n(4)]
    pub proposed_price: Option<u64>,
    #[n(5)]
    pub proposed_by: Option<String>,
    /// Short numeric code present only while a handoff awaits verification.
    #[n(6)]
    pub handoff_code: Option<String>,
    /// Address snapshot taken at creation time. A later profile change
    /// does not retroactively change open requests.
    #[n(7)]
    pub address: Option<String>,
    #[n(8)]
    pub payload: DomainPayload,
    /// Used only for ordering, never for business logic.
    #[n(9)]
    pub created_at: TimeStamp<Utc>,
}

impl Request {
    pub fn domain(&self) -> DomainKind {
        self.payload.domain()
    }

    /// Apply a field diff produced by the state machine. The diff is the
    /// only mutation path; rejected actions never produce one.
    pub fn apply_diff(&mut self, diff: FieldDiff) {
        if let Some(status) = diff.status {
            self.status = status;
        }
        if let Some(provider) = diff.provider_id {
            self.provider_id = Some(provider);
        }
        if let Some((price, by)) = diff.quote {
            self.proposed_price = Some(price);
            self.proposed_by = Some(by);
        }
        match diff.code {
            CodeChange::Keep => {}
            CodeChange::Set(code) => self.handoff_code = Some(code),
            CodeChange::Clear => self.handoff_code = None,
        }
    }

    /// The document-level invariants from the data model. Checked by the
    /// property tests after every applied or rejected action.
    pub fn invariants_hold(&self) -> bool {
        let assignment = self.provider_id.is_none() || self.status.provider_assigned();
        let quote_pair = self.proposed_price.is_some() == self.proposed_by.is_some();
        let code = self.handoff_code.is_none() || self.status == Status::HandoffPending;
        assignment && quote_pair && code
    }
}

/// Profile snapshot kept in the `user/` collection. Only the fields the
/// visibility filter gates on.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct UserProfile {
    #[n(0)]
    pub name: String,
    #[n(1)]
    pub phone: String,
    #[n(2)]
    pub address: String,
}
