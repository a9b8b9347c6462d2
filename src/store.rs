//! Request store adapter over sled.
//!
//! Three physical collections (key prefixes `ride/`, `job/`, `order/`)
//! hold minicbor-encoded [`Request`] documents; `user/` holds profile
//! snapshots. Every write replaces the whole document: per-document
//! last-write-wins, nothing transactional across documents. Change
//! notification rides on `sled::Db::watch_prefix`, wrapped as explicit
//! [`Subscription`] handles that tear down when dropped.

use crate::error::StoreError;
use crate::ids;
use crate::request::{DomainKind, Request, Role, UserProfile};
use crate::status::Status;
use std::path::Path;
use std::sync::Arc;

const USER_PREFIX: &str = "user/";

#[derive(Clone)]
pub struct RequestStore {
    db: Arc<sled::Db>,
}

impl RequestStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Wrap an already-opened handle, e.g. one shared with other adapters.
    pub fn from_db(db: Arc<sled::Db>) -> Self {
        Self { db }
    }

    fn key(domain: DomainKind, id: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(domain.collection_prefix().len() + id.len());
        key.extend_from_slice(domain.collection_prefix().as_bytes());
        key.extend_from_slice(id.as_bytes());
        key
    }

    /// Persist a new document, minting its id. Returns the id.
    pub fn create(&self, request: &mut Request) -> Result<String, StoreError> {
        let id = ids::new_bech32_id("req")?;
        request.id = id.clone();
        self.put(request)?;
        Ok(id)
    }

    pub fn get(&self, domain: DomainKind, id: &str) -> Result<Request, StoreError> {
        let bytes = self
            .db
            .get(Self::key(domain, id))?
            .ok_or(StoreError::NotFound)?;
        Ok(minicbor::decode(bytes.as_ref())?)
    }

    /// Write the whole document back. Last writer wins.
    pub fn put(&self, request: &Request) -> Result<(), StoreError> {
        let bytes =
            minicbor::to_vec(request).map_err(|e| StoreError::Encode(e.to_string()))?;
        self.db
            .insert(Self::key(request.domain(), &request.id), bytes)?;
        Ok(())
    }

    /// Every document in a collection, in key order (ids are uuid7-based,
    /// so key order is creation order).
    pub fn list(&self, domain: DomainKind) -> Result<Vec<Request>, StoreError> {
        let mut out = Vec::new();
        for entry in self.db.scan_prefix(domain.collection_prefix()) {
            let (_, value) = entry?;
            out.push(minicbor::decode(value.as_ref())?);
        }
        Ok(out)
    }

    /// `list` narrowed by a filter, for the standing dashboard views.
    pub fn list_matching(
        &self,
        domain: DomainKind,
        filter: &RequestFilter,
    ) -> Result<Vec<Request>, StoreError> {
        Ok(self
            .list(domain)?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    /// A standing subscription over one collection. The returned handle
    /// blocks on `next` until a matching write lands; dropping it ends
    /// the subscription.
    pub fn subscribe(&self, domain: DomainKind, filter: RequestFilter) -> Subscription {
        Subscription {
            events: self.db.watch_prefix(domain.collection_prefix()),
            filter,
        }
    }

    pub fn put_profile(&self, user_id: &str, profile: &UserProfile) -> Result<(), StoreError> {
        let bytes =
            minicbor::to_vec(profile).map_err(|e| StoreError::Encode(e.to_string()))?;
        self.db
            .insert(format!("{USER_PREFIX}{user_id}"), bytes)?;
        Ok(())
    }

    pub fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        match self.db.get(format!("{USER_PREFIX}{user_id}"))? {
            Some(bytes) => Ok(Some(minicbor::decode(bytes.as_ref())?)),
            None => Ok(None),
        }
    }

    /// Flush to disk. Tests and shutdown paths only; sled flushes on its
    /// own cadence otherwise.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

/// The two standing views the dashboards hold open, plus an unfiltered
/// variant for history pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFilter {
    /// A provider's pool view: requests still competable for, which means
    /// open ones, plus quoted ones where the outstanding quote is theirs,
    /// plus unclaimed ready delivery orders. `category` narrows the
    /// home-service pool to the provider's expertise.
    OpenPool {
        provider_id: String,
        category: Option<String>,
    },
    /// "My requests" / "my jobs": everything a party is on.
    Mine { user_id: String, role: Role },
    All,
}

impl RequestFilter {
    pub fn matches(&self, request: &Request) -> bool {
        match self {
            Self::OpenPool {
                provider_id,
                category,
            } => {
                if let Some(want) = category {
                    let matches_category = matches!(
                        &request.payload,
                        crate::request::DomainPayload::HomeService { category, .. }
                            if category == want
                    );
                    if !matches_category {
                        return false;
                    }
                }
                match request.status {
                    Status::Open => true,
                    Status::Quoted => request.proposed_by.as_deref() == Some(provider_id),
                    Status::Ready => request.provider_id.is_none(),
                    _ => false,
                }
            }
            Self::Mine { user_id, role } => match role {
                Role::Customer => request.customer_id == *user_id,
                Role::Provider => request.provider_id.as_deref() == Some(user_id),
            },
            Self::All => true,
        }
    }
}

/// Iterator over matching snapshots pushed by the store. Ends when the
/// store is dropped; drop the handle to unsubscribe.
pub struct Subscription {
    events: sled::Subscriber,
    filter: RequestFilter,
}

impl Iterator for Subscription {
    type Item = Request;

    fn next(&mut self) -> Option<Request> {
        for event in self.events.by_ref() {
            if let sled::Event::Insert { value, .. } = event {
                let Ok(request) = minicbor::decode::<Request>(value.as_ref()) else {
                    continue;
                };
                if self.filter.matches(&request) {
                    return Some(request);
                }
            }
        }
        None
    }
}
