//! In-memory appointment store.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use agenda_common::{AgendaError, StoreError};
use async_trait::async_trait;
use tokio::sync::{RwLock, Semaphore, SemaphorePermit};
use tracing::{debug, info};

use crate::appointment::{Appointment, AppointmentChanges, NewAppointment};
use crate::store::AppointmentStore;

/// Default number of operations allowed to run at once.
pub const DEFAULT_POOL_SIZE: usize = 8;

struct Inner {
    records: RwLock<BTreeMap<i64, Appointment>>,
    next_id: AtomicI64,
    pool: Semaphore,
}

/// Thread-safe in-memory store.
///
/// Each operation holds a lease from a bounded pool for its whole duration,
/// the way a database-backed store holds a pooled connection.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

/// A checked-out pool slot, released on drop.
struct Lease<'a> {
    _permit: SemaphorePermit<'a>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_pool_size(DEFAULT_POOL_SIZE)
    }

    pub fn with_pool_size(pool_size: usize) -> Self {
        Self::build(BTreeMap::new(), 1, pool_size)
    }

    /// Build a store pre-populated with `records`; new ids continue after the
    /// highest existing one.
    ///
    /// Every record is validated. Duplicate ids, and an id that leaves no
    /// room for the next one, are rejected.
    pub fn from_records(records: Vec<Appointment>, pool_size: usize) -> Result<Self, StoreError> {
        let mut map = BTreeMap::new();
        for record in records {
            record.validate()?;
            let id = record.id;
            if map.insert(id, record).is_some() {
                return Err(StoreError::InvalidRecord(format!("duplicate appointment id {id}")));
            }
        }

        let highest = map.keys().next_back().copied().unwrap_or(0);
        let next_id = highest.checked_add(1).ok_or_else(|| {
            StoreError::InvalidRecord(format!("appointment id {highest} is too large"))
        })?;
        Ok(Self::build(map, next_id, pool_size))
    }

    fn build(records: BTreeMap<i64, Appointment>, next_id: i64, pool_size: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                records: RwLock::new(records),
                next_id: AtomicI64::new(next_id),
                pool: Semaphore::new(pool_size.max(1)),
            }),
        }
    }

    /// Load seed records from a JSON array of appointments.
    pub fn load_seed(path: &Path, pool_size: usize) -> Result<Self, AgendaError> {
        let content = std::fs::read_to_string(path)?;
        let records: Vec<Appointment> = serde_json::from_str(&content)?;
        let count = records.len();
        let store = Self::from_records(records, pool_size)?;
        info!(count, path = %path.display(), "Loaded seed appointments");
        Ok(store)
    }

    /// Refuse all further operations with `StoreError::Unavailable`.
    pub fn close(&self) {
        self.inner.pool.close();
    }

    /// Number of stored records, across all owners.
    pub async fn len(&self) -> usize {
        self.inner.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn lease(&self) -> Result<Lease<'_>, StoreError> {
        let permit = self
            .inner
            .pool
            .acquire()
            .await
            .map_err(|_| StoreError::Unavailable("connection pool closed".into()))?;
        Ok(Lease { _permit: permit })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A caller sees exactly the records stamped with its owner; an anonymous
/// caller sees only unowned records.
fn visible_to(record: &Appointment, owner: Option<&str>) -> bool {
    record.user_id.as_deref() == owner
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn create(
        &self,
        owner: Option<&str>,
        appointment: NewAppointment,
    ) -> Result<Appointment, StoreError> {
        let _lease = self.lease().await?;
        appointment.validate()?;

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let record = Appointment {
            id,
            title: appointment.title,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            user_id: owner.map(str::to_string),
        };
        self.inner.records.write().await.insert(id, record.clone());
        debug!(id, "Created appointment");
        Ok(record)
    }

    async fn list(&self, owner: Option<&str>) -> Result<Vec<Appointment>, StoreError> {
        let _lease = self.lease().await?;
        let map = self.inner.records.read().await;
        let mut records: Vec<Appointment> = map
            .values()
            .filter(|r| visible_to(r, owner))
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.start_time, r.id));
        Ok(records)
    }

    async fn get(&self, owner: Option<&str>, id: i64) -> Result<Appointment, StoreError> {
        let _lease = self.lease().await?;
        let map = self.inner.records.read().await;
        map.get(&id)
            .filter(|r| visible_to(r, owner))
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(
        &self,
        owner: Option<&str>,
        id: i64,
        changes: AppointmentChanges,
    ) -> Result<Appointment, StoreError> {
        let _lease = self.lease().await?;
        let mut map = self.inner.records.write().await;
        let current = map
            .get(&id)
            .filter(|r| visible_to(r, owner))
            .ok_or(StoreError::NotFound(id))?;
        let updated = changes.apply_to(current)?;
        map.insert(id, updated.clone());
        debug!(id, "Updated appointment");
        Ok(updated)
    }

    async fn delete(&self, owner: Option<&str>, id: i64) -> Result<Appointment, StoreError> {
        let _lease = self.lease().await?;
        let mut map = self.inner.records.write().await;
        if !map.get(&id).is_some_and(|r| visible_to(r, owner)) {
            return Err(StoreError::NotFound(id));
        }
        let removed = map.remove(&id).ok_or(StoreError::NotFound(id))?;
        debug!(id, "Deleted appointment");
        Ok(removed)
    }
}
