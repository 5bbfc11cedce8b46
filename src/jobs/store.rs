//! In-memory job table

use crate::error::{Error, Result};
use crate::types::{JobId, JobRecord, MediaFormat, Quality};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared table of job records keyed by id
///
/// Cloning is cheap and every clone sees the same table. Readers always get
/// a snapshot copy, never a reference into the map.
#[derive(Clone, Debug, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<JobId, JobRecord>>>,
}

impl JobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh pending record and return its id
    pub fn create(&self, format: MediaFormat, quality: Quality) -> JobId {
        let mut jobs = self.write();
        let mut id = JobId::new();
        while jobs.contains_key(&id) {
            id = JobId::new();
        }
        jobs.insert(id, JobRecord::new(id, format, quality));
        id
    }

    /// Snapshot of one record
    pub fn get(&self, id: JobId) -> Result<JobRecord> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("job {id}")))
    }

    /// Apply `mutation` to the record with this id
    ///
    /// Returns `false` (and does nothing) if the id is unknown.
    pub fn update<F>(&self, id: JobId, mutation: F) -> bool
    where
        F: FnOnce(&mut JobRecord),
    {
        match self.write().get_mut(&id) {
            Some(record) => {
                mutation(record);
                true
            }
            None => false,
        }
    }

    /// Number of jobs ever submitted
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no job was ever submitted
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Ids of all known jobs, in no particular order
    pub fn ids(&self) -> Vec<JobId> {
        self.read().keys().copied().collect()
    }

    // Every mutation is a plain field write, so a panicking writer cannot
    // leave a record half-updated in a way later readers would trip over.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, JobRecord>> {
        self.jobs.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, JobRecord>> {
        self.jobs.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
