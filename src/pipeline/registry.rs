use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::{CaseRecord, CaseRequest, CaseStatus};

use super::PipelineError;

type SharedRecord = Arc<RwLock<CaseRecord>>;

/// Process-wide map from case id to case record.
///
/// Readers only ever get snapshots. The run that registered a case holds its
/// [`CaseHandle`], the only way to mutate the record.
#[derive(Debug, Default)]
pub struct CaseRegistry {
    cases: RwLock<HashMap<String, SharedRecord>>,
    retention: Option<Duration>,
}

/// Exclusive write access to one registered case
#[derive(Debug)]
pub struct CaseHandle {
    case_id: String,
    record: SharedRecord,
}

impl CaseHandle {
    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut CaseRecord) -> R) -> R {
        let mut record = self.record.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut record)
    }

    pub fn snapshot(&self) -> CaseRecord {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CaseRegistry {
    pub fn new(retention: Option<Duration>) -> Self {
        Self {
            cases: RwLock::new(HashMap::new()),
            retention,
        }
    }

    /// Insert a fresh record for `request`. Expired cases are pruned first;
    /// an id that is still present is rejected.
    pub fn register(&self, request: CaseRequest) -> Result<CaseHandle, PipelineError> {
        self.prune_expired();

        let mut cases = self.cases.write().unwrap_or_else(PoisonError::into_inner);
        if cases.contains_key(&request.case_id) {
            return Err(PipelineError::DuplicateCase(request.case_id));
        }

        let case_id = request.case_id.clone();
        let record = Arc::new(RwLock::new(CaseRecord::new(request)));
        cases.insert(case_id.clone(), Arc::clone(&record));
        debug!("Registered case {} ({} cases held)", case_id, cases.len());

        Ok(CaseHandle { case_id, record })
    }

    fn get(&self, case_id: &str) -> Option<SharedRecord> {
        self.cases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(case_id)
            .cloned()
    }

    /// Read a registered record without cloning it
    pub fn with_record<R>(&self, case_id: &str, f: impl FnOnce(&CaseRecord) -> R) -> Option<R> {
        let record = self.get(case_id)?;
        let guard = record.read().unwrap_or_else(PoisonError::into_inner);
        Some(f(&guard))
    }

    pub fn status(&self, case_id: &str) -> Option<CaseStatus> {
        self.with_record(case_id, CaseRecord::status)
    }

    pub fn snapshot(&self, case_id: &str) -> Option<CaseRecord> {
        self.with_record(case_id, CaseRecord::clone)
    }

    pub fn len(&self) -> usize {
        self.cases.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn case_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .cases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Drop terminal cases that finished longer ago than the retention
    /// limit. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        match self.retention {
            Some(retention) => self.prune_finished_before(Utc::now(), retention),
            None => 0,
        }
    }

    fn prune_finished_before(&self, now: DateTime<Utc>, retention: Duration) -> usize {
        let mut cases = self.cases.write().unwrap_or_else(PoisonError::into_inner);
        let before = cases.len();

        cases.retain(|_, record| {
            let record = record.read().unwrap_or_else(PoisonError::into_inner);
            let expired = record.is_terminal()
                && record
                    .finished_at
                    .and_then(|finished| (now - finished).to_std().ok())
                    .is_some_and(|age| age >= retention);
            !expired
        });

        let removed = before - cases.len();
        if removed > 0 {
            info!("Pruned {} expired cases", removed);
        }
        removed
    }
}
