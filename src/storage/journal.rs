use crate::core::{JournalError, JournalKey, JournalRecord, PetitionId, Result};
use crate::storage::persistence::JournalSnapshot;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Mutable columns of a row, guarded by the row lock.
struct RowState {
    signature_count: u64,
    updated_at: DateTime<Utc>,
}

/// One stored row. Key columns and `created_at` are immutable; the count is
/// only ever changed by a relative `+= 1` under the row lock, so concurrent
/// increments can never overwrite each other with stale values.
struct JournalRow {
    key: JournalKey,
    created_at: DateTime<Utc>,
    state: Mutex<RowState>,
}

impl JournalRow {
    fn new(key: JournalKey) -> Self {
        let now = Utc::now();
        Self {
            key,
            created_at: now,
            state: Mutex::new(RowState {
                signature_count: 0,
                updated_at: now,
            }),
        }
    }

    fn snapshot(&self) -> Result<JournalRecord> {
        let state = self.state.lock()?;
        Ok(JournalRecord {
            petition_id: self.key.petition_id(),
            constituency_id: self.key.constituency_id().to_string(),
            signature_count: state.signature_count,
            created_at: self.created_at,
            updated_at: state.updated_at,
        })
    }

    fn increment(&self) -> Result<JournalRecord> {
        let mut state = self.state.lock()?;
        state.signature_count += 1;
        state.updated_at = Utc::now();
        Ok(JournalRecord {
            petition_id: self.key.petition_id(),
            constituency_id: self.key.constituency_id().to_string(),
            signature_count: state.signature_count,
            created_at: self.created_at,
            updated_at: state.updated_at,
        })
    }
}

/// The durable table of per-(petition, constituency) signature tallies.
///
/// Exactly one row may exist per composite key; the map-level write lock is
/// the uniqueness constraint, so two concurrent creations for the same key
/// converge on a single row with one winner. Rows are created lazily with a
/// zero count and are never deleted by this component.
pub struct JournalStore {
    rows: RwLock<HashMap<JournalKey, Arc<JournalRow>>>,
}

impl JournalStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the row for this key, creating it with a zero count if absent.
    ///
    /// Validates its inputs first: both parts of the key must be present and
    /// the constituency id must fit the schema. Existing rows are returned
    /// unchanged; this never touches a count.
    pub fn find_or_create(
        &self,
        petition_id: Option<PetitionId>,
        constituency_id: Option<&str>,
    ) -> Result<JournalRecord> {
        let key = JournalKey::new(petition_id, constituency_id)?;
        self.find_or_create_by_key(&key)
    }

    /// As [`find_or_create`](Self::find_or_create), for an already-validated key.
    pub fn find_or_create_by_key(&self, key: &JournalKey) -> Result<JournalRecord> {
        // Fast path: the row usually exists already.
        if let Some(row) = self.rows.read()?.get(key) {
            return row.snapshot();
        }

        // Slow path: take the table write lock and insert. `entry` makes the
        // uniqueness constraint hold under concurrent creation: if another
        // caller won the race between our read and write locks, we get its
        // row back instead of clobbering it.
        let mut rows = self.rows.write()?;
        let row = rows.entry(key.clone()).or_insert_with(|| {
            debug!(
                "creating journal row for petition {} constituency {}",
                key.petition_id(),
                key.constituency_id()
            );
            Arc::new(JournalRow::new(key.clone()))
        });
        row.snapshot()
    }

    /// Atomically add one signature to the stored row behind `record`.
    ///
    /// The increment is applied to the stored value under the row lock,
    /// never derived from the possibly-stale count inside `record`, so N
    /// concurrent calls always add exactly N. Returns the updated snapshot.
    pub fn record_new_signature(&self, record: &JournalRecord) -> Result<JournalRecord> {
        let key = record.key()?;
        let row = self
            .rows
            .read()?
            .get(&key)
            .cloned()
            .ok_or_else(|| JournalError::RecordNotFound {
                petition_id: key.petition_id().0,
                constituency_id: key.constituency_id().to_string(),
            })?;
        row.increment()
    }

    /// Current snapshot of the row for this key, if one exists. Never creates.
    pub fn get(&self, key: &JournalKey) -> Result<Option<JournalRecord>> {
        match self.rows.read()?.get(key) {
            Some(row) => Ok(Some(row.snapshot()?)),
            None => Ok(None),
        }
    }

    /// Number of journal rows across all petitions.
    pub fn count(&self) -> Result<usize> {
        Ok(self.rows.read()?.len())
    }

    /// Per-constituency totals for one petition, for the reporting layer.
    pub fn signature_counts_for(&self, petition_id: PetitionId) -> Result<HashMap<String, u64>> {
        let rows = self.rows.read()?;
        let mut totals = HashMap::new();
        for (key, row) in rows.iter() {
            if key.petition_id() == petition_id {
                let state = row.state.lock()?;
                totals.insert(key.constituency_id().to_string(), state.signature_count);
            }
        }
        Ok(totals)
    }

    /// All rows as owned records, for snapshotting.
    pub fn records(&self) -> Result<Vec<JournalRecord>> {
        let rows = self.rows.read()?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows.values() {
            records.push(row.snapshot()?);
        }
        Ok(records)
    }

    /// Full-table snapshot for the persistence layer.
    pub fn snapshot(&self) -> Result<JournalSnapshot> {
        Ok(JournalSnapshot::new(self.records()?))
    }

    /// Rebuild a store from a loaded snapshot.
    pub fn from_snapshot(snapshot: JournalSnapshot) -> Result<Self> {
        Self::restore(snapshot.records)
    }

    /// Rebuild a store from previously snapshotted records.
    ///
    /// Fails with the validation family if a record carries a malformed key;
    /// later duplicates of a key replace earlier ones.
    pub fn restore(records: Vec<JournalRecord>) -> Result<Self> {
        let mut rows = HashMap::with_capacity(records.len());
        for record in records {
            let key = record.key()?;
            let row = JournalRow {
                key: key.clone(),
                created_at: record.created_at,
                state: Mutex::new(RowState {
                    signature_count: record.signature_count,
                    updated_at: record.updated_at,
                }),
            };
            rows.insert(key, Arc::new(row));
        }
        Ok(Self {
            rows: RwLock::new(rows),
        })
    }
}

impl Default for JournalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(petition: u64, constituency: &str) -> JournalKey {
        JournalKey::new(Some(PetitionId(petition)), Some(constituency)).unwrap()
    }

    #[test]
    fn find_or_create_starts_at_zero() {
        let store = JournalStore::new();
        let record = store
            .find_or_create(Some(PetitionId(1)), Some("E14000001"))
            .unwrap();
        assert_eq!(record.signature_count, 0);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn find_or_create_is_idempotent() {
        let store = JournalStore::new();
        let first = store.find_or_create_by_key(&key(1, "E14000001")).unwrap();
        let second = store.find_or_create_by_key(&key(1, "E14000001")).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn increment_is_relative_to_stored_value() {
        let store = JournalStore::new();
        let stale = store.find_or_create_by_key(&key(1, "E14000001")).unwrap();

        // Move the stored row on past the caller's snapshot.
        store.record_new_signature(&stale).unwrap();
        store.record_new_signature(&stale).unwrap();

        // A third increment through the stale snapshot still lands on 3,
        // not stale.count + 1.
        let updated = store.record_new_signature(&stale).unwrap();
        assert_eq!(updated.signature_count, 3);
    }

    #[test]
    fn increment_missing_row_is_not_found() {
        let store = JournalStore::new();
        let record = store.find_or_create_by_key(&key(1, "E14000001")).unwrap();

        let other = JournalStore::new();
        let err = other.record_new_signature(&record).unwrap_err();
        assert!(matches!(err, JournalError::RecordNotFound { .. }));
        assert!(!err.is_validation());
    }

    #[test]
    fn restore_round_trips_records() {
        let store = JournalStore::new();
        let record = store.find_or_create_by_key(&key(7, "E14000002")).unwrap();
        for _ in 0..5 {
            store.record_new_signature(&record).unwrap();
        }

        let restored = JournalStore::restore(store.records().unwrap()).unwrap();
        let fetched = restored.get(&key(7, "E14000002")).unwrap().unwrap();
        assert_eq!(fetched.signature_count, 5);
        assert_eq!(restored.count().unwrap(), 1);
    }
}
