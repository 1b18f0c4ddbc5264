// ============================================================================
// Petition Journal Library
// ============================================================================
//
// Per-constituency running totals of validated petition signatures. Many
// validation workers may report signatures for the same (petition,
// constituency) pair at once; the store guarantees one row per pair and
// lost-update-free counting.

pub mod core;
pub mod gate;
pub mod storage;

// Re-export main types for convenience
pub use core::{
    JournalError, JournalKey, JournalRecord, MAX_CONSTITUENCY_ID_LEN, PetitionId, Result,
    SignatureEvent, SignatureState,
};
pub use gate::{GateOutcome, SignatureGate, SkipReason, applicability};
pub use storage::{JournalSnapshot, JournalStore, SnapshotManager};

// ============================================================================
// High-level API
// ============================================================================

/// Journal over a fresh in-memory store.
///
/// This is the recommended way to wire the component into a validation
/// workflow: share one [`SignatureGate`] (or clones of its store handle)
/// across all workers.
///
/// # Examples
///
/// ```
/// use petition_journal::{journal, GateOutcome, PetitionId, SignatureEvent, SignatureState};
///
/// # fn main() -> petition_journal::Result<()> {
/// let gate = journal();
///
/// let event = SignatureEvent::new(
///     PetitionId(1),
///     Some("E14000001".to_string()),
///     SignatureState::Validated,
/// );
///
/// match gate.record_new_signature_for(Some(&event))? {
///     GateOutcome::Recorded(record) => assert_eq!(record.signature_count, 1),
///     GateOutcome::Skipped(reason) => panic!("unexpected skip: {:?}", reason),
/// }
/// # Ok(())
/// # }
/// ```
pub fn journal() -> SignatureGate {
    SignatureGate::new(std::sync::Arc::new(JournalStore::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_records_validated_signature() {
        let gate = journal();
        let event = SignatureEvent::new(
            PetitionId(1),
            Some("E14000001".to_string()),
            SignatureState::Validated,
        );

        let outcome = gate.record_new_signature_for(Some(&event)).unwrap();
        assert_eq!(outcome.record().unwrap().signature_count, 1);
        assert_eq!(gate.store().count().unwrap(), 1);
    }

    #[test]
    fn test_journal_skips_pending_signature() {
        let gate = journal();
        let event = SignatureEvent::new(
            PetitionId(1),
            Some("E14000001".to_string()),
            SignatureState::Pending,
        );

        let outcome = gate.record_new_signature_for(Some(&event)).unwrap();
        assert_eq!(outcome, GateOutcome::Skipped(SkipReason::NotValidated));
        assert_eq!(gate.store().count().unwrap(), 0);
    }
}
