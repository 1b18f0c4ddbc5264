/// SignatureGate behavior tests
///
/// The four no-op gates and the end-to-end tally scenarios.
/// Run with: cargo test --test signature_gate_tests

use petition_journal::{
    GateOutcome, JournalKey, JournalStore, PetitionId, SignatureEvent, SignatureGate,
    SignatureState, SkipReason, journal,
};
use std::sync::Arc;

fn validated_event(petition: u64, constituency: &str) -> SignatureEvent {
    SignatureEvent::new(
        PetitionId(petition),
        Some(constituency.to_string()),
        SignatureState::Validated,
    )
}

#[test]
fn test_nil_event_is_a_noop() {
    let gate = journal();
    let outcome = gate.record_new_signature_for(None).unwrap();
    assert_eq!(outcome, GateOutcome::Skipped(SkipReason::MissingEvent));
    assert_eq!(gate.store().count().unwrap(), 0);
}

#[test]
fn test_event_without_petition_is_a_noop() {
    let gate = journal();
    let mut event = validated_event(1, "E14000001");
    event.petition_id = None;

    let outcome = gate.record_new_signature_for(Some(&event)).unwrap();
    assert_eq!(outcome, GateOutcome::Skipped(SkipReason::MissingPetition));
    assert_eq!(gate.store().count().unwrap(), 0);
}

#[test]
fn test_event_without_constituency_is_a_noop() {
    let gate = journal();
    let mut event = validated_event(1, "E14000001");
    event.constituency_id = None;

    let outcome = gate.record_new_signature_for(Some(&event)).unwrap();
    assert_eq!(outcome, GateOutcome::Skipped(SkipReason::MissingConstituency));
    assert_eq!(gate.store().count().unwrap(), 0);
}

#[test]
fn test_unvalidated_event_is_a_noop() {
    let gate = journal();
    let mut event = validated_event(1, "E14000001");
    event.state = SignatureState::Pending;

    let outcome = gate.record_new_signature_for(Some(&event)).unwrap();
    assert_eq!(outcome, GateOutcome::Skipped(SkipReason::NotValidated));
    assert_eq!(gate.store().count().unwrap(), 0);
}

#[test]
fn test_oversized_constituency_surfaces_as_validation_error() {
    let gate = journal();
    let mut event = validated_event(1, "E14000001");
    event.constituency_id = Some("E".repeat(256));

    // Passes the four applicability gates, then fails store validation.
    let err = gate.record_new_signature_for(Some(&event)).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(gate.store().count().unwrap(), 0);
}

#[test]
fn test_first_validated_event_creates_row_at_one() {
    let gate = journal();
    let event = validated_event(1, "E14000001");

    let outcome = gate.record_new_signature_for(Some(&event)).unwrap();
    let record = outcome.record().expect("should be recorded");
    assert_eq!(record.signature_count, 1);
    assert_eq!(gate.store().count().unwrap(), 1);

    // A second validated event lands on the same row.
    let outcome = gate.record_new_signature_for(Some(&event)).unwrap();
    assert_eq!(outcome.record().unwrap().signature_count, 2);
    assert_eq!(gate.store().count().unwrap(), 1);
}

#[test]
fn test_validated_event_increments_existing_row() {
    let store = Arc::new(JournalStore::new());
    let key = JournalKey::new(Some(PetitionId(1)), Some("E14000002")).unwrap();
    let existing = store.find_or_create_by_key(&key).unwrap();
    for _ in 0..20 {
        store.record_new_signature(&existing).unwrap();
    }

    let gate = SignatureGate::new(Arc::clone(&store));
    let outcome = gate
        .record_new_signature_for(Some(&validated_event(1, "E14000002")))
        .unwrap();

    assert_eq!(outcome.record().unwrap().signature_count, 21);
    assert_eq!(store.count().unwrap(), 1);
}
