//! The stateless filter between the signature-validation workflow and the
//! journal table.
//!
//! Whether an event counts at all is decided by [`applicability`], a pure
//! function with no store access, so the gating rules are testable on their
//! own. Everything concurrency-related is delegated to [`JournalStore`].

use crate::core::{JournalRecord, PetitionId, Result, SignatureEvent};
use crate::storage::JournalStore;
use log::debug;
use std::sync::Arc;

/// Why an event did not reach the store. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingEvent,
    MissingPetition,
    MissingConstituency,
    NotValidated,
}

/// Outcome of feeding one event through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Recorded(JournalRecord),
    Skipped(SkipReason),
}

impl GateOutcome {
    pub fn record(&self) -> Option<&JournalRecord> {
        match self {
            Self::Recorded(record) => Some(record),
            Self::Skipped(_) => None,
        }
    }
}

/// Decide whether an event should contribute to a tally, and with which key.
///
/// Checks run in order and short-circuit: event present, petition present,
/// constituency present and non-empty, state validated. Pure; never touches
/// the store. Key validation beyond presence (the length bound) stays with
/// the store.
pub fn applicability(
    event: Option<&SignatureEvent>,
) -> std::result::Result<(PetitionId, &str), SkipReason> {
    let event = event.ok_or(SkipReason::MissingEvent)?;
    let petition_id = event.petition_id.ok_or(SkipReason::MissingPetition)?;
    let constituency_id = match event.constituency_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => return Err(SkipReason::MissingConstituency),
    };
    if !event.state.is_validated() {
        return Err(SkipReason::NotValidated);
    }
    Ok((petition_id, constituency_id))
}

/// Entry point for the validation workflow: one call per signature that
/// transitions into the validated state.
pub struct SignatureGate {
    store: Arc<JournalStore>,
}

impl SignatureGate {
    pub fn new(store: Arc<JournalStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<JournalStore> {
        &self.store
    }

    /// Tally one signature event.
    ///
    /// Inapplicable events are silent no-ops with zero store interaction.
    /// Applicable events cause at most one row creation and exactly one
    /// increment; the updated record is returned. Safe to call from any
    /// number of concurrent workers sharing the store.
    pub fn record_new_signature_for(
        &self,
        event: Option<&SignatureEvent>,
    ) -> Result<GateOutcome> {
        let (petition_id, constituency_id) = match applicability(event) {
            Ok(parts) => parts,
            Err(reason) => {
                debug!("signature event skipped: {:?}", reason);
                return Ok(GateOutcome::Skipped(reason));
            }
        };
        let record = self
            .store
            .find_or_create(Some(petition_id), Some(constituency_id))?;
        let updated = self.store.record_new_signature(&record)?;
        Ok(GateOutcome::Recorded(updated))
    }
}
