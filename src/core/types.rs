use super::{JournalError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest constituency identifier the journal will accept.
pub const MAX_CONSTITUENCY_ID_LEN: usize = 255;

/// Identity reference to an externally-owned petition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PetitionId(pub u64);

impl fmt::Display for PetitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PetitionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Composite key of a journal row.
///
/// Construction is the single validation choke point: a `JournalKey` always
/// carries a petition and a non-empty constituency id of at most
/// [`MAX_CONSTITUENCY_ID_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JournalKey {
    petition_id: PetitionId,
    constituency_id: String,
}

impl JournalKey {
    pub fn new(
        petition_id: Option<PetitionId>,
        constituency_id: Option<&str>,
    ) -> Result<Self> {
        let petition_id = petition_id.ok_or(JournalError::MissingPetition)?;
        let constituency_id = match constituency_id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(JournalError::MissingConstituencyId),
        };
        let len = constituency_id.chars().count();
        if len > MAX_CONSTITUENCY_ID_LEN {
            return Err(JournalError::ConstituencyIdTooLong(len));
        }
        Ok(Self {
            petition_id,
            constituency_id: constituency_id.to_string(),
        })
    }

    pub fn petition_id(&self) -> PetitionId {
        self.petition_id
    }

    pub fn constituency_id(&self) -> &str {
        &self.constituency_id
    }
}

/// Lifecycle states of a signature, as reported by the validation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureState {
    Pending,
    Validated,
    Fraudulent,
    Invalidated,
}

impl SignatureState {
    pub fn is_validated(self) -> bool {
        matches!(self, Self::Validated)
    }
}

/// One person's signature as seen by the journal: the petition it belongs
/// to, the constituency it was cast from, and its validation state. Both
/// references are optional because upstream geocoding or petition linkage
/// may not have resolved yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureEvent {
    pub petition_id: Option<PetitionId>,
    pub constituency_id: Option<String>,
    pub state: SignatureState,
}

impl SignatureEvent {
    pub fn new(
        petition_id: impl Into<Option<PetitionId>>,
        constituency_id: impl Into<Option<String>>,
        state: SignatureState,
    ) -> Self {
        Self {
            petition_id: petition_id.into(),
            constituency_id: constituency_id.into(),
            state,
        }
    }
}

/// Owned snapshot of one journal row as of the call that returned it.
///
/// The stored row keeps moving under concurrent increments; holding a
/// `JournalRecord` never pins or stales the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub petition_id: PetitionId,
    pub constituency_id: String,
    pub signature_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JournalRecord {
    pub fn key(&self) -> Result<JournalKey> {
        JournalKey::new(Some(self.petition_id), Some(&self.constituency_id))
    }
}
