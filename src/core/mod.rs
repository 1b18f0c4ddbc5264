pub mod error;
pub mod types;

pub use error::{JournalError, Result};
pub use types::{
    JournalKey, JournalRecord, MAX_CONSTITUENCY_ID_LEN, PetitionId, SignatureEvent, SignatureState,
};
