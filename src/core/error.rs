use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Journal requires a petition")]
    MissingPetition,

    #[error("Journal requires a constituency id")]
    MissingConstituencyId,

    #[error("Constituency id exceeds 255 characters (got {0})")]
    ConstituencyIdTooLong(usize),

    #[error("No journal record for petition {petition_id}, constituency '{constituency_id}'")]
    RecordNotFound {
        petition_id: u64,
        constituency_id: String,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, JournalError>;

impl JournalError {
    /// True for malformed-input failures, false for the persistence family.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingPetition | Self::MissingConstituencyId | Self::ConstituencyIdTooLong(_)
        )
    }
}

impl<T> From<std::sync::PoisonError<T>> for JournalError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}
