pub mod journal;
pub mod persistence;

pub use journal::JournalStore;
pub use persistence::{JournalSnapshot, SnapshotManager, SnapshotMetadata};
