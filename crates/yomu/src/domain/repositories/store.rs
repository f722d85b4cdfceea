use thiserror::Error;

/// Named units of durable storage. Each slot holds one serialized list and is
/// always read and written whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Library,
    Progress,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Library, Slot::Progress];

    pub fn key(&self) -> &'static str {
        match self {
            Slot::Library => "manga_library",
            Slot::Progress => "reading_progress",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store capacity of {capacity} bytes exceeded")]
    QuotaExceeded { capacity: u64 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whole-slot key-value storage. Writes are last-writer-wins; there are no
/// transactions and no partial updates. A write may fail with
/// [`StoreError::QuotaExceeded`] when the medium is full, in which case the
/// caller decides whether to `clear` and retry.
pub trait SlotStore: Send + Sync {
    fn read(&self, slot: Slot) -> Result<Option<String>, StoreError>;
    fn write(&self, slot: Slot, payload: &str) -> Result<(), StoreError>;
    /// Discards every slot in the medium.
    fn clear(&self) -> Result<(), StoreError>;
}
