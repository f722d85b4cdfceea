use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::domain::repositories::store::{Slot, SlotStore, StoreError};

/// One JSON file per slot under a data directory, with a total byte capacity
/// standing in for the browser storage quota the original medium enforces.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    capacity: u64,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(dir: P, capacity: u64) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            capacity,
        })
    }

    fn slot_path(&self, slot: Slot) -> PathBuf {
        self.dir.join(format!("{}.json", slot.key()))
    }

    fn used_by_others(&self, slot: Slot) -> u64 {
        Slot::ALL
            .iter()
            .filter(|other| **other != slot)
            .map(|other| {
                std::fs::metadata(self.slot_path(*other))
                    .map(|meta| meta.len())
                    .unwrap_or(0)
            })
            .sum()
    }
}

impl SlotStore for FileStore {
    fn read(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.slot_path(slot)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, slot: Slot, payload: &str) -> Result<(), StoreError> {
        let needed = self.used_by_others(slot) + payload.len() as u64;
        if needed > self.capacity {
            return Err(StoreError::QuotaExceeded {
                capacity: self.capacity,
            });
        }

        std::fs::write(self.slot_path(slot), payload)?;

        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        for slot in Slot::ALL {
            match std::fs::remove_file(self.slot_path(slot)) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub mod memory {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use crate::domain::repositories::store::{Slot, SlotStore, StoreError};

    /// In-memory stand-in for [`super::FileStore`], sharing content across
    /// clones so library and progress repositories see the same medium.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryStore {
        slots: Arc<Mutex<HashMap<&'static str, String>>>,
        capacity: Option<u64>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_capacity(capacity: u64) -> Self {
            Self {
                slots: Arc::default(),
                capacity: Some(capacity),
            }
        }
    }

    impl SlotStore for MemoryStore {
        fn read(&self, slot: Slot) -> Result<Option<String>, StoreError> {
            Ok(self.slots.lock().unwrap().get(slot.key()).cloned())
        }

        fn write(&self, slot: Slot, payload: &str) -> Result<(), StoreError> {
            let mut slots = self.slots.lock().unwrap();

            if let Some(capacity) = self.capacity {
                let used_by_others: u64 = slots
                    .iter()
                    .filter(|(key, _)| **key != slot.key())
                    .map(|(_, payload)| payload.len() as u64)
                    .sum();
                if used_by_others + payload.len() as u64 > capacity {
                    return Err(StoreError::QuotaExceeded { capacity });
                }
            }

            slots.insert(slot.key(), payload.to_string());

            Ok(())
        }

        fn clear(&self) -> Result<(), StoreError> {
            self.slots.lock().unwrap().clear();

            Ok(())
        }
    }
}
