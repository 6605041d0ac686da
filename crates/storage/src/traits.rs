use crate::error::StorageError;

/// A stored entry with its last write time (ms since epoch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub key: String,
    pub value: String,
    pub updated_at: i64,
}

/// Durable key-value storage for serialized editor state.
pub trait Storage {
    fn get_entry(&self, key: &str) -> Result<Option<EntryRecord>, StorageError>;

    fn put_entry(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Value of `key`, if present.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_entry(key)?.map(|e| e.value))
    }
}
