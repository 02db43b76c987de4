//! Persistence channels
//!
//! A channel is a single string-valued slot that outlives one request cycle.
//! It enforces no size limit of its own; the bridge does that.

use crate::error::ChannelError;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Single readable/writable string slot
pub trait PersistenceChannel {
    /// Current value, `None` when the slot is empty
    ///
    /// # Errors
    /// Returns error if the slot cannot be read
    fn read(&self) -> Result<Option<String>, ChannelError>;

    /// Replace the slot value
    ///
    /// # Errors
    /// Returns error if the slot cannot be written
    fn write(&mut self, value: &str) -> Result<(), ChannelError>;

    /// Empty the slot; a no-op when already empty
    ///
    /// # Errors
    /// Returns error if the slot cannot be cleared
    fn erase(&mut self) -> Result<(), ChannelError>;
}

/// Slot kept as one named parameter among a page's query parameters
///
/// Other parameters are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParamChannel {
    params: BTreeMap<String, String>,
    key: String,
}

impl QueryParamChannel {
    /// Create channel with no parameters
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            params: BTreeMap::new(),
            key: key.into(),
        }
    }

    /// Create channel over existing parameters
    #[inline]
    #[must_use]
    pub fn from_params(params: BTreeMap<String, String>, key: impl Into<String>) -> Self {
        Self {
            params,
            key: key.into(),
        }
    }

    /// Slot parameter name
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// All query parameters
    #[inline]
    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Take the parameters back, e.g. to build the next URL
    #[inline]
    #[must_use]
    pub fn into_params(self) -> BTreeMap<String, String> {
        self.params
    }
}

impl PersistenceChannel for QueryParamChannel {
    fn read(&self) -> Result<Option<String>, ChannelError> {
        Ok(self.params.get(&self.key).cloned())
    }

    fn write(&mut self, value: &str) -> Result<(), ChannelError> {
        self.params.insert(self.key.clone(), value.to_string());
        Ok(())
    }

    fn erase(&mut self) -> Result<(), ChannelError> {
        self.params.remove(&self.key);
        Ok(())
    }
}

/// Slot kept in a file; an absent file is an empty slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChannel {
    path: PathBuf,
}

impl FileChannel {
    /// Create channel for path
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Slot file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceChannel for FileChannel {
    fn read(&self) -> Result<Option<String>, ChannelError> {
        match std::fs::read_to_string(&self.path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChannelError::io_error(&self.path, e)),
        }
    }

    fn write(&mut self, value: &str) -> Result<(), ChannelError> {
        std::fs::write(&self.path, value).map_err(|e| ChannelError::io_error(&self.path, e))
    }

    fn erase(&mut self) -> Result<(), ChannelError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                Err(ChannelError::io_error(&self.path, e))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_slot_leaves_other_params() {
        let params: BTreeMap<String, String> =
            [("page".to_string(), "2".to_string())].into_iter().collect();
        let mut channel = QueryParamChannel::from_params(params, "pending_changes");

        assert_eq!(channel.read().unwrap(), None);
        channel.write("{}").unwrap();
        assert_eq!(channel.read().unwrap().as_deref(), Some("{}"));

        channel.erase().unwrap();
        channel.erase().unwrap();
        assert_eq!(channel.read().unwrap(), None);
        assert_eq!(channel.params().get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn file_slot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut channel = FileChannel::new(dir.path().join("slot.json"));

        assert_eq!(channel.read().unwrap(), None);
        channel.write("{\"a\":1}").unwrap();
        assert_eq!(channel.read().unwrap().as_deref(), Some("{\"a\":1}"));

        channel.erase().unwrap();
        assert!(!channel.path().exists());
        channel.erase().unwrap();
    }

    #[test]
    fn file_slot_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut channel = FileChannel::new(dir.path().join("missing").join("slot.json"));
        let err = channel.write("{}").unwrap_err();
        assert!(matches!(err, ChannelError::Io { .. }));
    }
}
