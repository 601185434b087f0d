//! Key-value persistence
//!
//! Games only ever need browser LocalStorage semantics: string keys,
//! string values, synchronous access that may fail (private mode, quota).
//! [`KeyValueStore`] captures that so achievements, settings and high
//! scores can run against [`MemoryStore`] off the browser.

#[cfg(target_arch = "wasm32")]
pub mod local;
pub mod scores;

use std::collections::HashMap;
use std::fmt;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;
pub use scores::HighScore;

/// Errors from a key-value store
#[derive(Debug)]
pub enum StorageError {
    /// No storage backend (e.g. LocalStorage disabled)
    Unavailable,
    /// Write rejected because the store is full
    QuotaExceeded { key: String },
    /// Backend refused the operation
    Access(String),
    /// Stored value could not be encoded or decoded
    Json(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage unavailable"),
            StorageError::QuotaExceeded { key } => write!(f, "quota exceeded writing {key}"),
            StorageError::Access(msg) => write!(f, "storage access failed: {msg}"),
            StorageError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    /// Classify a rejected write by the name of the exception the backend raised
    ///
    /// Only quota errors become [`StorageError::QuotaExceeded`]; anything else
    /// (e.g. a `SecurityError` with storage blocked) is an access failure.
    pub fn from_write_failure(key: &str, name: Option<&str>, detail: impl Into<String>) -> Self {
        match name {
            Some("QuotaExceededError" | "NS_ERROR_DOM_QUOTA_REACHED") => StorageError::QuotaExceeded {
                key: key.to_string(),
            },
            _ => StorageError::Access(detail.into()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

/// String-keyed, string-valued synchronous storage
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Box an opened store, or fall back to a [`MemoryStore`] if opening failed
///
/// With the fallback, saves work for the life of the page only.
pub fn store_or_memory<S>(opened: Result<S, StorageError>) -> Box<dyn KeyValueStore>
where
    S: KeyValueStore + 'static,
{
    match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("Storage unavailable ({}), keeping data in memory", e);
            Box::new(MemoryStore::new())
        }
    }
}

/// In-memory store with an optional byte quota
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once keys + values exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            items: HashMap::new(),
            quota: Some(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if self.used_bytes_without(key) + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Parse the leading integer of a stored value
///
/// Mirrors how score values written by older pages are read back:
/// leading whitespace and an optional sign are accepted, parsing stops at
/// the first non-digit, and anything without digits reads as 0.
pub fn parse_leading_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }

    if negative { -value } else { value }
}

/// Read an integer, falling back to `default` when the key is missing
pub fn read_int<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
    default: i64,
) -> Result<i64, StorageError> {
    Ok(store
        .get_item(key)?
        .map(|raw| parse_leading_int(&raw))
        .unwrap_or(default))
}

/// Write an integer as its decimal string
pub fn write_int<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    value: i64,
) -> Result<(), StorageError> {
    store.set_item(key, &value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), 42);
        assert_eq!(parse_leading_int("  12abc"), 12);
        assert_eq!(parse_leading_int("-7"), -7);
        assert_eq!(parse_leading_int("abc"), 0);
        assert_eq!(parse_leading_int(""), 0);
        assert_eq!(parse_leading_int("3.9"), 3);
    }

    #[test]
    fn test_read_int_default_only_when_missing() {
        let mut store = MemoryStore::new();
        assert_eq!(read_int(&store, "best", 5).unwrap(), 5);

        store.set_item("best", "garbage").unwrap();
        assert_eq!(read_int(&store, "best", 5).unwrap(), 0);

        write_int(&mut store, "best", 120).unwrap();
        assert_eq!(read_int(&store, "best", 5).unwrap(), 120);
    }

    #[test]
    fn test_quota_rejects_oversized_writes() {
        let mut store = MemoryStore::with_quota(16);
        store.set_item("a", "12345").unwrap();
        let err = store.set_item("b", "0123456789abcdef").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(store.len(), 1);

        // Overwriting an existing key only counts the new value
        store.set_item("a", "123456789").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("123456789"));
    }

    #[test]
    fn test_remove_item() {
        let mut store = MemoryStore::new();
        store.set_item("k", "v").unwrap();
        store.remove_item("k").unwrap();
        assert!(store.get_item("k").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_failures_classified_by_name() {
        let quota = StorageError::from_write_failure("best", Some("QuotaExceededError"), "full");
        assert!(matches!(quota, StorageError::QuotaExceeded { ref key } if key == "best"));

        let firefox = StorageError::from_write_failure("best", Some("NS_ERROR_DOM_QUOTA_REACHED"), "full");
        assert!(matches!(firefox, StorageError::QuotaExceeded { .. }));

        let blocked = StorageError::from_write_failure("best", Some("SecurityError"), "denied");
        assert!(matches!(blocked, StorageError::Access(ref msg) if msg == "denied"));

        let unknown = StorageError::from_write_failure("best", None, "?");
        assert!(matches!(unknown, StorageError::Access(_)));
    }

    #[test]
    fn test_failed_open_falls_back_to_memory() {
        let mut store = store_or_memory::<MemoryStore>(Err(StorageError::Unavailable));
        write_int(&mut store, "best", 40).unwrap();
        assert_eq!(read_int(&store, "best", 0).unwrap(), 40);

        let mut seeded = MemoryStore::new();
        seeded.set_item("best", "7").unwrap();
        let store = store_or_memory(Ok(seeded));
        assert_eq!(read_int(&store, "best", 0).unwrap(), 7);
    }
}
