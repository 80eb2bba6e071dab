//! Key-value collaborator exposed to user code.
//!
//! Runtimes without a backing store use [`NoopStore`], which warns on
//! every call and never fails. [`MemoryStore`] keeps values for as long
//! as the store value lives, for native runs and tests.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::warn;

pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Stand-in for a missing host store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl KvStore for NoopStore {
    fn get(&self, key: &str) -> Option<String> {
        warn!(%key, "kv get is not supported in this runtime");
        None
    }

    fn set(&self, key: &str, _value: &str) {
        warn!(%key, "kv set is not supported in this runtime, value dropped");
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: RefCell::new(
                iter.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}
