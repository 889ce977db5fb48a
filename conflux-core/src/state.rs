//! RunState — the key-value context shared across one composed run.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Value = Box<dyn Any + Send + Sync>;

/// Mutable bag of typed values shared by every action in one run.
///
/// `RunState` is a handle: clones refer to the same map, which is how a
/// runner hands "the same state" to children on other tasks. Keys are
/// strings agreed on by the actions themselves; the engine never reads them.
///
/// # Thread safety
///
/// Each method is atomic on its own (the map sits behind a `RwLock`), but a
/// [`get`](Self::get) followed by an [`insert`](Self::insert) is not. Use
/// [`update`](Self::update) for read-modify-write on a single key, or store
/// your own `Arc<Mutex<_>>` as the value when several keys must change
/// together. Concurrent children of an `Async` runner that both mutate the
/// same key are otherwise racing, and the engine does nothing about it.
#[derive(Clone, Default)]
pub struct RunState {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl RunState {
    /// An empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value. Returns true if the key was already present.
    pub fn insert<T>(&self, key: impl Into<String>, value: T) -> bool
    where
        T: Any + Send + Sync,
    {
        self.write().insert(key.into(), Box::new(value)).is_some()
    }

    /// Clone out the value at `key` if it exists and has type `T`.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Any + Clone,
    {
        self.read()
            .get(key)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    /// True if any value is stored at `key`, regardless of its type.
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Remove the value at `key`. Returns true if something was removed.
    pub fn remove(&self, key: &str) -> bool {
        self.write().remove(key).is_some()
    }

    /// Mutate the value at `key` in place while holding the write lock.
    ///
    /// Returns `None` when the key is missing or holds another type.
    pub fn update<T, R>(&self, key: &str, f: impl FnOnce(&mut T) -> R) -> Option<R>
    where
        T: Any,
    {
        self.write()
            .get_mut(key)
            .and_then(|v| v.downcast_mut::<T>())
            .map(f)
    }

    /// Return the value at `key`, inserting `init()` first if the key is absent.
    ///
    /// Returns `None` when the key already holds a value of another type;
    /// that value is left untouched.
    pub fn get_or_insert_with<T>(&self, key: &str, init: impl FnOnce() -> T) -> Option<T>
    where
        T: Any + Clone + Send + Sync,
    {
        let mut values = self.write();
        let slot = values
            .entry(key.to_owned())
            .or_insert_with(|| Box::new(init()));
        slot.downcast_ref::<T>().cloned()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of the current keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// True if both handles point at the same underlying map.
    pub fn ptr_eq(&self, other: &RunState) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }

    // A panic inside `update` poisons the lock; the map itself is still
    // structurally sound, so later readers carry on.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.keys();
        keys.sort();
        f.debug_struct("RunState").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn typed_round_trip() {
        let state = RunState::new();
        assert!(!state.insert("count", 3u32));
        assert_eq!(state.get::<u32>("count"), Some(3));
        assert_eq!(state.get::<String>("count"), None);
        assert!(state.insert("count", 4u32));
        assert_eq!(state.get::<u32>("count"), Some(4));
    }

    #[test]
    fn clones_share_the_map() {
        let state = RunState::new();
        let handle = state.clone();
        handle.insert("name", String::from("deploy"));
        assert!(state.ptr_eq(&handle));
        assert_eq!(state.get::<String>("name").as_deref(), Some("deploy"));
        assert!(!state.ptr_eq(&RunState::new()));
    }

    #[test]
    fn update_mutates_in_place() {
        let state = RunState::new();
        state.insert("hits", vec![1u8]);
        let len = state.update("hits", |v: &mut Vec<u8>| {
            v.push(2);
            v.len()
        });
        assert_eq!(len, Some(2));
        assert_eq!(state.get::<Vec<u8>>("hits"), Some(vec![1, 2]));
        assert_eq!(state.update("missing", |v: &mut Vec<u8>| v.len()), None);
        assert_eq!(state.update("hits", |v: &mut String| v.len()), None);
    }

    #[test]
    fn get_or_insert_with_respects_existing_values() {
        let state = RunState::new();
        assert_eq!(state.get_or_insert_with("n", || 7i64), Some(7));
        assert_eq!(state.get_or_insert_with("n", || 9i64), Some(7));
        assert_eq!(state.get_or_insert_with("n", || String::new()), None);
    }

    #[test]
    fn remove_and_len() {
        let state = RunState::new();
        assert!(state.is_empty());
        state.insert("a", 1u8);
        state.insert("b", 2u8);
        assert_eq!(state.len(), 2);
        assert!(state.remove("a"));
        assert!(!state.remove("a"));
        assert!(!state.contains_key("a"));
        assert_eq!(state.keys(), vec!["b".to_string()]);
    }

    #[test]
    fn caller_owned_lock_as_value() {
        let state = RunState::new();
        state.insert("log", Arc::new(Mutex::new(Vec::<String>::new())));
        let log = state.get::<Arc<Mutex<Vec<String>>>>("log").unwrap();
        log.lock().unwrap().push("first".into());
        let again = state.get::<Arc<Mutex<Vec<String>>>>("log").unwrap();
        assert_eq!(again.lock().unwrap().len(), 1);
    }

    #[test]
    fn debug_lists_sorted_keys() {
        let state = RunState::new();
        state.insert("b", 1u8);
        state.insert("a", 1u8);
        assert_eq!(format!("{state:?}"), r#"RunState { keys: ["a", "b"] }"#);
    }
}
