//! The key-value world state the ledger logic runs against.
//!
//! The store is shared by every entity kind: an entity ID is its key. Keys are
//! kept in lexicographic byte order, which is the order of range scans.

use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::error::StoreError;

/// One stored record, as returned by a range scan.
pub type KeyValue = (String, Vec<u8>);

/// Pending puts and deletes, keyed by key. `None` marks a deletion.
pub type WriteSet = BTreeMap<String, Option<Vec<u8>>>;

/// Access to a transactional, ordered key-value store.
///
/// A missing key is not an error: `get_state` returns `Ok(None)`. Deleting a
/// missing key succeeds. Range scans include `start` and exclude `end`; an empty
/// bound leaves that side of the range open, so `("", "")` is the whole keyspace.
pub trait WorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn del_state(&mut self, key: &str) -> Result<(), StoreError>;

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StoreError>;

    /// Applies a whole write set, or none of it.
    ///
    /// The default implementation reads the previous value of every touched key
    /// first, and puts those values back if a write fails. Stores with a native
    /// batch write should override it.
    fn apply(&mut self, writes: &WriteSet) -> Result<(), StoreError> {
        let mut previous: Vec<(&str, Option<Vec<u8>>)> = Vec::with_capacity(writes.len());
        for key in writes.keys() {
            previous.push((key.as_str(), self.get_state(key)?));
        }
        for (applied, (key, value)) in writes.iter().enumerate() {
            let res = match value {
                Some(v) => self.put_state(key, v),
                None => self.del_state(key),
            };
            if let Err(e) = res {
                warn!(
                    "apply: write of {} failed, restoring {} key(s): {}",
                    key, applied, e
                );
                for (old_key, old_value) in previous[..applied].iter().rev() {
                    let restored = match old_value {
                        Some(v) => self.put_state(old_key, v),
                        None => self.del_state(old_key),
                    };
                    if let Err(re) = restored {
                        warn!("apply: could not restore {}: {}", old_key, re);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

fn range_bounds<'a>(start: &'a str, end: &'a str) -> (Bound<&'a str>, Bound<&'a str>) {
    let lower = if start.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start)
    };
    let upper = if end.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end)
    };
    (lower, upper)
}

// BTreeMap::range panics on inverted bounds, the store answers with an empty scan.
fn is_inverted(start: &str, end: &str) -> bool {
    !start.is_empty() && !end.is_empty() && start >= end
}

/// An in-memory world state.
///
/// Used by the tests and as the backing map of the file ledger in the command line.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MemoryWorldState {
    records: BTreeMap<String, Vec<u8>>,
}

impl MemoryWorldState {
    pub fn new() -> MemoryWorldState {
        MemoryWorldState::default()
    }

    pub fn from_records(records: BTreeMap<String, Vec<u8>>) -> MemoryWorldState {
        MemoryWorldState { records }
    }

    pub fn records(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl WorldState for MemoryWorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.records.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.records.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), StoreError> {
        self.records.remove(key);
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StoreError> {
        if is_inverted(start, end) {
            return Ok(Vec::new());
        }
        Ok(self
            .records
            .range::<str, _>(range_bounds(start, end))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// The write set of one invocation.
///
/// Reads go through the pending writes first, then to the backing store. Nothing
/// reaches the backing store before [`Transaction::commit`]; dropping the
/// transaction discards every write.
pub struct Transaction<'s, W: WorldState + ?Sized> {
    name: String,
    backing: &'s mut W,
    writes: WriteSet,
    committed: bool,
}

impl<'s, W: WorldState + ?Sized> Transaction<'s, W> {
    pub fn begin(name: &str, backing: &'s mut W) -> Transaction<'s, W> {
        debug!("Transaction {}: begin", name);
        Transaction {
            name: name.to_string(),
            backing,
            writes: BTreeMap::new(),
            committed: false,
        }
    }

    /// The number of keys this transaction will put or delete.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Applies the write set to the backing store, all of it or nothing.
    pub fn commit(mut self) -> Result<(), StoreError> {
        let writes = std::mem::take(&mut self.writes);
        let count = writes.len();
        self.backing.apply(&writes)?;
        self.committed = true;
        info!("Transaction {}: committed {} write(s)", self.name, count);
        Ok(())
    }
}

impl<'s, W: WorldState + ?Sized> Drop for Transaction<'s, W> {
    fn drop(&mut self) {
        if !self.committed && !self.writes.is_empty() {
            warn!(
                "Transaction {}: discarding {} uncommitted write(s)",
                self.name,
                self.writes.len()
            );
        }
    }
}

impl<'s, W: WorldState + ?Sized> WorldState for Transaction<'s, W> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match self.writes.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => self.backing.get_state(key),
        }
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.writes.insert(key.to_string(), Some(value.to_vec()));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), StoreError> {
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StoreError> {
        let mut merged: BTreeMap<String, Vec<u8>> = self
            .backing
            .get_state_by_range(start, end)?
            .into_iter()
            .collect();
        if !is_inverted(start, end) {
            for (key, pending) in self.writes.range::<str, _>(range_bounds(start, end)) {
                match pending {
                    Some(v) => {
                        merged.insert(key.clone(), v.clone());
                    }
                    None => {
                        merged.remove(key);
                    }
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(keys: &[&str]) -> MemoryWorldState {
        let mut ws = MemoryWorldState::new();
        for k in keys {
            ws.put_state(k, k.as_bytes()).unwrap();
        }
        ws
    }

    fn keys(kvs: &[KeyValue]) -> Vec<&str> {
        kvs.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn range_scan_bounds() {
        let ws = store_with(&["c", "a", "b", "d"]);
        assert_eq!(keys(&ws.get_state_by_range("", "").unwrap()), ["a", "b", "c", "d"]);
        assert_eq!(keys(&ws.get_state_by_range("b", "d").unwrap()), ["b", "c"]);
        assert_eq!(keys(&ws.get_state_by_range("b", "").unwrap()), ["b", "c", "d"]);
        assert_eq!(keys(&ws.get_state_by_range("", "b").unwrap()), ["a"]);
        assert!(ws.get_state_by_range("d", "a").unwrap().is_empty());
    }

    #[test]
    fn missing_keys_are_not_errors() {
        let mut ws = MemoryWorldState::new();
        assert_eq!(ws.get_state("nope").unwrap(), None);
        ws.del_state("nope").unwrap();
    }

    #[test]
    fn transaction_reads_its_own_writes() {
        let mut ws = store_with(&["a", "b"]);
        let mut txn = Transaction::begin("test", &mut ws);
        txn.put_state("c", b"new").unwrap();
        txn.del_state("a").unwrap();
        assert_eq!(txn.get_state("c").unwrap(), Some(b"new".to_vec()));
        assert_eq!(txn.get_state("a").unwrap(), None);
        assert_eq!(keys(&txn.get_state_by_range("", "").unwrap()), ["b", "c"]);
        assert_eq!(txn.pending_writes(), 2);
    }

    #[test]
    fn dropped_transaction_leaves_store_untouched() {
        let mut ws = store_with(&["a"]);
        {
            let mut txn = Transaction::begin("test", &mut ws);
            txn.put_state("b", b"b").unwrap();
            txn.del_state("a").unwrap();
        }
        assert_eq!(ws, store_with(&["a"]));
    }

    #[test]
    fn commit_applies_puts_and_deletes() {
        let mut ws = store_with(&["a"]);
        let mut txn = Transaction::begin("test", &mut ws);
        txn.put_state("b", b"b").unwrap();
        txn.del_state("a").unwrap();
        txn.commit().unwrap();
        assert_eq!(ws, store_with(&["b"]));
    }

    /// Fails every put of one key.
    struct FailingKey {
        inner: MemoryWorldState,
        key: &'static str,
    }

    impl WorldState for FailingKey {
        fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.get_state(key)
        }

        fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
            if key == self.key {
                return Err(StoreError::Write {
                    key: key.to_string(),
                    message: "quota exceeded".to_string(),
                });
            }
            self.inner.put_state(key, value)
        }

        fn del_state(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.del_state(key)
        }

        fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StoreError> {
            self.inner.get_state_by_range(start, end)
        }
    }

    #[test]
    fn failed_commit_restores_puts_and_deletes() {
        let mut ws = FailingKey {
            inner: store_with(&["b"]),
            key: "c",
        };
        let mut txn = Transaction::begin("test", &mut ws);
        txn.put_state("a", b"a").unwrap();
        txn.del_state("b").unwrap();
        txn.put_state("c", b"c").unwrap();
        assert!(txn.commit().is_err());
        assert_eq!(ws.inner, store_with(&["b"]));
    }

    #[test]
    fn failed_voter_write_undoes_the_ballot_write() {
        let mut ws = FailingKey {
            inner: MemoryWorldState::new(),
            key: "b-voter",
        };
        let mut txn = Transaction::begin("test", &mut ws);
        txn.put_state("a-ballot", b"ballot").unwrap();
        txn.put_state("b-voter", b"voter").unwrap();
        assert!(txn.commit().is_err());
        assert!(ws.inner.is_empty());
    }
}
