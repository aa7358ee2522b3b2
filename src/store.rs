use bytes::Bytes;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;
use thiserror::Error as ThisError;

/// More shards means less lock contention at a small memory cost.
const NUM_SHARDS: usize = 16;

/// Errors a store operation can report. Both render as the exact message the
/// wire protocol expects, so handlers forward them verbatim as error replies.
#[derive(Debug, ThisError, PartialEq)]
pub enum StoreError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,
}

/// The payload of a stored record. Only `String` and `List` are reachable
/// from the command surface; the remaining variants exist so a command
/// touching a key of another kind reports a type mismatch instead of
/// silently coercing the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(Bytes),
    List(VecDeque<Bytes>),
    Set(HashSet<Bytes>),
    SortedSet(BTreeMap<String, f64>),
    Hash(HashMap<String, Bytes>),
}

/// A store entry: typed payload plus an optional absolute expiry timestamp.
/// `SystemTime` rather than `Instant` because EXAT/PXAT are unix times.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub value: Value,
    pub expires_at: Option<SystemTime>,
}

impl Record {
    pub fn string(data: Bytes, expires_at: Option<SystemTime>) -> Record {
        Record {
            value: Value::String(data),
            expires_at,
        }
    }

    fn is_expired(&self, now: SystemTime) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// Which side of a list a push targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Side {
    Front,
    Back,
}

/// Existence precondition for a conditional write (SET NX / XX).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetMode {
    Any,
    IfAbsent,
    IfPresent,
}

/// A concurrent mapping from key to typed, optionally-expiring record.
///
/// Keys are hashed across a fixed number of shards, each guarded by its own
/// mutex, so writers on different keys rarely contend while read-modify-write
/// operations on one key stay atomic: every composite operation runs entirely
/// under its key's shard guard.
///
/// Expiry is lazy. A record past its deadline is removed by the next
/// operation that observes it; there is no background sweeper.
///
/// The handle is cheap to clone and share across connection tasks.
#[derive(Clone)]
pub struct Store {
    shards: Arc<Vec<Mutex<HashMap<String, Record>>>>,
}

impl Store {
    pub fn new() -> Store {
        let shards = (0..NUM_SHARDS).map(|_| Mutex::new(HashMap::new())).collect();
        Store {
            shards: Arc::new(shards),
        }
    }

    fn shard(&self, key: &str) -> MutexGuard<'_, HashMap<String, Record>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.shards.len();

        // A poisoned shard means a handler panicked mid-write; propagating the
        // panic to every other connection is the only sound option.
        self.shards[index].lock().unwrap()
    }

    /// Removes the key if its deadline has passed. Runs under the caller's
    /// shard guard, which is what makes expiry atomic with the operation
    /// that observed it.
    fn purge_expired(shard: &mut HashMap<String, Record>, key: &str, now: SystemTime) {
        if shard.get(key).is_some_and(|record| record.is_expired(now)) {
            shard.remove(key);
        }
    }

    /// Returns the record if present and not expired; an expired record is
    /// evicted and reported absent.
    pub fn get(&self, key: &str) -> Option<Record> {
        let now = SystemTime::now();
        let mut shard = self.shard(key);
        Self::purge_expired(&mut shard, key, now);
        shard.get(key).cloned()
    }

    /// Unconditional insert/replace.
    pub fn set(&self, key: String, record: Record) {
        let mut shard = self.shard(&key);
        shard.insert(key, record);
    }

    /// Conditional insert/replace of a string record. The existence check and
    /// the write happen under one shard guard, so NX/XX cannot race another
    /// writer on the same key. Returns whether the write happened.
    pub fn set_string(
        &self,
        key: String,
        data: Bytes,
        expires_at: Option<SystemTime>,
        mode: SetMode,
    ) -> bool {
        let now = SystemTime::now();
        let mut shard = self.shard(&key);
        Self::purge_expired(&mut shard, &key, now);

        let exists = shard.contains_key(&key);
        match mode {
            SetMode::Any => {}
            SetMode::IfAbsent if exists => return false,
            SetMode::IfPresent if !exists => return false,
            _ => {}
        }

        shard.insert(key, Record::string(data, expires_at));
        true
    }

    /// Removes the key, reporting whether anything was removed. An expired
    /// record counts as already absent.
    pub fn remove(&self, key: &str) -> bool {
        let now = SystemTime::now();
        let mut shard = self.shard(key);
        Self::purge_expired(&mut shard, key, now);
        shard.remove(key).is_some()
    }

    /// Same presence/expiry semantics as [`Store::get`], without cloning the
    /// payload.
    pub fn exists(&self, key: &str) -> bool {
        let now = SystemTime::now();
        let mut shard = self.shard(key);
        Self::purge_expired(&mut shard, key, now);
        shard.contains_key(key)
    }

    /// Treats the key's string payload as a base-10 signed integer (0 when
    /// absent), adds `delta`, and stores the result back as a fresh string
    /// record. The whole read-modify-write runs under one shard guard.
    pub fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let now = SystemTime::now();
        let mut shard = self.shard(key);
        Self::purge_expired(&mut shard, key, now);

        let current = match shard.get(key) {
            None => 0,
            Some(Record {
                value: Value::String(data),
                ..
            }) => std::str::from_utf8(data)
                .map_err(|_| StoreError::NotAnInteger)?
                .parse::<i64>()
                .map_err(|_| StoreError::NotAnInteger)?,
            Some(_) => return Err(StoreError::WrongType),
        };

        let next = current.checked_add(delta).ok_or(StoreError::NotAnInteger)?;
        shard.insert(
            key.to_string(),
            Record::string(next.to_string().into(), None),
        );

        Ok(next)
    }

    /// Pushes `elements` onto the list at `key`, creating it if absent. A
    /// `Front` push splices the whole block before the existing elements,
    /// preserving the left-to-right order of the arguments. Returns the
    /// resulting list length.
    pub fn push(&self, key: &str, elements: Vec<Bytes>, side: Side) -> Result<usize, StoreError> {
        let now = SystemTime::now();
        let mut shard = self.shard(key);
        Self::purge_expired(&mut shard, key, now);

        let mut list = match shard.get(key) {
            None => VecDeque::new(),
            Some(Record {
                value: Value::List(list),
                ..
            }) => list.clone(),
            Some(_) => return Err(StoreError::WrongType),
        };

        match side {
            Side::Back => list.extend(elements),
            Side::Front => {
                for element in elements.into_iter().rev() {
                    list.push_front(element);
                }
            }
        }

        let length = list.len();
        shard.insert(
            key.to_string(),
            Record {
                value: Value::List(list),
                expires_at: None,
            },
        );

        Ok(length)
    }

    /// The inclusive `[start, stop]` slice of the list at `key`. Negative
    /// indices count from the end; both ends are clamped to the list bounds.
    /// An absent key or an empty normalized range yields an empty vec.
    pub fn range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>, StoreError> {
        let now = SystemTime::now();
        let mut shard = self.shard(key);
        Self::purge_expired(&mut shard, key, now);

        let list = match shard.get(key) {
            None => return Ok(Vec::new()),
            Some(Record {
                value: Value::List(list),
                ..
            }) => list,
            Some(_) => return Err(StoreError::WrongType),
        };

        let len = list.len() as i64;
        let mut start = if start < 0 { len + start } else { start };
        let mut stop = if stop < 0 { len + stop } else { stop };

        start = start.max(0);
        stop = stop.min(len - 1);

        if start > stop || start >= len {
            return Ok(Vec::new());
        }

        Ok(list
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .collect())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
