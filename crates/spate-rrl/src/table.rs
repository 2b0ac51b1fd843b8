//! Sharded account table.
//!
//! A fixed array of 256 independently-locked shards, each a bounded map from
//! equivalence-class token to [`Account`]. Tokens are routed to shards by
//! FNV-1a; operations on disjoint shards proceed fully in parallel.
//!
//! Capacity pressure is handled by opportunistic eviction: when a shard is
//! full, the first scanned entry accepted by the eviction predicate is
//! removed to make room. The predicate is installed once at startup; until
//! then (and in the uninstalled fallback) any entry is considered evictable.

use crate::account::Account;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Number of shards in a table.
pub const NUM_SHARDS: usize = 256;

/// Minimum per-shard capacity, regardless of the configured table size.
const MIN_SHARD_SIZE: usize = 4;

/// Decides whether a scanned account may be discarded to make room.
pub type EvictFn = Box<dyn Fn(&Account) -> bool + Send + Sync>;

/// Errors from table mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The shard is at capacity and no entry was evictable.
    #[error("failed to add entry, shard full")]
    ShardFull,
}

/// A concurrent token-to-account map with fixed capacity and eviction.
pub struct Table {
    shards: Vec<Shard>,
    evict: OnceCell<EvictFn>,
}

struct Shard {
    entries: RwLock<HashMap<String, Account>>,
    capacity: usize,
}

impl Table {
    /// Creates a table holding at most `max_size` accounts in total,
    /// divided evenly across the shards.
    pub fn new(max_size: usize) -> Self {
        let capacity = (max_size / NUM_SHARDS).max(MIN_SHARD_SIZE);
        let shards = (0..NUM_SHARDS)
            .map(|_| Shard {
                entries: RwLock::new(HashMap::new()),
                capacity,
            })
            .collect();
        Self {
            shards,
            evict: OnceCell::new(),
        }
    }

    /// Installs the eviction predicate. The first call wins; later calls
    /// are ignored.
    pub fn set_evict(&self, predicate: impl Fn(&Account) -> bool + Send + Sync + 'static) {
        let _ = self.evict.set(Box::new(predicate));
    }

    fn shard(&self, key: &str) -> &Shard {
        let index = (fnv1a_64(key.as_bytes()) & (NUM_SHARDS as u64 - 1)) as usize;
        &self.shards[index]
    }

    /// Inserts an account, overwriting any existing entry for `key`.
    ///
    /// If the shard is full, one evictable entry is discarded first; when
    /// nothing is evictable the insertion fails.
    pub fn add(&self, key: impl Into<String>, account: Account) -> Result<(), TableError> {
        let key = key.into();
        let shard = self.shard(&key);
        let mut entries = shard.entries.write();
        if entries.len() >= shard.capacity && !evict_one(&mut entries, self.evict.get()) {
            return Err(TableError::ShardFull);
        }
        entries.insert(key, account);
        Ok(())
    }

    /// Returns a snapshot of the account stored under `key`.
    pub fn get(&self, key: &str) -> Option<Account> {
        self.shard(key).entries.read().get(key).copied()
    }

    /// Removes the entry stored under `key`, if any.
    pub fn remove(&self, key: &str) {
        self.shard(key).entries.write().remove(key);
    }

    /// Runs `update` on the live account under `key`, or installs the
    /// account produced by `insert` when the key is absent.
    ///
    /// The whole operation holds the shard's write lock, so the read,
    /// mutation, and write-back of an account never interleave with other
    /// callers. Returns `Some` with the updater's result, or `None` when a
    /// new account was inserted.
    pub fn update_or_insert<R>(
        &self,
        key: &str,
        update: impl FnOnce(&mut Account) -> R,
        insert: impl FnOnce() -> Account,
    ) -> Result<Option<R>, TableError> {
        let shard = self.shard(key);
        let mut entries = shard.entries.write();

        if let Some(account) = entries.get_mut(key) {
            return Ok(Some(update(account)));
        }

        if entries.len() >= shard.capacity && !evict_one(&mut entries, self.evict.get()) {
            return Err(TableError::ShardFull);
        }
        entries.insert(key.to_string(), insert());
        Ok(None)
    }

    /// Returns an estimate of the number of accounts in the table.
    ///
    /// Shards are counted one at a time, so concurrent mutations on shards
    /// already counted are not reflected.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.entries.read().len()).sum()
    }

    /// Returns true if no shard holds any account.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.entries.read().is_empty())
    }
}

/// Removes the first scanned entry accepted by the predicate. With no
/// predicate installed any entry qualifies. Returns false if the scan found
/// nothing evictable.
fn evict_one(entries: &mut HashMap<String, Account>, predicate: Option<&EvictFn>) -> bool {
    let victim = entries
        .iter()
        .find(|(_, account)| predicate.map_or(true, |p| p(account)))
        .map(|(key, _)| key.clone());
    match victim {
        Some(key) => {
            entries.remove(&key);
            true
        }
        None => false,
    }
}

/// FNV-1a 64-bit hash, used to route tokens to shards.
fn fnv1a_64(data: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for &byte in data {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
