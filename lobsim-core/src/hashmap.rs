//! Flat open-addressing hash map (linear probing, tombstones) used for the
//! order-id to arena-handle index.
//!
//! Capacity is fixed at construction (rounded up to a power of two) and the
//! map never resizes; callers size it generously up front, matching the
//! reference implementation's single large fixed table.

const EMPTY: u8 = 0;
const OCCUPIED: u8 = 1;
const DELETED: u8 = 2;

struct Slot<K, V> {
    state: u8,
    key: K,
    value: V,
}

/// Fixed-capacity open-addressed map from `K` (a hashable, `Eq` key such as
/// an order id) to `V` (an arena handle).
pub struct FlatHashMap<K, V> {
    slots: Vec<Slot<K, V>>,
    mask: u64,
    len: usize,
}

impl<K: Copy + Eq + std::hash::Hash + Default, V: Copy + Default> FlatHashMap<K, V> {
    pub fn new(capacity_hint: usize) -> Self {
        let capacity = capacity_hint.next_power_of_two().max(16);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot {
            state: EMPTY,
            key: K::default(),
            value: V::default(),
        });
        Self {
            slots,
            mask: (capacity - 1) as u64,
            len: 0,
        }
    }

    fn hash(&self, key: &K) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `key -> value`, overwriting any prior value for `key`.
    /// Returns `false` if the table is full and the key is not already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut idx = self.hash(&key) & self.mask;
        let mut first_tombstone: Option<u64> = None;
        for _ in 0..=self.mask {
            let slot = &self.slots[idx as usize];
            match slot.state {
                EMPTY => {
                    let target = first_tombstone.unwrap_or(idx);
                    let slot = &mut self.slots[target as usize];
                    slot.state = OCCUPIED;
                    slot.key = key;
                    slot.value = value;
                    self.len += 1;
                    return true;
                }
                DELETED => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(idx);
                    }
                }
                OCCUPIED if slot.key == key => {
                    self.slots[idx as usize].value = value;
                    return true;
                }
                _ => {}
            }
            idx = (idx + 1) & self.mask;
        }
        false
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut idx = self.hash(key) & self.mask;
        for _ in 0..=self.mask {
            let slot = &self.slots[idx as usize];
            match slot.state {
                EMPTY => return None,
                OCCUPIED if slot.key == *key => return Some(slot.value),
                _ => {}
            }
            idx = (idx + 1) & self.mask;
        }
        None
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let mut idx = self.hash(key) & self.mask;
        for _ in 0..=self.mask {
            let slot = &self.slots[idx as usize];
            match slot.state {
                EMPTY => return None,
                OCCUPIED if slot.key == *key => {
                    let value = slot.value;
                    let slot = &mut self.slots[idx as usize];
                    slot.state = DELETED;
                    slot.key = K::default();
                    slot.value = V::default();
                    self.len -= 1;
                    return Some(value);
                }
                _ => {}
            }
            idx = (idx + 1) & self.mask;
        }
        None
    }
}
