//! Order-preserving subscription registry.
//!
//! The registry keeps one `Entry` per subscribed symbol and exposes them
//! newest-first. It provides three core operations in O(1):
//!
//! - `SubscriptionRegistry::insert(symbol)` — place a fresh entry at the front.
//! - `SubscriptionRegistry::remove(symbol)` — unlink an entry from anywhere in the order.
//! - `SubscriptionRegistry::update(symbol, price, volume)` — overwrite an entry in place.
//!
//! Design notes:
//! - Entries live in a slot arena (`Vec<Option<Node>>`) and form a doubly-linked
//!   list through slot indices. A `HashMap<Symbol, usize>` maps each symbol to its
//!   slot. Freed slots are recycled on the next insert.
//! - The index and the linked list always hold exactly the same symbols; every
//!   mutating method restores that before it returns.
//! - The registry is not synchronized; if it is shared across threads, wrap it
//!   with a synchronization primitive (e.g., `Mutex`).
//! - Nothing here fails: duplicates and unknown symbols are reported through the
//!   `bool`/`Option` return values, since both are expected races with the
//!   dispatcher.

use serde::Serialize;
use std::collections::HashMap;
use watchlist_common::Symbol;

use crate::direction::PriceDirection;

/// Stored state for one subscribed symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Unique key of the entry.
    pub symbol: Symbol,
    /// Latest price, `0.0` until the first update.
    pub price: f64,
    /// Price before the latest update, `None` until the first update.
    pub previous_price: Option<f64>,
    /// Latest volume, `0` until the first update.
    pub volume: u32,
}

impl Entry {
    fn new(symbol: Symbol) -> Self {
        Entry {
            symbol,
            price: 0.0,
            previous_price: None,
            volume: 0,
        }
    }

    fn apply(&mut self, price: f64, volume: u32) {
        self.previous_price = Some(self.price);
        self.price = price;
        self.volume = volume;
    }

    /// Movement of the latest update, used for coloring.
    pub fn direction(&self) -> PriceDirection {
        PriceDirection::between(self.previous_price, self.price)
    }
}

struct Node {
    entry: Entry,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Symbol → entry map that remembers insertion order, newest first.
#[derive(Default)]
pub struct SubscriptionRegistry {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<Symbol, usize>,
    head: Option<usize>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `symbol` at the front with zeroed price and volume.
    ///
    /// Returns `false` and leaves the existing entry untouched if the symbol is
    /// already present.
    pub fn insert(&mut self, symbol: impl Into<Symbol>) -> bool {
        let symbol = symbol.into();
        if self.index.contains_key(&symbol) {
            return false;
        }

        let node = Node {
            entry: Entry::new(symbol.clone()),
            prev: None,
            next: self.head,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        if let Some(old_head) = self.head.and_then(|h| self.node_mut(h)) {
            old_head.prev = Some(slot);
        }
        self.head = Some(slot);
        self.index.insert(symbol, slot);
        true
    }

    /// Drop `symbol` from the registry. Returns `false` if it was not present.
    ///
    /// The relative order of the remaining entries is unchanged.
    pub fn remove(&mut self, symbol: &str) -> bool {
        let Some(slot) = self.index.remove(symbol) else {
            return false;
        };
        let Some(node) = self.slots.get_mut(slot).and_then(Option::take) else {
            return false;
        };

        match node.prev {
            Some(prev) => {
                if let Some(prev_node) = self.node_mut(prev) {
                    prev_node.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        if let Some(next_node) = node.next.and_then(|n| self.node_mut(n)) {
            next_node.prev = node.prev;
        }
        self.free.push(slot);
        true
    }

    /// Overwrite price and volume of `symbol` in place, remembering the old price.
    ///
    /// Returns `false` if the symbol is not present, which happens when a tick
    /// was generated just before the symbol was removed.
    pub fn update(&mut self, symbol: &str, price: f64, volume: u32) -> bool {
        let Some(&slot) = self.index.get(symbol) else {
            return false;
        };
        match self.node_mut(slot) {
            Some(node) => {
                node.entry.apply(price, volume);
                true
            }
            None => false,
        }
    }

    /// Whether `symbol` is present.
    pub fn has(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    /// Read-only view of the entry for `symbol`.
    pub fn get(&self, symbol: &str) -> Option<&Entry> {
        let slot = *self.index.get(symbol)?;
        self.node(slot).map(|node| &node.entry)
    }

    /// Entries front to back: most recently inserted first.
    pub fn enumerate(&self) -> Iter<'_> {
        Iter {
            registry: self,
            cursor: self.head,
            remaining: self.index.len(),
        }
    }

    /// Symbols in the same order as [`Self::enumerate`].
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.enumerate().map(|entry| &entry.symbol)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
    }

    fn node(&self, slot: usize) -> Option<&Node> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, slot: usize) -> Option<&mut Node> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }
}

/// Iterator over registry entries, newest first.
pub struct Iter<'a> {
    registry: &'a SubscriptionRegistry,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.registry.node(self.cursor?)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a SubscriptionRegistry {
    type Item = &'a Entry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn order(registry: &SubscriptionRegistry) -> Vec<String> {
        registry
            .symbols()
            .map(|s| s.as_str().to_string())
            .collect()
    }

    /// Walks the list both ways and checks it against the index.
    fn assert_consistent(registry: &SubscriptionRegistry) {
        let listed: HashSet<&str> = registry.symbols().map(Symbol::as_str).collect();
        let indexed: HashSet<&str> = registry.index.keys().map(Symbol::as_str).collect();
        assert_eq!(listed, indexed);
        assert_eq!(registry.enumerate().count(), registry.len());

        let mut prev = None;
        let mut cursor = registry.head;
        while let Some(slot) = cursor {
            let node = registry.node(slot).expect("linked slot must be occupied");
            assert_eq!(node.prev, prev);
            assert_eq!(registry.index[&node.entry.symbol], slot);
            prev = Some(slot);
            cursor = node.next;
        }
    }

    #[test]
    fn scenario_btc_eth() {
        let mut registry = SubscriptionRegistry::new();
        assert!(registry.insert("BTC"));
        assert!(registry.insert("ETH"));
        assert_eq!(order(&registry), ["ETH", "BTC"]);

        assert!(registry.remove("ETH"));
        assert_eq!(order(&registry), ["BTC"]);

        assert!(registry.update("BTC", 10.0, 1));
        assert!(registry.update("BTC", 20.0, 1));
        let btc = registry.get("BTC").unwrap();
        assert_eq!(btc.previous_price, Some(10.0));
        assert_eq!(btc.price, 20.0);
        assert_eq!(btc.direction(), PriceDirection::Increase);
        assert_eq!(order(&registry), ["BTC"]);
    }

    #[test]
    fn fresh_entry_is_zeroed_and_neutral() {
        let mut registry = SubscriptionRegistry::new();
        registry.insert("AAA");
        let entry = registry.get("AAA").unwrap();
        assert_eq!(entry.price, 0.0);
        assert_eq!(entry.volume, 0);
        assert_eq!(entry.previous_price, None);
        assert_eq!(entry.direction(), PriceDirection::Neutral);
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let mut registry = SubscriptionRegistry::new();
        assert!(registry.insert("AAA"));
        registry.update("AAA", 5.0, 9);
        registry.insert("BBB");

        assert!(!registry.insert("AAA"));
        let entry = registry.get("AAA").unwrap();
        assert_eq!((entry.price, entry.volume, entry.previous_price), (5.0, 9, Some(0.0)));
        assert_eq!(order(&registry), ["BBB", "AAA"]);
    }

    #[test]
    fn remove_twice_returns_false_second_time() {
        let mut registry = SubscriptionRegistry::new();
        registry.insert("A");
        registry.insert("B");
        assert!(registry.remove("A"));
        let after_first = order(&registry);
        assert!(!registry.remove("A"));
        assert_eq!(order(&registry), after_first);
        assert_consistent(&registry);
    }

    #[test]
    fn unknown_update_is_reported() {
        let mut registry = SubscriptionRegistry::new();
        assert!(!registry.update("GONE", 1.0, 1));
        assert!(registry.get("GONE").is_none());
        assert!(!registry.has("GONE"));
    }

    #[test]
    fn update_keeps_position() {
        let mut registry = SubscriptionRegistry::new();
        for s in ["A", "B", "C", "D"] {
            registry.insert(s);
        }
        let before = order(&registry);
        registry.update("C", 3.0, 1);
        registry.update("A", 1.0, 1);
        assert_eq!(order(&registry), before);
    }

    #[test]
    fn removing_middle_head_and_tail_keeps_relative_order() {
        let mut registry = SubscriptionRegistry::new();
        for s in ["A", "B", "C", "D", "E"] {
            registry.insert(s);
        }
        registry.remove("C");
        assert_eq!(order(&registry), ["E", "D", "B", "A"]);
        registry.remove("E");
        assert_eq!(order(&registry), ["D", "B", "A"]);
        registry.remove("A");
        assert_eq!(order(&registry), ["D", "B"]);
        assert_consistent(&registry);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut registry = SubscriptionRegistry::new();
        registry.insert("A");
        registry.insert("B");
        registry.remove("A");
        registry.insert("C");
        assert_eq!(registry.slots.len(), 2);
        assert_eq!(order(&registry), ["C", "B"]);
        assert_consistent(&registry);
    }

    #[test]
    fn reinsert_after_remove_goes_to_front_with_fresh_state() {
        let mut registry = SubscriptionRegistry::new();
        registry.insert("A");
        registry.update("A", 7.0, 7);
        registry.insert("B");
        registry.remove("A");
        registry.insert("A");
        assert_eq!(order(&registry), ["A", "B"]);
        assert_eq!(registry.get("A").unwrap().previous_price, None);
    }

    #[test]
    fn clear_empties_everything() {
        let mut registry = SubscriptionRegistry::new();
        registry.insert("A");
        registry.insert("B");
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.enumerate().len(), 0);
        assert!(registry.insert("A"));
        assert_consistent(&registry);
    }

    #[test]
    fn random_operations_match_reference_model() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut registry = SubscriptionRegistry::new();
        let mut model: Vec<String> = Vec::new();

        for _ in 0..2_000 {
            let symbol = format!("S{}", rng.random_range(0..24));
            match rng.random_range(0..3) {
                0 => {
                    let inserted = registry.insert(symbol.as_str());
                    assert_eq!(inserted, !model.contains(&symbol));
                    if inserted {
                        model.insert(0, symbol);
                    }
                }
                1 => {
                    let position = model.iter().position(|s| *s == symbol);
                    assert_eq!(registry.remove(&symbol), position.is_some());
                    if let Some(position) = position {
                        model.remove(position);
                    }
                }
                _ => {
                    let price = rng.random_range(0.0..100.0);
                    assert_eq!(registry.update(&symbol, price, 1), model.contains(&symbol));
                }
            }
            assert_eq!(order(&registry), model);
            for symbol in &model {
                assert!(registry.has(symbol));
            }
        }
        assert_consistent(&registry);
    }
}
