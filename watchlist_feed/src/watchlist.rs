//! Registry and dispatcher kept in lockstep.
//!
//! `Watchlist` pairs a [`SubscriptionRegistry`] with a [`TickDispatcher`] so that
//! subscribing and unsubscribing update both in one call. While running, every
//! delivered tick is written into the registry; ticks for symbols that were
//! unsubscribed in the meantime are dropped there.

use crossbeam_channel::Sender;
use log::{debug, trace};
use std::sync::{Arc, Mutex};
use watchlist_common::{FeedConfig, Result, Symbol, Tick, WatchlistError};

use crate::dispatcher::{CycleReport, DispatcherState, ObserverHandle, TickDispatcher};
use crate::generator::{self, TickGenerator};
use crate::lock;
use crate::registry::{Entry, SubscriptionRegistry};

/// Subscribed symbols with their latest prices, fed by a tick dispatcher.
pub struct Watchlist {
    registry: Arc<Mutex<SubscriptionRegistry>>,
    dispatcher: TickDispatcher,
    observer: Option<ObserverHandle>,
}

impl Watchlist {
    /// Build an idle watchlist from `config` using its built-in generator.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        Self::with_generator(config, generator::from_config(config))
    }

    /// Build an idle watchlist that takes its interval from `config` and its
    /// ticks from `generator`. The generator settings in `config` are ignored.
    pub fn with_generator(config: &FeedConfig, generator: Box<dyn TickGenerator>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: Arc::new(Mutex::new(SubscriptionRegistry::new())),
            dispatcher: TickDispatcher::new(config.interval(), generator),
            observer: None,
        })
    }

    /// Add `symbol` to the registry and the active set.
    ///
    /// Returns `false` and changes nothing if it is already subscribed.
    pub fn subscribe(&self, symbol: Symbol) -> bool {
        let mut registry = lock(&self.registry);
        if !registry.insert(symbol.clone()) {
            return false;
        }
        debug!("Subscribed {}", symbol);
        self.dispatcher.activate(symbol);
        true
    }

    /// Remove `symbol` from the active set and the registry.
    ///
    /// Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, symbol: &str) -> bool {
        let mut registry = lock(&self.registry);
        self.dispatcher.deactivate(symbol);
        let removed = registry.remove(symbol);
        if removed {
            debug!("Unsubscribed {}", symbol);
        }
        removed
    }

    /// Route ticks into the registry and start the dispatcher.
    ///
    /// Each tick that lands on a subscribed symbol is also forwarded to `updates`,
    /// if given, after the registry has been updated.
    pub fn start(&mut self, updates: Option<Sender<Tick>>) -> Result<()> {
        if self.dispatcher.state() == DispatcherState::Running {
            return Err(WatchlistError::AlreadyRunning);
        }
        let registry = Arc::clone(&self.registry);
        let handle = self.dispatcher.set_observer(move |tick: &Tick| {
            let applied = lock(&registry).update(tick.symbol.as_str(), tick.price, tick.volume);
            if !applied {
                trace!("Dropping late tick for {}", tick.symbol);
                return;
            }
            if let Some(tx) = &updates {
                let _ = tx.send(tick.clone());
            }
        });
        self.observer = Some(handle);
        self.dispatcher.start()
    }

    /// Stop the dispatcher and unregister the routing observer. Idempotent.
    pub fn stop(&mut self) {
        self.dispatcher.stop();
        self.observer = None;
    }

    /// Run one dispatch cycle on the calling thread.
    ///
    /// Ticks only reach the registry once `start` has installed the routing observer.
    pub fn refresh(&self) -> CycleReport {
        self.dispatcher.run_cycle()
    }

    /// Snapshot of all entries, most recently subscribed first.
    pub fn rows(&self) -> Vec<Entry> {
        lock(&self.registry).enumerate().cloned().collect()
    }

    /// Snapshot of one entry.
    pub fn get(&self, symbol: &str) -> Option<Entry> {
        lock(&self.registry).get(symbol).cloned()
    }

    /// Whether `symbol` is subscribed.
    pub fn contains(&self, symbol: &str) -> bool {
        lock(&self.registry).has(symbol)
    }

    /// Whether `symbol` receives ticks.
    pub fn is_active(&self, symbol: &str) -> bool {
        self.dispatcher.is_active(symbol)
    }

    /// Number of subscribed symbols.
    pub fn len(&self) -> usize {
        lock(&self.registry).len()
    }

    /// Whether nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        lock(&self.registry).is_empty()
    }

    /// Lifecycle state of the underlying dispatcher.
    pub fn state(&self) -> DispatcherState {
        self.dispatcher.state()
    }
}
