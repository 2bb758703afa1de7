//! Periodic tick dispatch to a single observer.
//!
//! The `TickDispatcher` owns the set of active symbols and, while running, fires a
//! cycle every `interval` on a dedicated worker thread. Each cycle snapshots the
//! active set, asks the [`TickGenerator`] for one tick per symbol and hands every
//! tick to the registered observer, if there is one.
//!
//! Lifecycle:
//! - `Idle` — no worker; `start` spawns one and moves to `Running`.
//! - `Running` — a `crossbeam_channel::tick` timer drives cycles; `stop` signals the
//!   worker over a channel, joins it and moves back to `Idle`.
//! - Once `stop` has returned, the observer is never called again by that run.
//!   Dropping the dispatcher stops it.
//!
//! Failure model:
//! - A generator error or panic only skips that symbol for this cycle.
//! - An observer panic is caught and logged; the worker keeps cycling.
//!
//! Locks are never held across each other except observer → (whatever the observer
//! locks). The observer must therefore not call back into `set_observer`,
//! `clear_observer` or `ObserverHandle::cancel` of the same dispatcher.

use crossbeam_channel::{Receiver, Sender, bounded, select};
use log::{debug, error, info, trace, warn};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use strum_macros::Display;
use watchlist_common::{FeedConfig, Result, Symbol, Tick, WatchlistError};

use crate::generator::{self, TickGenerator};
use crate::lock;

/// Callback receiving every delivered tick.
pub type Observer = Box<dyn FnMut(&Tick) + Send>;

/// Whether a worker is currently scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DispatcherState {
    /// No cycle scheduled.
    Idle,
    /// Worker thread firing cycles.
    Running,
}

/// Outcome counters of one cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Ticks produced by the generator.
    pub generated: usize,
    /// Ticks handed to the observer without it panicking.
    pub delivered: usize,
    /// Symbols whose tick generation failed.
    pub failed: usize,
}

struct ObserverSlot {
    generation: u64,
    callback: Option<Observer>,
}

struct Shared {
    active: Mutex<HashSet<Symbol>>,
    observer: Mutex<ObserverSlot>,
    generator: Mutex<Box<dyn TickGenerator>>,
    stopped: AtomicBool,
}

impl Shared {
    fn run_cycle(&self) -> CycleReport {
        let snapshot: Vec<Symbol> = lock(&self.active).iter().cloned().collect();
        let mut report = CycleReport::default();

        for symbol in &snapshot {
            if self.stopped.load(Ordering::Acquire) {
                break;
            }
            let tick = match self.generate(symbol) {
                Ok(tick) => tick,
                Err(e) => {
                    warn!("Skipping {} this cycle: {}", symbol, e);
                    report.failed += 1;
                    continue;
                }
            };
            report.generated += 1;
            if self.deliver(&tick) {
                report.delivered += 1;
            }
        }
        report
    }

    fn generate(&self, symbol: &Symbol) -> Result<Tick> {
        let mut generator = lock(&self.generator);
        match panic::catch_unwind(AssertUnwindSafe(|| generator.generate(symbol))) {
            Ok(result) => result,
            Err(_) => Err(WatchlistError::GeneratorPanicked(symbol.to_string())),
        }
    }

    fn deliver(&self, tick: &Tick) -> bool {
        let mut slot = lock(&self.observer);
        if self.stopped.load(Ordering::Acquire) {
            return false;
        }
        let Some(callback) = slot.callback.as_mut() else {
            trace!("No observer, discarding tick for {}", tick.symbol);
            return false;
        };
        trace!(
            "Tick {} price={:.2} volume={}",
            tick.symbol, tick.price, tick.volume
        );
        if panic::catch_unwind(AssertUnwindSafe(|| callback(tick))).is_err() {
            warn!("Observer panicked while handling tick for {}", tick.symbol);
            return false;
        }
        true
    }
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Drives periodic tick generation for the active symbols.
pub struct TickDispatcher {
    shared: Arc<Shared>,
    interval: Duration,
    worker: Option<Worker>,
}

impl TickDispatcher {
    /// Create an idle dispatcher. A zero `interval` is refused by `start`.
    pub fn new(interval: Duration, generator: Box<dyn TickGenerator>) -> Self {
        Self {
            shared: Arc::new(Shared {
                active: Mutex::new(HashSet::new()),
                observer: Mutex::new(ObserverSlot {
                    generation: 0,
                    callback: None,
                }),
                generator: Mutex::new(generator),
                stopped: AtomicBool::new(false),
            }),
            interval,
            worker: None,
        }
    }

    /// Create an idle dispatcher with the interval and built-in generator from `config`.
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.interval(), generator::from_config(config)))
    }

    /// Spawn the worker thread. Fails with `AlreadyRunning` if it is already up
    /// and with `InvalidConfig` if the interval is zero.
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Err(WatchlistError::AlreadyRunning);
        }
        if self.interval.is_zero() {
            return Err(WatchlistError::InvalidConfig(
                "dispatch interval must be greater than zero".to_string(),
            ));
        }
        self.shared.stopped.store(false, Ordering::Release);

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        let handle = thread::Builder::new()
            .name("tick-dispatcher".to_string())
            .spawn(move || run_worker(shared, interval, stop_rx))?;

        self.worker = Some(Worker { stop_tx, handle });
        info!("Tick dispatcher started (interval {:?})", interval);
        Ok(())
    }

    /// Stop the worker and wait for it to exit. Calling it again is a no-op.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.shared.stopped.store(true, Ordering::Release);
        let _ = worker.stop_tx.send(());

        if worker.handle.thread().id() == thread::current().id() {
            return;
        }
        if worker.handle.join().is_err() {
            error!("Tick dispatcher worker panicked");
        }
        info!("Tick dispatcher stopped");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DispatcherState {
        if self.worker.is_some() {
            DispatcherState::Running
        } else {
            DispatcherState::Idle
        }
    }

    /// Period between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Make `symbol` eligible for ticks from the next cycle on.
    /// Returns `false` if it was already active.
    pub fn activate(&self, symbol: Symbol) -> bool {
        let added = lock(&self.shared.active).insert(symbol.clone());
        if added {
            debug!("Activated {}", symbol);
        }
        added
    }

    /// Stop generating ticks for `symbol` from the next cycle on.
    /// Returns `false` if it was not active.
    pub fn deactivate(&self, symbol: &str) -> bool {
        let removed = lock(&self.shared.active).remove(symbol);
        if removed {
            debug!("Deactivated {}", symbol);
        }
        removed
    }

    /// Whether `symbol` is in the active set.
    pub fn is_active(&self, symbol: &str) -> bool {
        lock(&self.shared.active).contains(symbol)
    }

    /// Copy of the active set, in no particular order.
    pub fn active_symbols(&self) -> Vec<Symbol> {
        lock(&self.shared.active).iter().cloned().collect()
    }

    /// Register the single observer, replacing any previous one.
    ///
    /// Dropping or cancelling the returned handle unregisters this observer,
    /// unless it has been replaced in the meantime.
    pub fn set_observer<F>(&self, observer: F) -> ObserverHandle
    where
        F: FnMut(&Tick) + Send + 'static,
    {
        let mut slot = lock(&self.shared.observer);
        slot.generation += 1;
        slot.callback = Some(Box::new(observer));
        ObserverHandle {
            shared: Arc::downgrade(&self.shared),
            generation: slot.generation,
        }
    }

    /// Unregister the observer. Cycles keep running and their ticks are discarded.
    pub fn clear_observer(&self) {
        let mut slot = lock(&self.shared.observer);
        slot.generation += 1;
        slot.callback = None;
    }

    /// Whether an observer is registered.
    pub fn has_observer(&self) -> bool {
        lock(&self.shared.observer).callback.is_some()
    }

    /// Run one cycle right now on the calling thread.
    pub fn run_cycle(&self) -> CycleReport {
        self.shared.run_cycle()
    }
}

impl Drop for TickDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(shared: Arc<Shared>, interval: Duration, stop_rx: Receiver<()>) {
    let ticker = crossbeam_channel::tick(interval);
    let mut cycles: u64 = 0;

    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                cycles += 1;
                let report = shared.run_cycle();
                trace!("Cycle {} finished: {:?}", cycles, report);
            }
        }
    }
    debug!("Dispatcher worker exiting after {} cycles", cycles);
}

/// Cancellation token for an observer registration.
#[must_use = "dropping the handle unregisters the observer"]
pub struct ObserverHandle {
    shared: Weak<Shared>,
    generation: u64,
}

impl ObserverHandle {
    /// Unregister the observer if it is still the current one.
    pub fn cancel(self) {}

    /// Whether this registration is still the dispatcher's observer.
    pub fn is_current(&self) -> bool {
        self.shared.upgrade().is_some_and(|shared| {
            let slot = lock(&shared.observer);
            slot.generation == self.generation && slot.callback.is_some()
        })
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut slot = lock(&shared.observer);
        if slot.generation == self.generation {
            slot.callback = None;
        }
    }
}
