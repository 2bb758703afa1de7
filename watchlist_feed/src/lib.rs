//! Live watchlist feed.
//!
//! This crate keeps an ordered set of subscribed symbols and refreshes their prices
//! from a periodic, in-process tick feed:
//! - `registry` — `SubscriptionRegistry`, newest-first entries with O(1) insert/remove/update.
//! - `direction` — `PriceDirection` derived from the previous and current price.
//! - `generator` — the `TickGenerator` trait and the built-in synthetic generators.
//! - `dispatcher` — `TickDispatcher`, a stoppable worker pushing ticks to one observer.
//! - `watchlist` — `Watchlist`, registry and dispatcher updated together.
//!
//! ```no_run
//! use watchlist_common::{FeedConfig, Symbol};
//! use watchlist_feed::Watchlist;
//!
//! fn main() -> watchlist_common::Result<()> {
//!     let mut watchlist = Watchlist::new(&FeedConfig::default())?;
//!     watchlist.subscribe(Symbol::normalize("btc")?);
//!     watchlist.start(None)?;
//!     for entry in watchlist.rows() {
//!         println!("{} {:.2} {}", entry.symbol, entry.price, entry.direction());
//!     }
//!     watchlist.stop();
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]
pub mod direction;
pub mod dispatcher;
pub mod generator;
pub mod registry;
pub mod watchlist;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use direction::PriceDirection;
pub use dispatcher::{CycleReport, DispatcherState, ObserverHandle, TickDispatcher};
pub use generator::{RandomWalkTickGenerator, TickGenerator, UniformTickGenerator};
pub use registry::{Entry, SubscriptionRegistry};
pub use watchlist::Watchlist;

/// Lock `mutex`, recovering the data if a previous holder panicked. Every
/// mutation in this crate leaves its state consistent at each step.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
