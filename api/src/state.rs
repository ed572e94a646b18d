use std::sync::Mutex;

use shared::{Config, MarketClient, WatchlistStore};

/// Everything the handlers need, shared behind an `Arc`.
///
/// The watchlist store mutates on toggle, so it sits behind a std mutex;
/// its operations are synchronous file writes with no await inside the
/// critical section.
pub struct AppState {
    pub config: Config,
    pub market: MarketClient,
    pub watchlist: Mutex<WatchlistStore>,
}
